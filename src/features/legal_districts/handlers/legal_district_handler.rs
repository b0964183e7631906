use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::legal_districts::dtos::{
    DistrictSearchQuery, LegalDistrictResponseDto, LoadStatusResponseDto, RegionLookupQuery,
};
use crate::features::legal_districts::services::{DistrictLoaderService, LegalDistrictService};
use crate::shared::types::{ApiResponse, Meta};
use crate::shared::validation::DISTRICT_CODE_REGEX;

/// State for legal district handlers
#[derive(Clone)]
pub struct LegalDistrictState {
    pub district_service: Arc<LegalDistrictService>,
    pub loader_service: Arc<DistrictLoaderService>,
}

/// Search legal districts by keyword
#[utoipa::path(
    get,
    path = "/api/legal-districts/search",
    params(DistrictSearchQuery),
    responses(
        (status = 200, description = "Matching districts, best tier first", body = ApiResponse<Vec<LegalDistrictResponseDto>>),
        (status = 400, description = "Validation error")
    ),
    tag = "legal-districts"
)]
pub async fn search_districts(
    State(state): State<LegalDistrictState>,
    Query(query): Query<DistrictSearchQuery>,
) -> Result<Json<ApiResponse<Vec<LegalDistrictResponseDto>>>> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let keyword = query.keyword.as_deref().unwrap_or_default();
    let dtos = state
        .district_service
        .search_districts(keyword, query.limit)
        .await;
    let meta = Meta::total(dtos.len());

    Ok(Json(ApiResponse::success(Some(dtos), None, Some(meta))))
}

/// Get a legal district by its 10-digit code
#[utoipa::path(
    get,
    path = "/api/legal-districts/codes/{code}",
    params(
        ("code" = String, Path, description = "Legal district code (10 digits)")
    ),
    responses(
        (status = 200, description = "Legal district details", body = ApiResponse<LegalDistrictResponseDto>),
        (status = 400, description = "Malformed code"),
        (status = 404, description = "Legal district not found")
    ),
    tag = "legal-districts"
)]
pub async fn get_district(
    State(state): State<LegalDistrictState>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<LegalDistrictResponseDto>>> {
    if !DISTRICT_CODE_REGEX.is_match(&code) {
        return Err(AppError::BadRequest(format!(
            "Invalid legal district code '{}': expected 10 digits",
            code
        )));
    }

    let district = state.district_service.get_by_code(&code).await?;
    Ok(Json(ApiResponse::success(Some(district), None, None)))
}

/// List legal districts of a province, optionally narrowed to one city
#[utoipa::path(
    get,
    path = "/api/legal-districts/by-region",
    params(RegionLookupQuery),
    responses(
        (status = 200, description = "Districts in the region, most general first", body = ApiResponse<Vec<LegalDistrictResponseDto>>),
        (status = 400, description = "Validation error")
    ),
    tag = "legal-districts"
)]
pub async fn list_by_region(
    State(state): State<LegalDistrictState>,
    Query(query): Query<RegionLookupQuery>,
) -> Result<Json<ApiResponse<Vec<LegalDistrictResponseDto>>>> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let dtos = match query.city.as_deref() {
        Some(city) => {
            state
                .district_service
                .get_by_province_and_city(&query.province, city, query.limit)
                .await?
        }
        None => {
            state
                .district_service
                .get_by_province(&query.province, query.limit)
                .await?
        }
    };
    let meta = Meta::total(dtos.len());

    Ok(Json(ApiResponse::success(Some(dtos), None, Some(meta))))
}

/// Bulk loader progress and totals
#[utoipa::path(
    get,
    path = "/api/legal-districts/load-status",
    responses(
        (status = 200, description = "Loader totals for this process", body = ApiResponse<LoadStatusResponseDto>)
    ),
    tag = "legal-districts"
)]
pub async fn get_load_status(
    State(state): State<LegalDistrictState>,
) -> Json<ApiResponse<LoadStatusResponseDto>> {
    let status = LoadStatusResponseDto::from(state.loader_service.stats());
    Json(ApiResponse::success(Some(status), None, None))
}

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::legal_districts::models::LegalDistrict;
use crate::features::legal_districts::services::LoaderStatsSnapshot;
use crate::shared::constants::DEFAULT_SEARCH_LIMIT;

fn default_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

/// Query parameters for the tiered district search
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DistrictSearchQuery {
    /// Free-text keyword (exact, then prefix, then substring match)
    #[param(example = "종로")]
    #[validate(length(max = 64, message = "keyword must be at most 64 characters"))]
    pub keyword: Option<String>,

    /// Maximum number of results (default: 10, max: 100)
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100)]
    pub limit: usize,
}

/// Query parameters for province / province+city lookups
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RegionLookupQuery {
    /// Exact province (sido) name
    #[validate(length(min = 1, max = 64, message = "province must be 1-64 characters"))]
    #[param(example = "서울특별시")]
    pub province: String,

    /// Exact city (sigungu) name, optional
    #[validate(length(min = 1, max = 64, message = "city must be 1-64 characters"))]
    #[param(example = "종로구")]
    pub city: Option<String>,

    /// Maximum number of results (default: 10, max: 100)
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100)]
    pub limit: usize,
}

/// Response DTO for legal district data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LegalDistrictResponseDto {
    pub code: String,
    pub province: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub village: Option<String>,
    pub full_address: String,
}

impl From<LegalDistrict> for LegalDistrictResponseDto {
    fn from(district: LegalDistrict) -> Self {
        Self {
            code: district.code,
            province: district.province,
            city: district.city,
            neighborhood: district.neighborhood,
            village: district.village,
            full_address: district.full_address,
        }
    }
}

/// Bulk loader running totals
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadStatusResponseDto {
    pub state: String,
    pub lines_read: u64,
    pub inserted: u64,
    pub duplicates_skipped: u64,
    pub filtered: u64,
    pub failed: u64,
    pub batch_fallbacks: u64,
}

impl From<LoaderStatsSnapshot> for LoadStatusResponseDto {
    fn from(stats: LoaderStatsSnapshot) -> Self {
        Self {
            state: stats.state.as_str().to_string(),
            lines_read: stats.lines_read,
            inserted: stats.inserted,
            duplicates_skipped: stats.duplicates_skipped,
            filtered: stats.filtered,
            failed: stats.failed,
            batch_fallbacks: stats.batch_fallbacks,
        }
    }
}

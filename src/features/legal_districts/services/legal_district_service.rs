use std::sync::Arc;

use crate::core::config::DistrictConfig;
use crate::core::error::{AppError, Result};
use crate::features::legal_districts::dtos::LegalDistrictResponseDto;
use crate::features::legal_districts::services::TieredMatcher;
use crate::features::legal_districts::store::DistrictStore;
use crate::shared::constants::MAX_SEARCH_LIMIT;

/// Query entry point for legal district lookups
pub struct LegalDistrictService {
    store: Arc<dyn DistrictStore>,
    matcher: TieredMatcher,
}

impl LegalDistrictService {
    pub fn new(store: Arc<dyn DistrictStore>, config: &DistrictConfig) -> Self {
        Self {
            matcher: TieredMatcher::new(Arc::clone(&store), config),
            store,
        }
    }

    /// Tiered keyword search. Never fails: a degraded store yields fewer or no rows.
    pub async fn search_districts(
        &self,
        keyword: &str,
        limit: usize,
    ) -> Vec<LegalDistrictResponseDto> {
        let limit = limit.min(MAX_SEARCH_LIMIT);
        self.matcher
            .find(keyword, limit)
            .await
            .into_iter()
            .map(Into::into)
            .collect()
    }

    /// Get a legal district by its code
    pub async fn get_by_code(&self, code: &str) -> Result<LegalDistrictResponseDto> {
        let district = self
            .store
            .find_by_code(code.trim())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Legal district with code '{}' not found", code))
            })?;

        Ok(district.into())
    }

    /// Districts of one province, most general first
    pub async fn get_by_province(
        &self,
        province: &str,
        limit: usize,
    ) -> Result<Vec<LegalDistrictResponseDto>> {
        let province = province.trim();
        if province.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let districts = self
            .store
            .find_by_province(province, limit.min(MAX_SEARCH_LIMIT))
            .await?;

        Ok(districts.into_iter().map(Into::into).collect())
    }

    /// Districts of one city within a province, most general first
    pub async fn get_by_province_and_city(
        &self,
        province: &str,
        city: &str,
        limit: usize,
    ) -> Result<Vec<LegalDistrictResponseDto>> {
        let (province, city) = (province.trim(), city.trim());
        if province.is_empty() || city.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let districts = self
            .store
            .find_by_province_and_city(province, city, limit.min(MAX_SEARCH_LIMIT))
            .await?;

        Ok(districts.into_iter().map(Into::into).collect())
    }
}

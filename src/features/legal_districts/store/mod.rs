//! Persistence capability behind the district search.
//!
//! The tiered matcher only needs exact, prefix, full-text and substring
//! lookups plus the handful of writes the bulk loader performs, so any
//! backend that can answer these (PostgreSQL, an in-memory scan, ...) can
//! serve the search.
//!
//! Ordering contract for `find_exact`, `find_prefix`, `find_by_province` and
//! `find_by_province_and_city`: ascending character length of the full
//! address, ties broken by ascending code. `find_containing` orders by
//! [`LegalDistrict::relevance_rank`] first.

mod memory;
mod postgres;

pub use memory::MemoryDistrictStore;
pub use postgres::PgDistrictStore;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::legal_districts::models::{LegalDistrict, NewLegalDistrict};

#[async_trait]
pub trait DistrictStore: Send + Sync {
    /// Rows where any level equals `keyword`, skipping codes in `exclude`
    async fn find_exact(
        &self,
        keyword: &str,
        exclude: &[String],
        limit: usize,
    ) -> Result<Vec<LegalDistrict>>;

    /// Rows where any level starts with `keyword`, skipping codes in `exclude`
    async fn find_prefix(
        &self,
        keyword: &str,
        exclude: &[String],
        limit: usize,
    ) -> Result<Vec<LegalDistrict>>;

    /// Dedicated full-text lookup over the full address; may be unavailable
    async fn find_full_text(
        &self,
        keyword: &str,
        exclude: &[String],
        limit: usize,
    ) -> Result<Vec<LegalDistrict>>;

    /// Relevance-ranked substring lookup over every level and the full address
    async fn find_containing(
        &self,
        keyword: &str,
        exclude: &[String],
        limit: usize,
    ) -> Result<Vec<LegalDistrict>>;

    async fn find_by_code(&self, code: &str) -> Result<Option<LegalDistrict>>;

    async fn find_by_province(&self, province: &str, limit: usize) -> Result<Vec<LegalDistrict>>;

    async fn find_by_province_and_city(
        &self,
        province: &str,
        city: &str,
        limit: usize,
    ) -> Result<Vec<LegalDistrict>>;

    async fn exists_by_code(&self, code: &str) -> Result<bool>;

    /// Inserts every row or none of them; returns the number inserted
    async fn insert_batch(&self, rows: &[NewLegalDistrict]) -> Result<u64>;

    /// Inserts a single row; `Ok(false)` when the code is already present
    async fn insert_one(&self, row: &NewLegalDistrict) -> Result<bool>;

    async fn count(&self) -> Result<i64>;
}

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::core::error::{AppError, Result};
use crate::features::legal_districts::models::{LegalDistrict, NewLegalDistrict};
use crate::features::legal_districts::store::DistrictStore;

/// In-process district store answering every query with a linear scan.
///
/// Rows are keyed by code, so scans visit them in code order and ties in the
/// length ordering fall back to the code without extra work.
#[derive(Default)]
pub struct MemoryDistrictStore {
    rows: RwLock<BTreeMap<String, LegalDistrict>>,
}

impl MemoryDistrictStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn select<F, K>(
        &self,
        exclude: &[String],
        limit: usize,
        matches: F,
        sort_key: K,
    ) -> Vec<LegalDistrict>
    where
        F: Fn(&LegalDistrict) -> bool,
        K: Fn(&LegalDistrict) -> (u8, usize),
    {
        let rows = self.rows.read().await;
        let mut hits: Vec<&LegalDistrict> = rows
            .values()
            .filter(|d| !exclude.contains(&d.code))
            .filter(|d| matches(*d))
            .collect();

        // Stable sort keeps code order among equal keys
        hits.sort_by_key(|d| sort_key(*d));
        hits.into_iter().take(limit).cloned().collect()
    }
}

fn by_length(district: &LegalDistrict) -> (u8, usize) {
    (0, district.address_len())
}

/// Every keyword word must start some word of the full address
fn full_text_match(district: &LegalDistrict, keyword: &str) -> bool {
    keyword.split_whitespace().all(|term| {
        district
            .full_address
            .split_whitespace()
            .any(|word| word.starts_with(term))
    })
}

#[async_trait]
impl DistrictStore for MemoryDistrictStore {
    async fn find_exact(
        &self,
        keyword: &str,
        exclude: &[String],
        limit: usize,
    ) -> Result<Vec<LegalDistrict>> {
        Ok(self
            .select(exclude, limit, |d| d.matches_exact(keyword), by_length)
            .await)
    }

    async fn find_prefix(
        &self,
        keyword: &str,
        exclude: &[String],
        limit: usize,
    ) -> Result<Vec<LegalDistrict>> {
        Ok(self
            .select(exclude, limit, |d| d.matches_prefix(keyword), by_length)
            .await)
    }

    async fn find_full_text(
        &self,
        keyword: &str,
        exclude: &[String],
        limit: usize,
    ) -> Result<Vec<LegalDistrict>> {
        if keyword.split_whitespace().next().is_none() {
            return Err(AppError::BadRequest(
                "Full-text search needs at least one term".to_string(),
            ));
        }

        Ok(self
            .select(
                exclude,
                limit,
                |d| full_text_match(d, keyword),
                by_length,
            )
            .await)
    }

    async fn find_containing(
        &self,
        keyword: &str,
        exclude: &[String],
        limit: usize,
    ) -> Result<Vec<LegalDistrict>> {
        Ok(self
            .select(
                exclude,
                limit,
                |d| d.contains_keyword(keyword),
                |d| (d.relevance_rank(keyword), d.address_len()),
            )
            .await)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<LegalDistrict>> {
        Ok(self.rows.read().await.get(code).cloned())
    }

    async fn find_by_province(&self, province: &str, limit: usize) -> Result<Vec<LegalDistrict>> {
        Ok(self
            .select(&[], limit, |d| d.province == province, by_length)
            .await)
    }

    async fn find_by_province_and_city(
        &self,
        province: &str,
        city: &str,
        limit: usize,
    ) -> Result<Vec<LegalDistrict>> {
        Ok(self
            .select(
                &[],
                limit,
                |d| d.province == province && d.city.as_deref() == Some(city),
                by_length,
            )
            .await)
    }

    async fn exists_by_code(&self, code: &str) -> Result<bool> {
        Ok(self.rows.read().await.contains_key(code))
    }

    async fn insert_batch(&self, rows: &[NewLegalDistrict]) -> Result<u64> {
        let mut stored = self.rows.write().await;

        // All-or-nothing, like a single multi-row INSERT
        let mut seen = std::collections::HashSet::with_capacity(rows.len());
        for row in rows {
            if stored.contains_key(&row.code) || !seen.insert(row.code.as_str()) {
                return Err(AppError::Conflict(format!(
                    "Legal district with code '{}' already exists",
                    row.code
                )));
            }
        }

        let now = Utc::now();
        for row in rows {
            stored.insert(row.code.clone(), row.clone().into_district(now));
        }

        Ok(rows.len() as u64)
    }

    async fn insert_one(&self, row: &NewLegalDistrict) -> Result<bool> {
        let mut stored = self.rows.write().await;
        if stored.contains_key(&row.code) {
            return Ok(false);
        }

        stored.insert(row.code.clone(), row.clone().into_district(Utc::now()));
        Ok(true)
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.rows.read().await.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, province: &str, city: &str, dong: &str) -> NewLegalDistrict {
        NewLegalDistrict::new(code, province, Some(city), Some(dong), None)
    }

    async fn seeded() -> MemoryDistrictStore {
        let store = MemoryDistrictStore::new();
        store
            .insert_batch(&[
                row("1111000000", "서울특별시", "종로구", ""),
                row("1111010100", "서울특별시", "종로구", "청운동"),
                row("1111013800", "서울특별시", "종로구", "종로1가"),
                row("2611000000", "부산광역시", "중구", ""),
            ])
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_exact_orders_by_length_then_code() {
        let store = seeded().await;
        let hits = store.find_exact("종로구", &[], 10).await.unwrap();
        let codes: Vec<&str> = hits.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["1111000000", "1111010100", "1111013800"]);
    }

    #[tokio::test]
    async fn test_exclude_and_limit() {
        let store = seeded().await;
        let exclude = vec!["1111000000".to_string()];
        let hits = store.find_prefix("종로", &exclude, 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "1111010100");
    }

    #[tokio::test]
    async fn test_containing_ranks_exact_before_substring() {
        let store = seeded().await;
        let hits = store.find_containing("종로1가", &[], 10).await.unwrap();
        assert_eq!(hits.len(), 1);

        let hits = store.find_containing("로", &[], 10).await.unwrap();
        // No exact or level-prefix match for "로"; everything ranks 8, shortest first
        assert_eq!(hits[0].code, "1111000000");
        assert_eq!(hits.len(), 3);
    }

    #[tokio::test]
    async fn test_full_text_matches_word_prefixes() {
        let store = seeded().await;
        let hits = store.find_full_text("서울 종로1", &[], 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "1111013800");

        assert!(store.find_full_text("   ", &[], 10).await.is_err());
    }

    #[tokio::test]
    async fn test_insert_batch_is_all_or_nothing() {
        let store = seeded().await;
        let result = store
            .insert_batch(&[
                row("4100000000", "경기도", "", ""),
                row("1111010100", "서울특별시", "종로구", "청운동"),
            ])
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(store.count().await.unwrap(), 4);
        assert!(!store.exists_by_code("4100000000").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_one_reports_duplicates() {
        let store = seeded().await;
        assert!(!store
            .insert_one(&row("1111010100", "서울특별시", "종로구", "청운동"))
            .await
            .unwrap());
        assert!(store
            .insert_one(&row("4100000000", "경기도", "수원시", ""))
            .await
            .unwrap());
        assert_eq!(store.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_province_and_city_lookup() {
        let store = seeded().await;
        let hits = store
            .find_by_province_and_city("서울특별시", "종로구", 2)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].full_address, "서울특별시 종로구");

        let hits = store.find_by_province("부산광역시", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
    }
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Legal district model representing one administrative unit
/// (province/sido, city/sigungu, neighborhood/dong or village/ri level)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct LegalDistrict {
    pub code: String,
    pub province: String,
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    pub village: Option<String>,
    pub full_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A parsed district waiting to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLegalDistrict {
    pub code: String,
    pub province: String,
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    pub village: Option<String>,
    pub full_address: String,
}

/// Space-joins the non-empty components, trimmed.
fn compose_full_address(
    province: &str,
    city: Option<&str>,
    neighborhood: Option<&str>,
    village: Option<&str>,
) -> String {
    [Some(province), city, neighborhood, village]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl NewLegalDistrict {
    /// Builds a record with its full address derived from the components.
    /// Blank optional components are stored as `None`.
    pub fn new(
        code: &str,
        province: &str,
        city: Option<&str>,
        neighborhood: Option<&str>,
        village: Option<&str>,
    ) -> Self {
        let city = non_empty(city);
        let neighborhood = non_empty(neighborhood);
        let village = non_empty(village);
        let province = province.trim().to_string();
        let full_address = compose_full_address(
            &province,
            city.as_deref(),
            neighborhood.as_deref(),
            village.as_deref(),
        );

        Self {
            code: code.trim().to_string(),
            province,
            city,
            neighborhood,
            village,
            full_address,
        }
    }

    pub fn into_district(self, now: DateTime<Utc>) -> LegalDistrict {
        LegalDistrict {
            code: self.code,
            province: self.province,
            city: self.city,
            neighborhood: self.neighborhood,
            village: self.village,
            full_address: self.full_address,
            created_at: now,
            updated_at: now,
        }
    }
}

impl LegalDistrict {
    /// Province, city, neighborhood and village, in that order; absent levels are `None`
    fn levels(&self) -> [Option<&str>; 4] {
        [
            Some(self.province.as_str()),
            self.city.as_deref(),
            self.neighborhood.as_deref(),
            self.village.as_deref(),
        ]
    }

    /// Length of the full address in characters, the specificity ordering key
    pub fn address_len(&self) -> usize {
        self.full_address.chars().count()
    }

    pub fn matches_exact(&self, keyword: &str) -> bool {
        self.levels().into_iter().flatten().any(|v| v == keyword)
    }

    pub fn matches_prefix(&self, keyword: &str) -> bool {
        self.levels()
            .into_iter()
            .flatten()
            .any(|v| v.starts_with(keyword))
    }

    pub fn contains_keyword(&self, keyword: &str) -> bool {
        self.full_address.contains(keyword)
            || self.levels().into_iter().flatten().any(|v| v.contains(keyword))
    }

    /// Relevance rank of a substring match, lower is better.
    ///
    /// 1 exact level match, 2..=5 prefix of province/city/neighborhood/village,
    /// 6 prefix of the full address, 7 prefix of any word inside the full
    /// address, 8 anything else.
    pub fn relevance_rank(&self, keyword: &str) -> u8 {
        if self.matches_exact(keyword) {
            return 1;
        }

        if let Some(level) = self
            .levels()
            .into_iter()
            .position(|v| v.is_some_and(|v| v.starts_with(keyword)))
        {
            return 2 + level as u8;
        }

        if self.full_address.starts_with(keyword) {
            6
        } else if self.full_address.contains(&format!(" {}", keyword)) {
            7
        } else {
            8
        }
    }
}

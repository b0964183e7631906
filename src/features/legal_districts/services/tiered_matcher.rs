//! Tiered keyword matching over the legal district store.
//!
//! Tiers run in priority order (exact, prefix, fallback) and each one only
//! asks the store for the rows still missing from the result. A row collected
//! by an earlier tier keeps its position; later tiers never re-add or re-rank
//! it. Every tier is failure-isolated: an error or timeout is logged and
//! counted as zero rows, so the worst case is an empty result, never an error.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::DistrictConfig;
use crate::core::error::{AppError, Result};
use crate::features::legal_districts::models::LegalDistrict;
use crate::features::legal_districts::store::DistrictStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Exact,
    Prefix,
    Fallback,
}

impl MatchTier {
    pub const ORDER: [MatchTier; 3] = [MatchTier::Exact, MatchTier::Prefix, MatchTier::Fallback];

    pub fn as_str(self) -> &'static str {
        match self {
            MatchTier::Exact => "exact",
            MatchTier::Prefix => "prefix",
            MatchTier::Fallback => "fallback",
        }
    }
}

/// Ordered, code-deduplicated accumulator with a fixed ceiling
#[derive(Debug)]
pub struct RankedResults {
    limit: usize,
    seen: HashSet<String>,
    items: Vec<LegalDistrict>,
}

impl RankedResults {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            seen: HashSet::with_capacity(limit),
            items: Vec::with_capacity(limit),
        }
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.items.len())
    }

    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    /// Codes already collected, handed to the store so it can skip them
    pub fn collected_codes(&self) -> Vec<String> {
        self.items.iter().map(|d| d.code.clone()).collect()
    }

    /// Appends unseen rows in order until the ceiling; returns how many were added
    pub fn extend(&mut self, rows: Vec<LegalDistrict>) -> usize {
        let mut added = 0;
        for row in rows {
            if self.is_full() {
                break;
            }
            if self.seen.insert(row.code.clone()) {
                self.items.push(row);
                added += 1;
            }
        }
        added
    }

    pub fn into_vec(self) -> Vec<LegalDistrict> {
        self.items
    }
}

/// Per-search record of what each tier did, for logging and tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    pub tiers_run: Vec<MatchTier>,
    pub tiers_failed: Vec<MatchTier>,
    pub full_text_substituted: bool,
}

pub struct TieredMatcher {
    store: Arc<dyn DistrictStore>,
    full_text_enabled: bool,
    tier_timeout: Duration,
}

impl TieredMatcher {
    pub fn new(store: Arc<dyn DistrictStore>, config: &DistrictConfig) -> Self {
        Self {
            store,
            full_text_enabled: config.full_text_enabled,
            tier_timeout: config.tier_timeout,
        }
    }

    /// Up to `limit` districts matching `keyword`, most specific first.
    pub async fn find(&self, keyword: &str, limit: usize) -> Vec<LegalDistrict> {
        let (rows, report) = self.find_with_report(keyword, limit).await;

        if !report.tiers_failed.is_empty() || report.full_text_substituted {
            tracing::info!(
                "Degraded district search for '{}': returned={}, failed_tiers={:?}, full_text_substituted={}",
                keyword,
                rows.len(),
                report.tiers_failed,
                report.full_text_substituted
            );
        }

        rows
    }

    pub async fn find_with_report(
        &self,
        keyword: &str,
        limit: usize,
    ) -> (Vec<LegalDistrict>, MatchReport) {
        let mut report = MatchReport::default();
        let keyword = keyword.trim();
        if keyword.is_empty() || limit == 0 {
            return (Vec::new(), report);
        }

        let mut results = RankedResults::new(limit);

        for tier in MatchTier::ORDER {
            if results.is_full() {
                break;
            }
            report.tiers_run.push(tier);

            let exclude = results.collected_codes();
            let budget = results.remaining();

            match self.run_tier(tier, keyword, &exclude, budget, &mut report).await {
                Ok(rows) => {
                    let fetched = rows.len();
                    let added = results.extend(rows);
                    tracing::debug!(
                        "District search tier {} for '{}': fetched={}, added={}",
                        tier.as_str(),
                        keyword,
                        fetched,
                        added
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "District search tier {} failed for '{}', continuing: {:?}",
                        tier.as_str(),
                        keyword,
                        e
                    );
                    report.tiers_failed.push(tier);
                }
            }
        }

        (results.into_vec(), report)
    }

    async fn run_tier(
        &self,
        tier: MatchTier,
        keyword: &str,
        exclude: &[String],
        budget: usize,
        report: &mut MatchReport,
    ) -> Result<Vec<LegalDistrict>> {
        match tier {
            MatchTier::Exact => {
                self.bounded(self.store.find_exact(keyword, exclude, budget))
                    .await
            }
            MatchTier::Prefix => {
                self.bounded(self.store.find_prefix(keyword, exclude, budget))
                    .await
            }
            MatchTier::Fallback => {
                if self.full_text_enabled {
                    match self
                        .bounded(self.store.find_full_text(keyword, exclude, budget))
                        .await
                    {
                        Ok(rows) => {
                            return Ok(self.top_up(keyword, exclude, budget, rows).await);
                        }
                        Err(e) => {
                            tracing::warn!(
                                "Full-text lookup unavailable for '{}', using substring ranking: {:?}",
                                keyword,
                                e
                            );
                            report.full_text_substituted = true;
                        }
                    }
                }

                self.bounded(self.store.find_containing(keyword, exclude, budget))
                    .await
            }
        }
    }

    /// Full text only matches word starts; fill the rest of the budget with
    /// substring matches it could not see. A failing top-up keeps the
    /// full-text rows.
    async fn top_up(
        &self,
        keyword: &str,
        exclude: &[String],
        budget: usize,
        mut rows: Vec<LegalDistrict>,
    ) -> Vec<LegalDistrict> {
        if rows.len() >= budget {
            return rows;
        }

        let mut seen: Vec<String> = exclude.to_vec();
        seen.extend(rows.iter().map(|d| d.code.clone()));

        match self
            .bounded(self.store.find_containing(keyword, &seen, budget - rows.len()))
            .await
        {
            Ok(extra) => rows.extend(extra),
            Err(e) => tracing::warn!(
                "Substring top-up failed for '{}', keeping {} full-text rows: {:?}",
                keyword,
                rows.len(),
                e
            ),
        }

        rows
    }

    async fn bounded<F>(&self, query: F) -> Result<Vec<LegalDistrict>>
    where
        F: std::future::Future<Output = Result<Vec<LegalDistrict>>>,
    {
        tokio::time::timeout(self.tier_timeout, query)
            .await
            .map_err(|_| {
                AppError::Internal(format!(
                    "query exceeded {} ms",
                    self.tier_timeout.as_millis()
                ))
            })?
    }
}

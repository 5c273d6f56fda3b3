//! Aggregate result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Per-source outcome of one aggregate request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub source_id: String,
    /// Mean item score (0.0 for zero items or a failed fetch)
    pub average_score: f64,
    pub item_count: usize,
    /// Fetch error; failed sources are excluded from the overall score
    pub error: Option<String>,
}

impl SourceSummary {
    pub fn success(source_id: impl Into<String>, average_score: f64, item_count: usize) -> Self {
        Self {
            source_id: source_id.into(),
            average_score,
            item_count,
            error: None,
        }
    }

    pub fn failure(source_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            average_score: 0.0,
            item_count: 0,
            error: Some(error.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Combined sentiment for one symbol across all enabled sources
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub symbol: String,
    /// Item-count-weighted mean of successful source averages
    pub overall_score: f64,
    /// Enabled sources only; disabled sources never appear here
    pub per_source: BTreeMap<String, SourceSummary>,
    pub timestamp: DateTime<Utc>,
}

impl AggregateResult {
    /// Items scored across all successful sources
    pub fn total_items(&self) -> usize {
        self.per_source
            .values()
            .filter(|s| !s.is_failure())
            .map(|s| s.item_count)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregateError {
    #[error("no sentiment sources are enabled")]
    NoSourcesEnabled,

    #[error("all enabled sources failed: {}", describe_failures(.failures))]
    AllSourcesFailed {
        /// (source_id, error) for every enabled source
        failures: Vec<(String, String)>,
    },
}

fn describe_failures(failures: &[(String, String)]) -> String {
    failures
        .iter()
        .map(|(source, error)| format!("{}: {}", source, error))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_failed_display() {
        let err = AggregateError::AllSourcesFailed {
            failures: vec![
                ("reddit".to_string(), "timeout".to_string()),
                ("twitter".to_string(), "401".to_string()),
            ],
        };
        assert_eq!(
            err.to_string(),
            "all enabled sources failed: reddit: timeout; twitter: 401"
        );
    }

    #[test]
    fn test_total_items_skips_failures() {
        let mut per_source = BTreeMap::new();
        per_source.insert("a".to_string(), SourceSummary::success("a", 0.2, 4));
        per_source.insert("b".to_string(), SourceSummary::failure("b", "down"));
        per_source.insert("c".to_string(), SourceSummary::success("c", -0.4, 3));

        let result = AggregateResult {
            symbol: "BTC".to_string(),
            overall_score: 0.0,
            per_source,
            timestamp: Utc::now(),
        };
        assert_eq!(result.total_items(), 7);
    }
}

//! Pure reduction from per-source fetch outcomes to an aggregate
//!
//! Kept free of I/O and concurrency so the partial/total failure rules can
//! be tested in isolation.

use super::types::{AggregateError, AggregateResult, SourceSummary};
use crate::sentiment::scorer::score_with;
use crate::sentiment::{Lexicon, RawItem};
use crate::sources::FetchError;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// What one source produced for a request
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    Success { items: Vec<RawItem> },
    Failure { error: String },
    /// Source not enabled; excluded from the response entirely
    Disabled,
}

impl SourceOutcome {
    pub fn from_fetch(result: Result<Vec<RawItem>, FetchError>) -> Self {
        match result {
            Ok(items) => SourceOutcome::Success { items },
            Err(e) => SourceOutcome::Failure {
                error: e.to_string(),
            },
        }
    }
}

/// Score a source's items and reduce them to a summary
///
/// Returns `None` for a disabled source.
pub fn summarize(source_id: &str, outcome: SourceOutcome, lexicon: &Lexicon) -> Option<SourceSummary> {
    match outcome {
        SourceOutcome::Disabled => None,
        SourceOutcome::Failure { error } => Some(SourceSummary::failure(source_id, error)),
        SourceOutcome::Success { items } => {
            let count = items.len();
            let total: f64 = items
                .iter()
                .map(|item| score_with(lexicon, &item.text).score)
                .sum();
            let average = if count > 0 { total / count as f64 } else { 0.0 };
            Some(SourceSummary::success(source_id, average, count))
        }
    }
}

/// Combine source summaries into the aggregate result
///
/// # Rules
/// - no summaries at all → `NoSourcesEnabled`
/// - every summary failed → `AllSourcesFailed`
/// - otherwise overall = Σ(mean × count) / Σ count over successful sources,
///   or 0.0 when they returned no items
///
/// Summaries are reduced in source-id order, so the result does not depend
/// on the order they are supplied in.
pub fn combine(
    symbol: &str,
    summaries: impl IntoIterator<Item = SourceSummary>,
    timestamp: DateTime<Utc>,
) -> Result<AggregateResult, AggregateError> {
    let per_source: BTreeMap<String, SourceSummary> = summaries
        .into_iter()
        .map(|s| (s.source_id.clone(), s))
        .collect();

    if per_source.is_empty() {
        return Err(AggregateError::NoSourcesEnabled);
    }

    if per_source.values().all(SourceSummary::is_failure) {
        let failures = per_source
            .values()
            .map(|s| (s.source_id.clone(), s.error.clone().unwrap_or_default()))
            .collect();
        return Err(AggregateError::AllSourcesFailed { failures });
    }

    let (weighted_sum, total_count) = per_source
        .values()
        .filter(|s| !s.is_failure())
        .fold((0.0, 0usize), |(sum, count), s| {
            (sum + s.average_score * s.item_count as f64, count + s.item_count)
        });

    let overall_score = if total_count > 0 {
        weighted_sum / total_count as f64
    } else {
        0.0
    };

    Ok(AggregateResult {
        symbol: symbol.to_string(),
        overall_score,
        per_source,
        timestamp,
    })
}

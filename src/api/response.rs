//! Public response shapes and error mapping
//!
//! ```json
//! {
//!   "symbol": "BTC",
//!   "overall_score": 0.12,
//!   "per_source": {
//!     "reddit": {"score": 0.2, "posts": 40},
//!     "twitter": {"error": "API returned 429: ..."}
//!   },
//!   "timestamp": "2024-03-01T12:00:00Z"
//! }
//! ```

use crate::aggregator::{AggregateError, AggregateResult, SourceSummary};
use crate::history::HistoryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One `per_source` entry: a score or an error, never both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceEntry {
    Score { score: f64, posts: usize },
    Error { error: String },
}

impl From<&SourceSummary> for SourceEntry {
    fn from(summary: &SourceSummary) -> Self {
        match &summary.error {
            Some(error) => SourceEntry::Error {
                error: error.clone(),
            },
            None => SourceEntry::Score {
                score: summary.average_score,
                posts: summary.item_count,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResponse {
    pub symbol: String,
    pub overall_score: f64,
    pub per_source: BTreeMap<String, SourceEntry>,
    pub timestamp: DateTime<Utc>,
}

impl From<&AggregateResult> for SentimentResponse {
    fn from(result: &AggregateResult) -> Self {
        Self {
            symbol: result.symbol.clone(),
            overall_score: result.overall_score,
            per_source: result
                .per_source
                .iter()
                .map(|(id, summary)| (id.clone(), SourceEntry::from(summary)))
                .collect(),
            timestamp: result.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors surfaced by HTTP handlers
#[derive(Debug)]
pub enum ApiError {
    Aggregate(AggregateError),
    History(HistoryError),
    HistoryDisabled,
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Aggregate(AggregateError::AllSourcesFailed { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::Aggregate(AggregateError::NoSourcesEnabled) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::History(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::HistoryDisabled => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Aggregate(e) => format!("Failed to fetch sentiment data: {}", e),
            ApiError::History(e) => format!("Failed to read sentiment history: {}", e),
            ApiError::HistoryDisabled => "Sentiment history is not enabled".to_string(),
            ApiError::BadRequest(msg) => msg.clone(),
        }
    }
}

impl From<AggregateError> for ApiError {
    fn from(err: AggregateError) -> Self {
        ApiError::Aggregate(err)
    }
}

impl From<HistoryError> for ApiError {
    fn from(err: HistoryError) -> Self {
        ApiError::History(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result() -> AggregateResult {
        let mut per_source = BTreeMap::new();
        per_source.insert("reddit".to_string(), SourceSummary::success("reddit", 0.5, 4));
        per_source.insert("twitter".to_string(), SourceSummary::failure("twitter", "timeout"));
        AggregateResult {
            symbol: "BTC".to_string(),
            overall_score: 0.5,
            per_source,
            timestamp: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn test_response_json_shape() {
        let response = SentimentResponse::from(&result());
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(
            value,
            json!({
                "symbol": "BTC",
                "overall_score": 0.5,
                "per_source": {
                    "reddit": {"score": 0.5, "posts": 4},
                    "twitter": {"error": "timeout"}
                },
                "timestamp": "2023-11-14T22:13:20Z"
            })
        );
    }

    #[test]
    fn test_error_status_mapping() {
        let all_failed = ApiError::from(AggregateError::AllSourcesFailed {
            failures: vec![("reddit".to_string(), "down".to_string())],
        });
        assert_eq!(all_failed.status(), StatusCode::BAD_GATEWAY);
        assert!(all_failed.message().contains("reddit: down"));

        assert_eq!(
            ApiError::from(AggregateError::NoSourcesEnabled).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::BadRequest("x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}

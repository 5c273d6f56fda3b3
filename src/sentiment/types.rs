//! Core sentiment data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single piece of social content as returned by a source fetcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    /// Source id that produced this item (e.g. "reddit")
    pub source: String,
    pub text: String,
    /// Platform creation time, when the platform reports one
    pub created_at: Option<DateTime<Utc>>,
}

impl RawItem {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
            created_at: None,
        }
    }
}

/// Lexicon score for one piece of text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentResult {
    /// Mean matched weight, clamped to [-1, 1]
    pub score: f64,
    /// Keyword-count heuristic in [0, 1]
    pub confidence: f64,
    /// Matched tokens in text order, one entry per occurrence
    pub keywords: Vec<String>,
    pub computed_at: DateTime<Utc>,
}

impl SentimentResult {
    pub fn neutral(computed_at: DateTime<Utc>) -> Self {
        Self {
            score: 0.0,
            confidence: 0.0,
            keywords: Vec::new(),
            computed_at,
        }
    }
}

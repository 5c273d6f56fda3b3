//! Aggregator - multi-source sentiment fan-out and merge
//!
//! # Architecture
//!
//! ```text
//! SourceFetcher (reddit)  ─┐
//! SourceFetcher (twitter) ─┼─ join_all → SourceOutcome per source
//!                          ┘
//!     ↓
//! summarize (LexiconScorer per item, mean per source)
//!     ↓
//! combine (item-count-weighted overall, partial/total failure rules)
//!     ↓
//! AggregateResult → api::response::SentimentResponse
//! ```

pub mod engine;
pub mod outcome;
pub mod trending;
pub mod types;

pub use engine::SentimentAggregator;
pub use outcome::{combine, summarize, SourceOutcome};
pub use trending::{trending, TrendingEntry, DEFAULT_TRENDING_SYMBOLS};
pub use types::{AggregateError, AggregateResult, SourceSummary};

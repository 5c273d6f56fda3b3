//! Crypto sentiment service
//!
//! Pulls recent posts about a symbol from social platforms, scores each post
//! with a weighted keyword lexicon and merges the per-platform averages into
//! one overall score.

pub mod aggregator;
pub mod api;
pub mod config;
pub mod history;
pub mod sentiment;
pub mod sources;

//! Lexicon-based text scoring
//!
//! Scoring rules:
//! - lowercase, split on whitespace, trim surrounding ASCII punctuation
//! - exact lookup of each token in the lexicon
//! - score = mean matched weight, clamped to [-1, 1]
//! - confidence = min(matches / 5, 1)

use super::lexicon::{Lexicon, LexiconError};
use super::types::SentimentResult;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Keyword hits at which confidence saturates to 1.0
pub const CONFIDENCE_SATURATION: f64 = 5.0;

/// Thread-safe scorer owning the active lexicon
///
/// Scoring holds the read lock only long enough to clone the `Arc`, so
/// concurrent `score` calls never wait on each other; a replace waits for
/// those clones and then swaps the whole lexicon at once.
pub struct LexiconScorer {
    lexicon: RwLock<Arc<Lexicon>>,
}

impl LexiconScorer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self {
            lexicon: RwLock::new(Arc::new(lexicon)),
        }
    }

    /// Score a piece of text against the current lexicon
    ///
    /// Never fails: text with no lexicon matches yields a neutral result.
    pub fn score(&self, text: &str) -> SentimentResult {
        let lexicon = self.lexicon();
        score_with(&lexicon, text)
    }

    /// Snapshot of the lexicon currently in use
    pub fn lexicon(&self) -> Arc<Lexicon> {
        self.lexicon
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Atomically swap in a new lexicon
    pub fn replace_lexicon(&self, lexicon: Lexicon) {
        let mut guard = self
            .lexicon
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(lexicon);
    }

    /// Replace one or both maps, keeping the other
    ///
    /// The combined lexicon is validated before the swap. On error the
    /// current lexicon is left untouched.
    pub fn update_lexicon(
        &self,
        positive: Option<HashMap<String, f64>>,
        negative: Option<HashMap<String, f64>>,
    ) -> Result<(), LexiconError> {
        let mut guard = self
            .lexicon
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let positive = positive.unwrap_or_else(|| guard.positive().clone());
        let negative = negative.unwrap_or_else(|| guard.negative().clone());
        let updated = Lexicon::new(positive, negative)?;

        *guard = Arc::new(updated);
        Ok(())
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new(Lexicon::default())
    }
}

/// Pure scoring function over a fixed lexicon
pub fn score_with(lexicon: &Lexicon, text: &str) -> SentimentResult {
    let computed_at = chrono::Utc::now();
    let lowered = text.to_lowercase();

    let mut raw_sum = 0.0;
    let mut keywords = Vec::new();

    for token in lowered.split_whitespace() {
        let token = token.trim_matches(|c: char| c.is_ascii_punctuation());
        if token.is_empty() {
            continue;
        }
        if let Some(weight) = lexicon.weight(token) {
            raw_sum += weight;
            keywords.push(token.to_string());
        }
    }

    if keywords.is_empty() {
        return SentimentResult::neutral(computed_at);
    }

    let match_count = keywords.len() as f64;
    SentimentResult {
        score: (raw_sum / match_count).clamp(-1.0, 1.0),
        confidence: (match_count / CONFIDENCE_SATURATION).min(1.0),
        keywords,
        computed_at,
    }
}

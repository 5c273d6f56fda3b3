//! Word-weight lexicon for crypto social-media sentiment
//!
//! Two maps: positive words carry weights >= 0, negative words carry
//! weights <= 0. A word may live in only one of them.
//!
//! ## File format
//!
//! ```json
//! {
//!   "positive": { "moon": 1.2, "bullish": 1.5 },
//!   "negative": { "crash": -1.5, "dump": -1.2 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("word '{0}' appears in both positive and negative maps")]
    Overlap(String),

    #[error("word '{0}' is listed twice with different weights")]
    Duplicate(String),

    #[error("positive word '{word}' has negative weight {weight}")]
    NegativePositiveWeight { word: String, weight: f64 },

    #[error("negative word '{word}' has positive weight {weight}")]
    PositiveNegativeWeight { word: String, weight: f64 },

    #[error("word '{word}' has non-finite weight")]
    NonFinite { word: String },

    #[error("invalid lexicon word '{0}' (empty or contains whitespace)")]
    InvalidWord(String),

    #[error("failed to read lexicon file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse lexicon file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// On-disk representation, validated into a [`Lexicon`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LexiconFile {
    #[serde(default)]
    pub positive: HashMap<String, f64>,
    #[serde(default)]
    pub negative: HashMap<String, f64>,
}

/// Validated positive/negative word maps
///
/// Keys are stored lowercase. Construct through [`Lexicon::new`] so the
/// sign and overlap rules always hold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lexicon {
    positive: HashMap<String, f64>,
    negative: HashMap<String, f64>,
}

impl Lexicon {
    /// Build a lexicon from raw maps
    ///
    /// # Errors
    /// * `Overlap` - a word (after lowercasing) is in both maps
    /// * `NegativePositiveWeight` / `PositiveNegativeWeight` - wrong sign
    /// * `NonFinite` - NaN or infinite weight
    /// * `InvalidWord` - empty word or word containing whitespace
    /// * `Duplicate` - same word (after lowercasing) twice in one map with different weights
    pub fn new(
        positive: HashMap<String, f64>,
        negative: HashMap<String, f64>,
    ) -> Result<Self, LexiconError> {
        let positive = normalize_map(positive)?;
        let negative = normalize_map(negative)?;

        for (word, &weight) in &positive {
            if weight < 0.0 {
                return Err(LexiconError::NegativePositiveWeight {
                    word: word.clone(),
                    weight,
                });
            }
            if negative.contains_key(word) {
                return Err(LexiconError::Overlap(word.clone()));
            }
        }

        for (word, &weight) in &negative {
            if weight > 0.0 {
                return Err(LexiconError::PositiveNegativeWeight {
                    word: word.clone(),
                    weight,
                });
            }
        }

        Ok(Self { positive, negative })
    }

    /// Load and validate a lexicon from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LexiconError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Lexicon from `path` when one is configured, built-in otherwise
    pub fn load_configured(path: Option<&Path>) -> Result<Self, LexiconError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, LexiconError> {
        let file: LexiconFile = serde_json::from_str(json)?;
        Self::new(file.positive, file.negative)
    }

    /// Weight for an already-lowercased token
    ///
    /// Positive map is consulted first. Overlap is rejected at construction,
    /// so at most one map can match.
    pub fn weight(&self, token: &str) -> Option<f64> {
        self.positive
            .get(token)
            .or_else(|| self.negative.get(token))
            .copied()
    }

    pub fn positive(&self) -> &HashMap<String, f64> {
        &self.positive
    }

    pub fn negative(&self) -> &HashMap<String, f64> {
        &self.negative
    }

    pub fn len(&self) -> usize {
        self.positive.len() + self.negative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Lexicon {
    /// Built-in crypto trading vocabulary
    fn default() -> Self {
        let positive = [
            ("bullish", 1.5),
            ("moon", 1.2),
            ("buy", 1.0),
            ("long", 1.0),
            ("support", 0.8),
            ("up", 0.7),
            ("high", 0.7),
            ("gains", 1.0),
            ("profit", 1.0),
            ("breakthrough", 1.2),
            ("breakout", 1.2),
            ("strong", 0.8),
            ("upgrade", 1.0),
            ("beat", 0.9),
            ("growth", 0.9),
        ];
        let negative = [
            ("bearish", -1.5),
            ("dump", -1.2),
            ("sell", -1.0),
            ("short", -1.0),
            ("resistance", -0.8),
            ("down", -0.7),
            ("low", -0.7),
            ("loss", -1.0),
            ("crash", -1.5),
            ("bear", -1.2),
            ("weak", -0.8),
            ("downgrade", -1.0),
            ("miss", -0.9),
            ("decline", -0.9),
        ];

        Self {
            positive: positive
                .iter()
                .map(|(w, v)| (w.to_string(), *v))
                .collect(),
            negative: negative
                .iter()
                .map(|(w, v)| (w.to_string(), *v))
                .collect(),
        }
    }
}

fn normalize_map(map: HashMap<String, f64>) -> Result<HashMap<String, f64>, LexiconError> {
    let mut normalized = HashMap::with_capacity(map.len());
    for (word, weight) in map {
        if word.is_empty() || word.chars().any(char::is_whitespace) {
            return Err(LexiconError::InvalidWord(word));
        }
        if !weight.is_finite() {
            return Err(LexiconError::NonFinite { word });
        }
        let key = word.to_lowercase();
        if let Some(previous) = normalized.insert(key.clone(), weight) {
            if previous != weight {
                return Err(LexiconError::Duplicate(key));
            }
        }
    }
    Ok(normalized)
}

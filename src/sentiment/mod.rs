//! Sentiment scoring
//!
//! Lexicon-based heuristic scoring of social-media text.
//!
//! ```text
//! Lexicon (positive/negative word weights)
//!     ↓  RwLock<Arc<Lexicon>>, whole-map replace
//! LexiconScorer::score(text)
//!     ↓
//! SentimentResult { score, confidence, keywords, computed_at }
//! ```

pub mod lexicon;
pub mod reload;
pub mod scorer;
pub mod types;

pub use lexicon::{Lexicon, LexiconError};
pub use reload::{lexicon_reload_task, LexiconReloader};
pub use scorer::LexiconScorer;
pub use types::{RawItem, SentimentResult};

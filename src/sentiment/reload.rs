//! Background lexicon hot-reload
//!
//! Polls the lexicon file's modification time and swaps the scorer's
//! lexicon when the file changes. Invalid files are logged and skipped;
//! the previous lexicon stays active.

use super::lexicon::{Lexicon, LexiconError};
use super::scorer::LexiconScorer;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::time::interval;

/// Tracks the last applied modification time of a lexicon file
pub struct LexiconReloader {
    path: PathBuf,
    last_modified: Option<SystemTime>,
}

impl LexiconReloader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_modified: None,
        }
    }

    /// Start tracking from the file's current state (already loaded)
    pub fn mark_loaded(&mut self) {
        self.last_modified = modified_time(&self.path);
    }

    /// Reload the lexicon if the file changed since the last check
    ///
    /// # Returns
    /// * `Ok(true)` - file changed and the new lexicon is now active
    /// * `Ok(false)` - file unchanged (or missing)
    /// * `Err(...)` - file changed but failed to load; old lexicon kept
    pub fn check(&mut self, scorer: &LexiconScorer) -> Result<bool, LexiconError> {
        let Some(modified) = modified_time(&self.path) else {
            return Ok(false);
        };
        if self.last_modified == Some(modified) {
            return Ok(false);
        }

        // Remember this version even if it is invalid, so a broken file is
        // reported once rather than on every tick.
        self.last_modified = Some(modified);

        let lexicon = Lexicon::from_file(&self.path)?;
        let words = lexicon.len();
        scorer.replace_lexicon(lexicon);
        log::info!("🔄 Reloaded lexicon from {} ({} words)", self.path.display(), words);
        Ok(true)
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Background task that polls the lexicon file for changes
///
/// Runs indefinitely until cancelled.
pub async fn lexicon_reload_task(
    scorer: Arc<LexiconScorer>,
    mut reloader: LexiconReloader,
    poll_interval: Duration,
) {
    log::info!(
        "📖 Watching lexicon file {} (every {}s)",
        reloader.path.display(),
        poll_interval.as_secs()
    );

    let mut timer = interval(poll_interval);
    // First tick completes immediately; the file was loaded at startup.
    timer.tick().await;

    loop {
        timer.tick().await;
        if let Err(e) = reloader.check(&scorer) {
            log::warn!("⚠️  Lexicon reload failed, keeping current lexicon: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_and_bump(path: &Path, json: &str, reloader: &mut LexiconReloader) {
        fs::write(path, json).unwrap();
        // Force a change even on filesystems with coarse mtime resolution
        reloader.last_modified = Some(SystemTime::UNIX_EPOCH);
    }

    #[test]
    fn test_reload_applies_changed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.json");
        fs::write(&path, r#"{"positive": {"moon": 1.0}}"#).unwrap();

        let scorer = LexiconScorer::new(Lexicon::from_file(&path).unwrap());
        let mut reloader = LexiconReloader::new(&path);
        reloader.mark_loaded();

        assert!(!reloader.check(&scorer).unwrap(), "unchanged file must not reload");

        write_and_bump(&path, r#"{"negative": {"rug": -1.0}}"#, &mut reloader);
        assert!(reloader.check(&scorer).unwrap());
        assert_eq!(scorer.score("rug").score, -1.0);
        assert!(scorer.score("moon").keywords.is_empty());
    }

    #[test]
    fn test_misspelled_key_keeps_previous_lexicon() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.json");
        fs::write(&path, r#"{"positive": {"moon": 1.0}}"#).unwrap();

        let scorer = LexiconScorer::new(Lexicon::from_file(&path).unwrap());
        let mut reloader = LexiconReloader::new(&path);
        reloader.mark_loaded();

        write_and_bump(&path, r#"{"positve": {"moon": 1.0}}"#, &mut reloader);
        assert!(matches!(reloader.check(&scorer), Err(LexiconError::Parse(_))));
        assert_eq!(scorer.score("moon").score, 1.0);
    }

    #[test]
    fn test_invalid_file_keeps_previous_lexicon() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.json");
        fs::write(&path, r#"{"positive": {"moon": 1.0}}"#).unwrap();

        let scorer = LexiconScorer::new(Lexicon::from_file(&path).unwrap());
        let mut reloader = LexiconReloader::new(&path);
        reloader.mark_loaded();

        write_and_bump(
            &path,
            r#"{"positive": {"moon": 1.0}, "negative": {"moon": -1.0}}"#,
            &mut reloader,
        );
        assert!(reloader.check(&scorer).is_err());
        assert_eq!(scorer.score("moon").score, 1.0);

        // Same broken version is not reported again
        assert!(!reloader.check(&scorer).unwrap());
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let scorer = LexiconScorer::default();
        let mut reloader = LexiconReloader::new(dir.path().join("absent.json"));
        assert!(!reloader.check(&scorer).unwrap());
    }
}

//! Service configuration from environment variables

use crate::aggregator::DEFAULT_TRENDING_SYMBOLS;
use crate::sources::{RedditCredentials, TwitterCredentials};
use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Configuration for the sentiment service
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    /// SQLite history file; `None` disables history
    pub db_path: Option<PathBuf>,

    /// Reddit credentials (source disabled when absent)
    pub reddit: Option<RedditCredentials>,

    /// X credentials (source disabled when absent)
    pub twitter: Option<TwitterCredentials>,

    /// Source ids switched off regardless of credentials
    pub disabled_sources: HashSet<String>,

    pub http_timeout: Duration,

    pub trending_symbols: Vec<String>,

    /// Optional lexicon file replacing the built-in lexicon
    pub lexicon_path: Option<PathBuf>,
    pub lexicon_reload_interval: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `HOST` (default: 0.0.0.0)
    /// - `PORT` (default: 8080)
    /// - `SENTIMENT_DB_PATH` (default: sentiment.db, empty disables history)
    /// - `REDDIT_CLIENT_ID`, `REDDIT_CLIENT_SECRET`
    /// - `TWITTER_API_KEY`, `TWITTER_API_SECRET`, `TWITTER_BEARER_TOKEN`
    /// - `DISABLED_SOURCES` (comma-separated, default: none)
    /// - `HTTP_TIMEOUT_SECS` (default: 10)
    /// - `TRENDING_SYMBOLS` (default: BTC,ETH,BNB,XRP,DOGE)
    /// - `LEXICON_PATH` (default: built-in lexicon)
    /// - `LEXICON_RELOAD_INTERVAL_SECS` (default: 300)
    pub fn from_env() -> Result<Self, ConfigError> {
        let db_path = match env::var("SENTIMENT_DB_PATH") {
            Ok(path) if path.trim().is_empty() => None,
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => Some(PathBuf::from("sentiment.db")),
        };

        let reddit = match (non_empty("REDDIT_CLIENT_ID"), non_empty("REDDIT_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(RedditCredentials {
                client_id,
                client_secret,
            }),
            _ => None,
        };

        let bearer_token = non_empty("TWITTER_BEARER_TOKEN");
        let twitter = match (non_empty("TWITTER_API_KEY"), non_empty("TWITTER_API_SECRET")) {
            (Some(api_key), Some(api_secret)) => Some(TwitterCredentials {
                api_key,
                api_secret,
                bearer_token,
            }),
            _ => bearer_token.map(|token| TwitterCredentials {
                api_key: String::new(),
                api_secret: String::new(),
                bearer_token: Some(token),
            }),
        };

        let disabled_sources = comma_list("DISABLED_SOURCES")
            .map(|ids| ids.into_iter().map(|id| id.to_lowercase()).collect())
            .unwrap_or_default();

        let trending_symbols = comma_list("TRENDING_SYMBOLS")
            .filter(|symbols| !symbols.is_empty())
            .unwrap_or_else(|| DEFAULT_TRENDING_SYMBOLS.iter().map(|s| s.to_string()).collect());

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 8080)?,
            db_path,
            reddit,
            twitter,
            disabled_sources,
            http_timeout: Duration::from_secs(parse_var("HTTP_TIMEOUT_SECS", 10)?),
            trending_symbols,
            lexicon_path: non_empty("LEXICON_PATH").map(PathBuf::from),
            lexicon_reload_interval: Duration::from_secs(parse_var(
                "LEXICON_RELOAD_INTERVAL_SECS",
                300,
            )?),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether a source with credentials should take part in aggregation
    pub fn is_source_allowed(&self, source_id: &str) -> bool {
        !self.disabled_sources.contains(source_id)
    }
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn comma_list(var: &str) -> Option<Vec<String>> {
    env::var(var).ok().map(|s| {
        s.split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    })
}

fn parse_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        _ => Ok(default),
    }
}

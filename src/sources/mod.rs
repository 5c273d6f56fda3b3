//! Social-media source fetchers
//!
//! Each platform implements [`SourceFetcher`]. Fetchers either return the
//! recent items for a symbol or fail; they never retry. Failures are carried
//! back to the aggregator as data so it can decide between partial and total
//! failure.
//!
//! ## Sources
//!
//! - `reddit` - r/cryptocurrency plus r/{symbol} search (OAuth client credentials)
//! - `twitter` - X recent search (app bearer token)

pub mod reddit;
pub mod token;
pub mod twitter;

use crate::sentiment::RawItem;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use reddit::{RedditCredentials, RedditFetcher};
pub use twitter::{TwitterCredentials, TwitterFetcher};

pub const REDDIT_SOURCE: &str = "reddit";
pub const TWITTER_SOURCE: &str = "twitter";

pub const USER_AGENT: &str = "CryptoSentimentBot/1.0";

/// Longest error body kept in a [`FetchError::Status`]
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Build a status error from a failed response, keeping a short body excerpt
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        FetchError::Status {
            status,
            body: truncate(&body, MAX_ERROR_BODY),
        }
    }
}

/// Fetches recent text items mentioning a symbol from one platform
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Stable id used as the `per_source` key (e.g. "reddit")
    fn source_id(&self) -> &str;

    /// Fetch recent items for `symbol`
    async fn fetch(&self, symbol: &str) -> Result<Vec<RawItem>, FetchError>;
}

/// Shared HTTP client for fetchers
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, FetchError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
        // Multi-byte characters are never split
        assert_eq!(truncate("ééééé", 2), "éé…");
    }

    #[test]
    fn test_status_error_display() {
        let err = FetchError::Status {
            status: 429,
            body: "Too Many Requests".to_string(),
        };
        assert_eq!(err.to_string(), "API returned 429: Too Many Requests");
    }
}

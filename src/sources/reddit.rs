//! Reddit search integration
//!
//! Authenticates with the OAuth2 client-credentials grant and searches:
//! - `r/cryptocurrency` (required; failure fails the fetch)
//! - `r/{symbol}` (best effort; many symbols have no subreddit)
//!
//! ## API Reference
//!
//! Token:  POST https://www.reddit.com/api/v1/access_token
//! Search: GET  https://oauth.reddit.com/r/{subreddit}/search.json?q={symbol}&sort=new&limit=100

use super::token::{TokenCache, TokenResponse};
use super::{FetchError, SourceFetcher, REDDIT_SOURCE};
use crate::sentiment::RawItem;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";
const MAIN_SUBREDDIT: &str = "cryptocurrency";
const SEARCH_LIMIT: &str = "100";

#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Reddit listing envelope
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: RedditPost,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditPost {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    pub created_utc: Option<f64>,
}

impl RedditPost {
    fn into_item(self) -> RawItem {
        let text = if self.selftext.is_empty() {
            self.title
        } else {
            format!("{} {}", self.title, self.selftext)
        };
        RawItem {
            source: REDDIT_SOURCE.to_string(),
            text,
            created_at: self
                .created_utc
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs as i64, 0)),
        }
    }
}

/// Parse a search listing into raw items
pub fn parse_listing(json: &str) -> Result<Vec<RawItem>, FetchError> {
    let listing: Listing =
        serde_json::from_str(json).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(listing
        .data
        .children
        .into_iter()
        .map(|child| child.data.into_item())
        .collect())
}

/// Subreddit searched for a symbol, if the symbol can name one
///
/// Only ASCII letters and digits are accepted since the name goes into the
/// request path.
pub fn symbol_subreddit(symbol: &str) -> Option<String> {
    let name = symbol.to_lowercase();
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric());
    (valid && name != MAIN_SUBREDDIT).then_some(name)
}

pub struct RedditFetcher {
    client: reqwest::Client,
    credentials: RedditCredentials,
    token: TokenCache,
}

impl RedditFetcher {
    pub fn new(client: reqwest::Client, credentials: RedditCredentials) -> Self {
        Self {
            client,
            credentials,
            token: TokenCache::new(),
        }
    }

    async fn request_token(&self) -> Result<(String, Option<Duration>), FetchError> {
        log::debug!("🔑 Requesting Reddit access token");

        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::from_response(response).await);
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Auth(e.to_string()))?;

        match body.access_token {
            Some(token) if !token.is_empty() => {
                Ok((token, body.expires_in.map(Duration::from_secs)))
            }
            _ => Err(FetchError::Auth(
                body.error.unwrap_or_else(|| "no access_token in response".to_string()),
            )),
        }
    }

    async fn search(&self, subreddit: &str, symbol: &str) -> Result<Vec<RawItem>, FetchError> {
        let token = self.token.get_or_refresh(|| self.request_token()).await?;
        let url = format!("{}/r/{}/search.json", API_BASE, subreddit);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .query(&[("q", symbol), ("sort", "new"), ("limit", SEARCH_LIMIT)])
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.token.invalidate().await;
            return Err(FetchError::Auth("Reddit rejected access token".to_string()));
        }
        if !response.status().is_success() {
            return Err(FetchError::from_response(response).await);
        }

        let body = response.text().await?;
        parse_listing(&body)
    }
}

#[async_trait]
impl SourceFetcher for RedditFetcher {
    fn source_id(&self) -> &str {
        REDDIT_SOURCE
    }

    async fn fetch(&self, symbol: &str) -> Result<Vec<RawItem>, FetchError> {
        let mut items = self.search(MAIN_SUBREDDIT, symbol).await?;

        if let Some(symbol_sub) = symbol_subreddit(symbol) {
            match self.search(&symbol_sub, symbol).await {
                Ok(extra) => items.extend(extra),
                Err(e) => log::warn!("⚠️  r/{} search skipped: {}", symbol_sub, e),
            }
        }

        log::debug!("Reddit returned {} posts for {}", items.len(), symbol);
        Ok(items)
    }
}

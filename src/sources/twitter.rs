//! X (Twitter) recent-search integration
//!
//! Uses an app-only bearer token, either pre-issued (`TWITTER_BEARER_TOKEN`)
//! or exchanged from the API key/secret pair.
//!
//! ## API Reference
//!
//! Token:  POST https://api.twitter.com/oauth2/token
//! Search: GET  https://api.twitter.com/2/tweets/search/recent
//!         ?query="{symbol} crypto -is:retweet lang:en"&max_results=100

use super::token::{TokenCache, TokenResponse};
use super::{FetchError, SourceFetcher, TWITTER_SOURCE};
use crate::sentiment::RawItem;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const TOKEN_URL: &str = "https://api.twitter.com/oauth2/token";
const SEARCH_URL: &str = "https://api.twitter.com/2/tweets/search/recent";
const MAX_RESULTS: &str = "100";

#[derive(Debug, Clone)]
pub struct TwitterCredentials {
    pub api_key: String,
    pub api_secret: String,
    /// Pre-issued bearer token; skips the token exchange when set
    pub bearer_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Option<Vec<Tweet>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tweet {
    #[serde(default)]
    pub id: String,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Build the recent-search query for a symbol
pub fn search_query(symbol: &str) -> String {
    format!("{} crypto -is:retweet lang:en", symbol)
}

/// Parse a recent-search response into raw items
///
/// A response without `data` means no matching tweets.
pub fn parse_search(json: &str) -> Result<Vec<RawItem>, FetchError> {
    let response: SearchResponse =
        serde_json::from_str(json).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(response
        .data
        .unwrap_or_default()
        .into_iter()
        .map(|tweet| RawItem {
            source: TWITTER_SOURCE.to_string(),
            text: tweet.text,
            created_at: tweet.created_at,
        })
        .collect())
}

pub struct TwitterFetcher {
    client: reqwest::Client,
    credentials: TwitterCredentials,
    token: TokenCache,
}

impl TwitterFetcher {
    pub fn new(client: reqwest::Client, credentials: TwitterCredentials) -> Self {
        let token = match &credentials.bearer_token {
            Some(bearer) => TokenCache::fixed(bearer.clone()),
            None => TokenCache::new(),
        };
        Self {
            client,
            credentials,
            token,
        }
    }

    /// Obtain (and cache) a bearer token up front
    ///
    /// Called at startup; a source that cannot authenticate is left disabled.
    pub async fn authenticate(&self) -> Result<(), FetchError> {
        self.token.get_or_refresh(|| self.request_token()).await?;
        Ok(())
    }

    async fn request_token(&self) -> Result<(String, Option<Duration>), FetchError> {
        log::debug!("🔑 Requesting X bearer token");

        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&self.credentials.api_key, Some(&self.credentials.api_secret))
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
            // App-only bearer tokens do not expire
            Some(token) if !token.is_empty() => Ok((token, None)),
            _ => Err(FetchError::Auth(
                body.error.unwrap_or_else(|| "no access_token in response".to_string()),
            )),
        }
    }
}

#[async_trait]
impl SourceFetcher for TwitterFetcher {
    fn source_id(&self) -> &str {
        TWITTER_SOURCE
    }

    async fn fetch(&self, symbol: &str) -> Result<Vec<RawItem>, FetchError> {
        let token = self.token.get_or_refresh(|| self.request_token()).await?;
        let query = search_query(symbol);

        let response = self
            .client
            .get(SEARCH_URL)
            .bearer_auth(&token)
            .query(&[
                ("query", query.as_str()),
                ("max_results", MAX_RESULTS),
                ("tweet.fields", "created_at"),
            ])
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            if self.credentials.bearer_token.is_none() {
                self.token.invalidate().await;
            }
            return Err(FetchError::Auth("X rejected bearer token".to_string()));
        }
        if !response.status().is_success() {
            return Err(FetchError::from_response(response).await);
        }

        let body = response.text().await?;
        let items = parse_search(&body)?;
        log::debug!("X returned {} tweets for {}", items.len(), symbol);
        Ok(items)
    }
}

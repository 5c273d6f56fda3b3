//! OAuth access-token caching shared by the fetchers

use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Tokens are refreshed this long before the server-reported expiry
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Response body of an OAuth2 client-credentials token request
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// Single cached bearer token
///
/// The async mutex is held across the refresh request, so concurrent
/// requests wait for one token exchange instead of each starting their own.
#[derive(Debug, Default)]
pub struct TokenCache {
    inner: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache that always returns `token` (pre-issued, never expires)
    pub fn fixed(token: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(Some(CachedToken {
                value: token.into(),
                expires_at: None,
            })),
        }
    }

    /// Return the cached token, refreshing it with `refresh` when missing or stale
    pub async fn get_or_refresh<F, Fut, E>(&self, refresh: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<(String, Option<Duration>), E>>,
    {
        let mut guard = self.inner.lock().await;
        if let Some(token) = guard.as_ref() {
            if token.is_fresh(Instant::now()) {
                return Ok(token.value.clone());
            }
        }

        let (value, lifetime) = refresh().await?;
        let expires_at = lifetime.map(|l| Instant::now() + l.saturating_sub(EXPIRY_MARGIN));
        *guard = Some(CachedToken {
            value: value.clone(),
            expires_at,
        });
        Ok(value)
    }

    /// Drop the cached token (e.g. after a 401)
    pub async fn invalidate(&self) {
        *self.inner.lock().await = None;
    }
}

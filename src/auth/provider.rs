//! Token provider implementation
//!
//! Exchanges client credentials for a bearer token and keeps it cached.
//! Reads of a valid token only take the shared read lock; refreshes are
//! serialized so concurrent callers see a single exchange in flight.

use super::types::{AccessToken, Credentials};
use crate::config::TapConfig;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// OAuth scope requested for seller API access
pub const SCOPE: &str = "Seller_Api";

/// Timeout for the token exchange
pub const TOKEN_TIMEOUT: Duration = Duration::from_secs(60);

/// Process-wide providers, one per credential pair and endpoint
static REGISTRY: Lazy<std::sync::Mutex<HashMap<(Credentials, String), Arc<TokenProvider>>>> =
    Lazy::new(|| std::sync::Mutex::new(HashMap::new()));

/// Obtains and caches the bearer token for one credential pair
pub struct TokenProvider {
    /// Client credentials
    credentials: Credentials,
    /// Token endpoint URL
    token_url: String,
    /// Cached token
    cached_token: RwLock<Option<AccessToken>>,
    /// Held for the duration of a token exchange
    refresh_lock: Mutex<()>,
    /// HTTP client for token requests
    http_client: Client,
    /// Number of completed exchanges
    refreshes: AtomicU64,
}

impl TokenProvider {
    /// Create a standalone provider
    ///
    /// Most callers want [`TokenProvider::shared`]; a standalone provider does
    /// not share its token with the rest of the process.
    pub fn new(credentials: Credentials, token_url: impl Into<String>) -> Self {
        Self {
            credentials,
            token_url: token_url.into(),
            cached_token: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            http_client: Client::new(),
            refreshes: AtomicU64::new(0),
        }
    }

    /// Get the process-wide provider for the configured credentials
    ///
    /// The first call creates it; later calls with the same credentials and
    /// token endpoint return the same handle.
    pub fn shared(config: &TapConfig) -> Arc<Self> {
        let credentials = Credentials::new(&config.client_id, &config.client_secret);
        let key = (credentials.clone(), config.auth_url.clone());

        let mut registry = REGISTRY
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        registry
            .entry(key)
            .or_insert_with(|| Arc::new(Self::new(credentials, config.auth_url.clone())))
            .clone()
    }

    /// Get a valid token, refreshing if it is missing or expired
    pub async fn get_token(&self) -> Result<AccessToken> {
        self.get_token_at(Utc::now()).await
    }

    /// Get a token that is valid at `now`
    pub(crate) async fn get_token_at(&self, now: DateTime<Utc>) -> Result<AccessToken> {
        if let Some(token) = self.cached_valid_at(now).await {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited
        if let Some(token) = self.cached_valid_at(now).await {
            return Ok(token);
        }

        self.exchange().await
    }

    /// Fetch a new token unconditionally
    pub async fn refresh(&self) -> Result<AccessToken> {
        let _guard = self.refresh_lock.lock().await;
        self.exchange().await
    }

    /// Drop the cached token so the next request exchanges again
    pub async fn invalidate(&self) {
        let mut cached = self.cached_token.write().await;
        *cached = None;
    }

    /// Number of token exchanges performed so far
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }

    /// Client id this provider authenticates as
    pub fn client_id(&self) -> &str {
        &self.credentials.client_id
    }

    async fn cached_valid_at(&self, now: DateTime<Utc>) -> Option<AccessToken> {
        let cached = self.cached_token.read().await;
        cached.as_ref().filter(|t| t.is_valid_at(now)).cloned()
    }

    /// Perform the exchange and store the result; caller holds `refresh_lock`
    async fn exchange(&self) -> Result<AccessToken> {
        let request_time = Utc::now();
        debug!(token_url = %self.token_url, "Requesting OAuth token");

        let response = self
            .http_client
            .get(&self.token_url)
            .header(AUTHORIZATION, self.credentials.basic_header())
            .query(&[("grant_type", "client_credentials"), ("scope", SCOPE)])
            .timeout(TOKEN_TIMEOUT)
            .send()
            .await
            .map_err(|e| self.request_failed(&e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.request_failed(&e))?;
        if !status.is_success() {
            // Prefer the parsed JSON error body when there is one
            let body = serde_json::from_str::<Value>(&text)
                .map(|v| v.to_string())
                .unwrap_or(text);
            return Err(Error::authentication(status.as_u16(), body));
        }

        // A 2xx reply without a usable token is still a failed login
        let token_response: TokenResponse = serde_json::from_str(&text)
            .map_err(|_| Error::authentication(status.as_u16(), text.clone()))?;
        info!("OAuth authorization attempt was successful.");

        let expires_in = token_response.expires_in_seconds();
        if expires_in.is_none() {
            warn!(
                "No expires_in received in OAuth response. Token will be treated as if it never expires."
            );
        }

        let token = AccessToken::new(token_response.access_token, expires_in, request_time);
        {
            let mut cached = self.cached_token.write().await;
            *cached = Some(token.clone());
        }
        self.refreshes.fetch_add(1, Ordering::Relaxed);

        Ok(token)
    }
}

impl TokenProvider {
    fn request_failed(&self, err: &reqwest::Error) -> Error {
        Error::TokenRequest {
            url: self.token_url.clone(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("credentials", &self.credentials)
            .field("token_url", &self.token_url)
            .field("refreshes", &self.refresh_count())
            .finish_non_exhaustive()
    }
}

/// OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<Value>,
}

impl TokenResponse {
    /// Lifetime in seconds; missing, zero or unparseable means no expiry
    fn expires_in_seconds(&self) -> Option<i64> {
        let secs = match self.expires_in.as_ref()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }?;
        (secs != 0).then_some(secs)
    }
}

#[cfg(test)]
mod provider_tests {
    use super::*;
    use serde_json::json;

    fn response(expires_in: Value) -> TokenResponse {
        serde_json::from_value(json!({"access_token": "t", "expires_in": expires_in})).unwrap()
    }

    #[test]
    fn test_expires_in_parsing() {
        assert_eq!(response(json!(3600)).expires_in_seconds(), Some(3600));
        assert_eq!(response(json!("120")).expires_in_seconds(), Some(120));
        assert_eq!(response(json!(0)).expires_in_seconds(), None);
        assert_eq!(response(Value::Null).expires_in_seconds(), None);

        let missing: TokenResponse =
            serde_json::from_value(json!({"access_token": "t"})).unwrap();
        assert_eq!(missing.expires_in_seconds(), None);
    }

    #[test]
    fn test_shared_returns_same_instance() {
        let config = TapConfig::new("shared-id", "shared-secret");
        let a = TokenProvider::shared(&config);
        let b = TokenProvider::shared(&config);
        assert!(Arc::ptr_eq(&a, &b));

        let other = TokenProvider::shared(&TapConfig::new("other-id", "shared-secret"));
        assert!(!Arc::ptr_eq(&a, &other));
    }
}

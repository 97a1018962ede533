//! HTTP client with retry and rate limiting
//!
//! Every page request, first or continuation, goes through
//! [`HttpClient::execute`], so transient failures are retried the same way:
//! - Exponential backoff, capped at `max_backoff`
//! - `Retry-After` honoured on 429
//! - Rate limiting to stay under the seller API quota
//! - Bearer token attached from the shared `TokenProvider`, refreshed once on 401
//!
//! Which failures are retried is decided by [`Error::is_retryable`].

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::request::RequestDescriptor;
use crate::auth::TokenProvider;
use crate::config::TapConfig;
use crate::error::{Error, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Wait used when a 429 carries no usable `Retry-After`
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for relative request URLs
    pub base_url: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry
    pub initial_backoff: Duration,
    /// Upper bound for the backoff delay
    pub max_backoff: Duration,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(300),
            max_retries: 5,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(60),
            rate_limit: Some(RateLimiterConfig::default()),
            user_agent: format!("tap-flipkart/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }

    /// Derive transport settings from the tap configuration
    pub fn from_tap_config(config: &TapConfig) -> Self {
        let mut builder = Self::builder()
            .base_url(config.base_url())
            .max_retries(config.max_retries)
            .rate_limit(RateLimiterConfig::per_second(config.requests_per_second));
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent);
        }
        builder.build()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    token_provider: Option<Arc<TokenProvider>>,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create an unauthenticated client
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(Error::Http)?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            token_provider: None,
            rate_limiter,
        })
    }

    /// Create a client that authenticates every request
    pub fn with_auth(config: HttpClientConfig, token_provider: Arc<TokenProvider>) -> Result<Self> {
        let mut client = Self::with_config(config)?;
        client.token_provider = Some(token_provider);
        Ok(client)
    }

    /// Execute a request, retrying transient failures
    ///
    /// Returns the response only for a 2xx status; any other status becomes
    /// [`Error::HttpStatus`] carrying the response body.
    pub async fn execute(&self, request: &RequestDescriptor) -> Result<Response> {
        let url = self.build_url(&request.url);
        let mut retries = 0;
        let mut reauthenticated = false;

        loop {
            let err = match self.send(request, &url).await {
                Ok(response) if response.status().is_success() => {
                    debug!(method = %request.method, url = %url, "Request succeeded");
                    return Ok(response);
                }
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::UNAUTHORIZED && !reauthenticated {
                        if let Some(provider) = &self.token_provider {
                            warn!(url = %url, "Got 401, refreshing token");
                            provider.invalidate().await;
                            reauthenticated = true;
                            continue;
                        }
                    }
                    Self::status_error(response).await
                }
                Err(e) => e,
            };

            if !err.is_retryable() || retries >= self.config.max_retries {
                return Err(err);
            }

            let delay = match &err {
                Error::RateLimited {
                    retry_after_seconds,
                } => Duration::from_secs(*retry_after_seconds),
                _ => self.calculate_backoff(retries),
            };
            retries += 1;
            warn!(
                url = %url,
                attempt = retries,
                max_retries = self.config.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Retrying request"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Execute a request and parse the body as a JSON object
    pub async fn execute_json(&self, request: &RequestDescriptor) -> Result<Value> {
        let response = self.execute(request).await?;
        let url = response.url().to_string();
        let text = response.text().await.map_err(Error::Http)?;

        let body: Value = serde_json::from_str(&text)
            .map_err(|e| Error::malformed(&url, format!("body is not valid JSON: {e}")))?;
        if !body.is_object() {
            return Err(Error::malformed(&url, "body is not a JSON object"));
        }
        Ok(body)
    }

    /// One attempt: rate limit, authenticate, send
    async fn send(&self, request: &RequestDescriptor, url: &str) -> Result<Response> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.wait().await;
        }

        let mut req = self
            .client
            .request(request.method.into(), url)
            .header(ACCEPT, "application/json")
            .timeout(self.config.timeout);
        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }
        if let Some(provider) = &self.token_provider {
            let token = provider.get_token().await?;
            req = req.header(AUTHORIZATION, token.bearer_header());
        }

        req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                }
            } else {
                Error::Http(e)
            }
        })
    }

    /// Turn a non-2xx response into an error
    async fn status_error(response: Response) -> Error {
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_seconds = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Error::RateLimited {
                retry_after_seconds,
            };
        }
        let body = response.text().await.unwrap_or_default();
        Error::http_status(status.as_u16(), body)
    }

    /// Resolve a request URL against the base URL
    pub(crate) fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            None => path.to_string(),
        }
    }

    /// Delay before retry number `retry + 1`
    pub(crate) fn calculate_backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.config
            .initial_backoff
            .saturating_mul(factor)
            .min(self.config.max_backoff)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("authenticated", &self.token_provider.is_some())
            .field("rate_limiter", &self.rate_limiter)
            .finish_non_exhaustive()
    }
}

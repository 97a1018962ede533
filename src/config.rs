//! Tap configuration
//!
//! `TapConfig` holds the settings the tap is started with. It is loaded from
//! a JSON (or YAML) file or an inline JSON string, validated once, and then
//! shared read-only by every stream.

use crate::error::{Error, Result, ResultExt};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use url::Url;

/// Default base URL for seller API resources
pub const DEFAULT_API_URL: &str = "https://api.flipkart.net/sellers";

/// Default OAuth token endpoint
pub const DEFAULT_AUTH_URL: &str = "https://api.flipkart.net/oauth-service/oauth/token";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_auth_url() -> String {
    DEFAULT_AUTH_URL.to_string()
}

fn default_page_size() -> u32 {
    20
}

fn default_max_retries() -> u32 {
    5
}

fn default_requests_per_second() -> u32 {
    10
}

/// Include/exclude lists for shipment states
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSelections {
    /// Only sync these states (empty = all)
    #[serde(default)]
    pub include: Vec<String>,
    /// Never sync these states
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl StateSelections {
    /// Whether a shipment state passes the include/exclude lists
    pub fn allows(&self, state: &str) -> bool {
        let listed = |list: &[String]| list.iter().any(|s| s.eq_ignore_ascii_case(state));
        if listed(&self.exclude) {
            return false;
        }
        self.include.is_empty() || listed(&self.include)
    }
}

/// Settings for one tap run
#[derive(Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// OAuth client id
    #[serde(default)]
    pub client_id: String,

    /// OAuth client secret
    #[serde(default)]
    pub client_secret: String,

    /// Earliest date to sync (`YYYY-MM-DD`)
    #[serde(default)]
    pub start_date: Option<String>,

    /// Shipment state include/exclude lists
    #[serde(default)]
    pub shipment_state_selections: StateSelections,

    /// Custom User-Agent header
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Base URL for API resources
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Token endpoint
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Shipments requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Retries for transient request failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Request rate limit
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            start_date: None,
            shipment_state_selections: StateSelections::default(),
            user_agent: None,
            api_url: default_api_url(),
            auth_url: default_auth_url(),
            page_size: default_page_size(),
            max_retries: default_max_retries(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

// Secrets stay out of debug output and logs.
impl std::fmt::Debug for TapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapConfig")
            .field("client_id", &"<redacted>")
            .field("client_secret", &"<redacted>")
            .field("start_date", &self.start_date)
            .field("shipment_state_selections", &self.shipment_state_selections)
            .field("user_agent", &self.user_agent)
            .field("api_url", &self.api_url)
            .field("auth_url", &self.auth_url)
            .field("page_size", &self.page_size)
            .field("max_retries", &self.max_retries)
            .field("requests_per_second", &self.requests_per_second)
            .finish()
    }
}

impl TapConfig {
    /// Create a config with the given credentials and defaults for the rest
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Default::default()
        }
    }

    /// Set the start date
    #[must_use]
    pub fn with_start_date(mut self, start_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self
    }

    /// Point both endpoints at another host (used against mock servers)
    #[must_use]
    pub fn with_urls(mut self, api_url: impl Into<String>, auth_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self.auth_url = auth_url.into();
        self
    }

    /// Load config from a file; `.yaml`/`.yml` is parsed as YAML, anything else as JSON
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let config: Self = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load config from an inline JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check required fields and value formats
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::missing_field("client_id"));
        }
        if self.client_secret.trim().is_empty() {
            return Err(Error::missing_field("client_secret"));
        }

        if let Some(start) = &self.start_date {
            parse_start_date(start)?;
        }

        Url::parse(&self.api_url)
            .map_err(|e| Error::invalid_value("api_url", e.to_string()))?;
        Url::parse(&self.auth_url)
            .map_err(|e| Error::invalid_value("auth_url", e.to_string()))?;

        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be at least 1"));
        }

        Ok(())
    }

    /// Start date as a UTC instant (midnight of the configured day)
    pub fn start_datetime(&self) -> Result<Option<DateTime<Utc>>> {
        self.start_date.as_deref().map(parse_start_date).transpose()
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

/// Parse a `YYYY-MM-DD` date, also accepting a full RFC 3339 timestamp
fn parse_start_date(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::invalid_value("start_date", format!("expected YYYY-MM-DD, got '{value}'")))
}

/// JSON Schema describing the accepted settings
pub fn config_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "client_id": {
                "type": "string",
                "secret": true,
                "writeOnly": true,
                "description": "OAuth client id of the seller application"
            },
            "client_secret": {
                "type": "string",
                "secret": true,
                "writeOnly": true,
                "description": "OAuth client secret of the seller application"
            },
            "start_date": {
                "type": "string",
                "format": "date",
                "description": "The earliest record date to sync"
            },
            "shipment_state_selections": {
                "type": "object",
                "properties": {
                    "include": { "type": "array", "items": { "type": "string" } },
                    "exclude": { "type": "array", "items": { "type": "string" } }
                },
                "description": "Shipment states to include or exclude"
            },
            "user_agent": {
                "type": "string",
                "description": "User-Agent header sent with every request"
            },
            "api_url": {
                "type": "string",
                "default": DEFAULT_API_URL
            },
            "auth_url": {
                "type": "string",
                "default": DEFAULT_AUTH_URL
            },
            "page_size": { "type": "integer", "default": default_page_size() },
            "max_retries": { "type": "integer", "default": default_max_retries() },
            "requests_per_second": { "type": "integer", "default": default_requests_per_second() }
        },
        "required": ["client_id", "client_secret"]
    })
}

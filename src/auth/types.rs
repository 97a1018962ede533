//! Auth value types
//!
//! Credentials as read from configuration and the access token returned by
//! the token endpoint.

use base64::Engine;
use chrono::{DateTime, Duration, Utc};

/// OAuth client credentials
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credentials {
    /// Client id
    pub client_id: String,
    /// Client secret
    pub client_secret: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Value for the `Authorization` header of the token request
    pub fn basic_header(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        let encoded = base64::engine::general_purpose::STANDARD.encode(raw.as_bytes());
        format!("Basic {encoded}")
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Bearer token with its validity window
#[derive(Clone)]
pub struct AccessToken {
    /// The access token
    pub token: String,
    /// When the token stops being valid; `None` never expires
    pub expires_at: Option<DateTime<Utc>>,
    /// When the token was requested
    pub last_refreshed: DateTime<Utc>,
}

impl AccessToken {
    /// Create a token requested at `refreshed_at`, valid for `expires_in` seconds
    pub fn new(token: impl Into<String>, expires_in: Option<i64>, refreshed_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at: expires_in.map(|secs| refreshed_at + Duration::seconds(secs)),
            last_refreshed: refreshed_at,
        }
    }

    /// Check validity at a given instant
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now < expires_at,
            None => true,
        }
    }

    /// Check if the token is expired right now
    pub fn is_expired(&self) -> bool {
        !self.is_valid_at(Utc::now())
    }

    /// Value for the `Authorization` header of API requests
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("last_refreshed", &self.last_refreshed)
            .finish()
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_token_valid_until_expiry() {
        let issued = Utc::now();
        let token = AccessToken::new("t", Some(3600), issued);

        assert!(token.is_valid_at(issued + Duration::seconds(3599)));
        assert!(!token.is_valid_at(issued + Duration::seconds(3600)));
        assert!(!token.is_valid_at(issued + Duration::seconds(3601)));
    }

    #[test]
    fn test_token_without_expiry_never_expires() {
        let issued = Utc::now();
        let token = AccessToken::new("t", None, issued);
        assert!(token.expires_at.is_none());
        assert!(token.is_valid_at(issued + Duration::days(3650)));
        assert!(!token.is_expired());
    }

    #[test]
    fn test_expired_token() {
        let token = AccessToken::new("t", Some(-100), Utc::now());
        assert!(token.is_expired());
    }

    #[test]
    fn test_headers() {
        let creds = Credentials::new("user", "pass");
        // base64("user:pass")
        assert_eq!(creds.basic_header(), "Basic dXNlcjpwYXNz");

        let token = AccessToken::new("abc", None, Utc::now());
        assert_eq!(token.bearer_header(), "Bearer abc");
    }

    #[test]
    fn test_debug_redacts() {
        let creds = Credentials::new("user", "pass");
        assert!(!format!("{creds:?}").contains("pass"));

        let token = AccessToken::new("secret-token", None, Utc::now());
        assert!(!format!("{token:?}").contains("secret-token"));
    }
}

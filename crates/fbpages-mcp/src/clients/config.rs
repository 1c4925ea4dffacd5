//! Graph API configuration.
//!
//! Provides the credential and endpoint settings for the Facebook Graph API
//! client. Configuration is loaded from environment variables with defaults
//! pointing at the public Graph API. A missing access token is not an error
//! here: the server still starts and lists its tools, and each tool call
//! reports that it is not configured.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default Graph API base URL (versioned).
pub const DEFAULT_GRAPH_API_URL: &str = "https://graph.facebook.com/v22.0";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Page access credential.
///
/// The token is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteCredential {
    /// Page (or user) access token sent with every Graph API request.
    pub access_token: String,

    /// Page used when the caller does not name one.
    pub default_page_id: Option<String>,
}

impl RemoteCredential {
    /// Create a credential from a token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            default_page_id: None,
        }
    }

    /// Set the default page ID.
    pub fn with_page_id(mut self, page_id: impl Into<String>) -> Self {
        self.default_page_id = Some(page_id.into());
        self
    }

    /// Build a credential from optional raw values, ignoring blank tokens.
    pub fn from_parts(access_token: Option<String>, page_id: Option<String>) -> Option<Self> {
        let access_token = access_token.filter(|t| !t.trim().is_empty())?;
        Some(Self {
            access_token,
            default_page_id: page_id.filter(|p| !p.trim().is_empty()),
        })
    }
}

impl fmt::Debug for RemoteCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCredential")
            .field("access_token", &"***")
            .field("default_page_id", &self.default_page_id)
            .finish()
    }
}

/// Graph API client configuration.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Credential, if one was supplied.
    pub credential: Option<RemoteCredential>,

    /// Base URL for the Graph API, including the version segment.
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            credential: None,
            base_url: DEFAULT_GRAPH_API_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl GraphConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `FACEBOOK_PAGE_ACCESS_TOKEN`: Page access token (unset means not configured)
    /// - `FACEBOOK_PAGE_ID`: Default page ID
    /// - `FACEBOOK_GRAPH_API_URL`: Graph API base URL (default: https://graph.facebook.com/v22.0)
    /// - `FACEBOOK_TIMEOUT_SECS`: Request timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();

        let timeout_secs = match std::env::var("FACEBOOK_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "FACEBOOK_TIMEOUT_SECS".to_string(),
                message: format!("expected a whole number of seconds, got {:?}", raw),
            })?,
            Err(_) => default.timeout_secs,
        };

        Ok(Self {
            credential: RemoteCredential::from_parts(
                std::env::var("FACEBOOK_PAGE_ACCESS_TOKEN").ok(),
                std::env::var("FACEBOOK_PAGE_ID").ok(),
            ),
            base_url: std::env::var("FACEBOOK_GRAPH_API_URL").unwrap_or(default.base_url),
            timeout_secs,
        })
    }

    /// Set the credential.
    pub fn with_credential(mut self, credential: RemoteCredential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Get the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether an access token is available.
    pub fn has_auth(&self) -> bool {
        self.credential.is_some()
    }
}

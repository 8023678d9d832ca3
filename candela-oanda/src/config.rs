use core::fmt;
use std::time::Duration;

use candela_core::{BackoffConfig, CandelaError};
use serde::{Deserialize, Serialize};

/// Production REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api-fxtrade.oanda.com";
/// Environment variable holding the bearer token.
pub const API_KEY_ENV: &str = "OANDA_API_KEY";
/// Environment variable overriding [`DEFAULT_API_URL`].
pub const API_URL_ENV: &str = "OANDA_API_URL";

/// Connection settings for the OANDA v3 REST API.
#[derive(Clone, Serialize, Deserialize)]
pub struct OandaConfig {
    /// Base URL, e.g. [`DEFAULT_API_URL`] or the practice endpoint.
    pub api_url: String,
    /// Personal access token sent as `Authorization: Bearer`.
    #[serde(skip_serializing, default)]
    pub api_key: String,
    /// Deadline for a whole request, body included.
    pub request_timeout: Duration,
    /// Maximum idle time between socket reads.
    pub read_timeout: Duration,
    /// Retry policy for transport failures.
    pub backoff: BackoffConfig,
}

impl Default for OandaConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            request_timeout: Duration::from_secs(20),
            read_timeout: Duration::from_secs(5),
            backoff: BackoffConfig::default(),
        }
    }
}

impl fmt::Debug for OandaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OandaConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("backoff", &self.backoff)
            .finish()
    }
}

impl OandaConfig {
    /// Read `OANDA_API_KEY` (required) and `OANDA_API_URL` (optional).
    ///
    /// # Errors
    /// Returns `CandelaError::InvalidArg` when the key is missing or blank.
    pub fn from_env() -> Result<Self, CandelaError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, CandelaError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| CandelaError::InvalidArg(format!("{API_KEY_ENV} is not set")))?;
        let api_url = lookup(API_URL_ENV)
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Ok(Self {
            api_url,
            api_key,
            ..Self::default()
        })
    }
}

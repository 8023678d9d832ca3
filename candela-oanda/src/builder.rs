use std::sync::Arc;
use std::time::Duration;

use candela_core::{BackoffConfig, CandelaError};

use crate::adapter::{OandaHttp, ReqwestAdapter};
use crate::{OandaConfig, OandaConnector};

/// Builder for [`OandaConnector`].
///
/// Starts from [`OandaConfig::default`]; an API key must be supplied unless a
/// custom HTTP adapter is injected.
#[derive(Debug, Clone, Default)]
pub struct OandaConnectorBuilder {
    cfg: OandaConfig,
    http: Option<Arc<dyn OandaHttp>>,
}

impl OandaConnectorBuilder {
    /// Start from an existing configuration.
    #[must_use]
    pub fn from_config(cfg: OandaConfig) -> Self {
        Self { cfg, http: None }
    }

    /// Bearer token.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.cfg.api_key = key.into();
        self
    }

    /// Base URL (production, practice, or a local proxy).
    #[must_use]
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.cfg.api_url = url.into();
        self
    }

    /// Deadline for one whole request.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.request_timeout = timeout;
        self
    }

    /// Maximum idle time between socket reads.
    #[must_use]
    pub const fn read_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.read_timeout = timeout;
        self
    }

    /// Retry policy for transport failures.
    #[must_use]
    pub const fn backoff(mut self, cfg: BackoffConfig) -> Self {
        self.cfg.backoff = cfg;
        self
    }

    /// Replace the reqwest-backed transport (tests and custom clients).
    #[must_use]
    pub fn http(mut self, http: Arc<dyn OandaHttp>) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the connector.
    ///
    /// # Errors
    /// Returns `CandelaError::InvalidArg` for a bad base URL or a missing API
    /// key (when no adapter was injected), and `CandelaError::Other` if the
    /// HTTP client cannot be created.
    pub fn build(self) -> Result<OandaConnector, CandelaError> {
        let http = match self.http {
            Some(http) => http,
            None => {
                if self.cfg.api_key.trim().is_empty() {
                    return Err(CandelaError::InvalidArg("OANDA api key is empty".into()));
                }
                Arc::new(ReqwestAdapter::new(&self.cfg)?)
            }
        };
        OandaConnector::with_http(&self.cfg.api_url, http, self.cfg.backoff)
    }
}

//! candela-oanda
//!
//! Public connector that implements `CandleProvider` on top of the OANDA v3
//! REST candles endpoint. One `fetch_candles` call is one bounded HTTP GET
//! (20 s request deadline, 5 s read timeout by default); connection-level
//! failures are retried with bounded exponential backoff and jitter.
#![warn(missing_docs)]

/// HTTP adapter definitions and the production adapter backed by `reqwest`.
pub mod adapter;
mod builder;
mod config;
mod retry;
mod wire;

use std::sync::Arc;

use async_trait::async_trait;
use candela_core::{BackoffConfig, CandelaError, CandleProvider, CandleRequest, CandleSeries};
use url::Url;

pub use adapter::{OandaHttp, ReqwestAdapter};
pub use builder::OandaConnectorBuilder;
pub use config::{API_KEY_ENV, API_URL_ENV, DEFAULT_API_URL, OandaConfig};

/// Public connector type. Production users construct it with
/// [`OandaConnector::from_env`] or [`OandaConnector::builder`].
#[derive(Debug, Clone)]
pub struct OandaConnector {
    http: Arc<dyn OandaHttp>,
    base: Url,
    backoff: BackoffConfig,
}

impl OandaConnector {
    /// Connector name used in logs.
    pub const NAME: &'static str = "candela-oanda";

    /// Start building a connector.
    #[must_use]
    pub fn builder() -> OandaConnectorBuilder {
        OandaConnectorBuilder::default()
    }

    /// Build from a configuration with the reqwest-backed adapter.
    ///
    /// # Errors
    /// See [`OandaConnectorBuilder::build`].
    pub fn new(cfg: OandaConfig) -> Result<Self, CandelaError> {
        OandaConnectorBuilder::from_config(cfg).build()
    }

    /// Build from `OANDA_API_KEY` and `OANDA_API_URL`.
    ///
    /// # Errors
    /// Returns `CandelaError::InvalidArg` if the key is not set.
    pub fn from_env() -> Result<Self, CandelaError> {
        Self::new(OandaConfig::from_env()?)
    }

    /// Build around an arbitrary HTTP adapter.
    ///
    /// # Errors
    /// Returns `CandelaError::InvalidArg` if `api_url` is not an absolute URL.
    pub fn with_http(
        api_url: &str,
        http: Arc<dyn OandaHttp>,
        backoff: BackoffConfig,
    ) -> Result<Self, CandelaError> {
        let base = Url::parse(api_url)
            .map_err(|e| CandelaError::InvalidArg(format!("api url {api_url:?}: {e}")))?;
        Ok(Self {
            http,
            base,
            backoff,
        })
    }

    /// The URL a request would be sent to.
    ///
    /// # Errors
    /// Returns `CandelaError::InvalidArg` for timestamps chrono cannot represent.
    pub fn candles_url(&self, req: &CandleRequest) -> Result<Url, CandelaError> {
        wire::candles_url(&self.base, req)
    }
}

#[async_trait]
impl CandleProvider for OandaConnector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candela_oanda::fetch_candles",
            skip(self, req),
            fields(
                symbol = %req.symbol,
                resolution = %req.resolution,
                from = req.range.from(),
                to = req.range.to(),
                include_first = req.include_first,
            ),
            err,
        )
    )]
    async fn fetch_candles(&self, req: &CandleRequest) -> Result<CandleSeries, CandelaError> {
        let url = self.candles_url(req)?;
        let body = retry::with_retry(&self.backoff, &req.symbol, || self.http.get(&url)).await?;
        let series = wire::parse_candles(&body)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(bars = series.len(), "upstream candles received");
        Ok(series)
    }
}

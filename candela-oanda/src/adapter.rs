use std::sync::Arc;

use async_trait::async_trait;
use candela_core::CandelaError;
use url::Url;

use crate::OandaConfig;
use crate::wire::error_message;

/// HTTP abstraction (so we can inject mocks in tests).
///
/// One call is one GET; retrying is the connector's job.
#[async_trait]
pub trait OandaHttp: Send + Sync {
    /// GET `url` and return the body of a successful response.
    ///
    /// Failures map to `UpstreamTimeout`, `Transport` (with `attempts: 1`),
    /// or `UpstreamStatus`.
    async fn get(&self, url: &Url) -> Result<String, CandelaError>;
}

impl core::fmt::Debug for dyn OandaHttp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("OandaHttp")
    }
}

/// Production adapter over a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestAdapter {
    client: reqwest::Client,
    api_key: String,
}

impl ReqwestAdapter {
    /// Build a client with the configured request and read timeouts.
    ///
    /// # Errors
    /// Returns `CandelaError::Other` if the TLS backend cannot be initialized.
    pub fn new(cfg: &OandaConfig) -> Result<Self, CandelaError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .read_timeout(cfg.read_timeout)
            .build()
            .map_err(|e| CandelaError::Other(format!("http client: {e}")))?;
        Ok(Self::with_client(client, cfg.api_key.clone()))
    }

    /// Reuse an existing client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client, api_key: String) -> Self {
        Self { client, api_key }
    }
}

fn map_reqwest(e: &reqwest::Error) -> CandelaError {
    if e.is_timeout() {
        CandelaError::upstream_timeout(format!("oanda candles: {e}"))
    } else if e.is_decode() {
        CandelaError::UpstreamParse(e.to_string())
    } else {
        // connect, request, and body errors are all network-level
        CandelaError::transport(e.to_string(), 1)
    }
}

#[async_trait]
impl OandaHttp for ReqwestAdapter {
    async fn get(&self, url: &Url) -> Result<String, CandelaError> {
        let resp = self
            .client
            .get(url.clone())
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| map_reqwest(&e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| map_reqwest(&e))?;
        if !status.is_success() {
            let msg = error_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_default();
            return Err(CandelaError::upstream_status(status.as_u16(), msg));
        }
        Ok(body)
    }
}

impl dyn OandaHttp {
    /// Test helper that builds an `OandaHttp` from a closure over the request URL.
    pub fn from_fn<F>(f: F) -> Arc<dyn OandaHttp>
    where
        F: Send + Sync + 'static + Fn(&Url) -> Result<String, CandelaError>,
    {
        struct FnHttp<F>(F);

        #[async_trait]
        impl<F> OandaHttp for FnHttp<F>
        where
            F: Send + Sync + 'static + Fn(&Url) -> Result<String, CandelaError>,
        {
            async fn get(&self, url: &Url) -> Result<String, CandelaError> {
                (self.0)(url)
            }
        }

        Arc::new(FnHttp(f))
    }
}

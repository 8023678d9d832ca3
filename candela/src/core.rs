use std::sync::Arc;
use std::time::Duration;

use candela_core::{
    CandelaConfig, CandelaError, CandleProvider, HistoryResponse, RequestContext, Resolution,
    SymbolProvider, TaskHandle,
};
use tokio::sync::Semaphore;

use crate::engine::{Clock, Engine};
use crate::paginate::PaginatingFetcher;
use crate::store::CacheStore;

/// Cached, paginated history engine in front of one candle upstream.
#[derive(Clone)]
pub struct Candela {
    pub(crate) engine: Arc<Engine>,
}

/// Builder for constructing a [`Candela`] engine with custom configuration.
pub struct CandelaBuilder {
    provider: Option<Arc<dyn CandleProvider>>,
    symbols: Option<Arc<dyn SymbolProvider>>,
    store: Option<Arc<CacheStore>>,
    clock: Option<Clock>,
    cfg: CandelaConfig,
}

impl Default for CandelaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CandelaBuilder {
    /// Create a new builder with default limits: 5000 bars per call, 100
    /// concurrent upstream calls, and a daily cache reset.
    #[must_use]
    pub fn new() -> Self {
        Self {
            provider: None,
            symbols: None,
            store: None,
            clock: None,
            cfg: CandelaConfig::default(),
        }
    }

    /// Register the candle upstream. Required.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn CandleProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Validate symbols against `symbols` before fetching.
    ///
    /// Behavior and trade-offs:
    /// - Unknown symbols are answered with `status: error` without any upstream call.
    /// - `EXCHANGE:NAME` inputs are resolved to the provider's canonical name,
    ///   so both spellings share one cache entry.
    #[must_use]
    pub fn with_symbols(mut self, symbols: Arc<dyn SymbolProvider>) -> Self {
        self.symbols = Some(symbols);
        self
    }

    /// Share an existing cache store instead of creating a fresh one.
    #[must_use]
    pub fn store(mut self, store: Arc<CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the wall clock used to clamp planned ranges.
    #[must_use]
    pub fn clock<F>(mut self, now: F) -> Self
    where
        F: Fn() -> i64 + Send + Sync + 'static,
    {
        self.clock = Some(Arc::new(now));
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: CandelaConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Upstream limit on bars per call; larger ranges are split evenly.
    #[must_use]
    pub const fn max_bars_per_call(mut self, max: u32) -> Self {
        self.cfg.max_bars_per_call = max;
        self
    }

    /// Maximum upstream calls in flight across all requests of this engine.
    #[must_use]
    pub const fn max_concurrent_fetches(mut self, max: usize) -> Self {
        self.cfg.max_concurrent_fetches = max;
        self
    }

    /// Interval of the wholesale cache reset started by [`Candela::spawn_reset_timer`].
    #[must_use]
    pub const fn cache_reset_interval(mut self, every: Duration) -> Self {
        self.cfg.cache_reset_interval = every;
        self
    }

    /// Build the engine.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no provider was registered or a limit is zero.
    pub fn build(self) -> Result<Candela, CandelaError> {
        let Some(provider) = self.provider else {
            return Err(CandelaError::InvalidArg(
                "no candle provider registered; add one via with_provider(...)".to_string(),
            ));
        };
        if self.cfg.max_bars_per_call == 0 {
            return Err(CandelaError::InvalidArg(
                "max_bars_per_call must be positive".to_string(),
            ));
        }
        if self.cfg.max_concurrent_fetches == 0 {
            return Err(CandelaError::InvalidArg(
                "max_concurrent_fetches must be positive".to_string(),
            ));
        }
        if self.cfg.cache_reset_interval.is_zero() {
            return Err(CandelaError::InvalidArg(
                "cache_reset_interval must be positive".to_string(),
            ));
        }

        let permits = self.cfg.max_concurrent_fetches.min(Semaphore::MAX_PERMITS);
        let fetcher = PaginatingFetcher::new(
            provider,
            Arc::new(Semaphore::new(permits)),
            self.cfg.max_bars_per_call,
        );
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(|| chrono::Utc::now().timestamp()));

        Ok(Candela {
            engine: Arc::new(Engine {
                store: self.store.unwrap_or_default(),
                fetcher,
                symbols: self.symbols,
                cfg: self.cfg,
                clock,
            }),
        })
    }
}

impl Candela {
    /// Start building a new `Candela` instance.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use candela::{Candela, Resolution};
    ///
    /// let candela = Candela::builder()
    ///     .with_provider(Arc::new(candela_oanda::OandaConnector::from_env()?))
    ///     .max_bars_per_call(5000)
    ///     .build()?;
    /// let _reset = candela.spawn_reset_timer();
    /// let resp = candela.history("EUR_USD", Resolution::H1, from, to).await;
    /// ```
    #[must_use]
    pub fn builder() -> CandelaBuilder {
        CandelaBuilder::new()
    }

    /// Bars of `symbol` with `from <= time <= to`, fetching whatever the cache lacks.
    ///
    /// Never fails: upstream errors and invalid input come back as `status: error`.
    /// The work runs on a spawned task, so dropping this future does not cancel
    /// in-flight upstream calls; their result is still merged into the cache.
    pub async fn history(
        &self,
        symbol: &str,
        resolution: Resolution,
        from: i64,
        to: i64,
    ) -> HistoryResponse {
        self.history_for(RequestContext::new(symbol, resolution, from, to))
            .await
    }

    /// Same as [`Candela::history`] for a prebuilt request.
    pub async fn history_for(&self, ctx: RequestContext) -> HistoryResponse {
        let engine = Arc::clone(&self.engine);
        match tokio::spawn(engine.run(ctx)).await {
            Ok(resp) => resp,
            Err(e) => HistoryResponse::error(format!("history task failed: {e}")),
        }
    }

    /// The candle cache.
    #[must_use]
    pub fn store(&self) -> &Arc<CacheStore> {
        &self.engine.store
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &CandelaConfig {
        &self.engine.cfg
    }

    /// Symbol provider, when one was registered.
    #[must_use]
    pub fn symbols(&self) -> Option<&Arc<dyn SymbolProvider>> {
        self.engine.symbols.as_ref()
    }

    /// Name of the candle upstream.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.engine.fetcher.provider_name()
    }

    /// Reset the cache on the configured interval until the handle is stopped or dropped.
    pub fn spawn_reset_timer(&self) -> TaskHandle {
        self.engine
            .store
            .spawn_reset_timer(self.engine.cfg.cache_reset_interval)
    }
}

impl core::fmt::Debug for Candela {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Candela")
            .field("fetcher", &self.engine.fetcher)
            .field("cfg", &self.engine.cfg)
            .field("entries", &self.engine.store.len())
            .finish_non_exhaustive()
    }
}

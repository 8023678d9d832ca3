//! Candle upstreams for tests and demos.
//!
//! - [`MockConnector`]: a synthetic OANDA-like upstream that answers any
//!   request deterministically and counts its calls.
//! - [`DynamicMockConnector`]: an upstream whose per-symbol behavior is
//!   scripted from the outside through a controller.
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use candela_core::{CandelaError, CandleProvider, CandleRequest, CandleSeries};

mod dynamic;
pub mod fixtures;

pub use dynamic::{DynamicMockConnector, DynamicMockController, MockBehavior};

/// Deterministic synthetic upstream. Provides data for any symbol except the
/// reserved `FAIL` (status error) and `TIMEOUT` (timeout error).
pub struct MockConnector {
    max_bars: Option<i64>,
    latency: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    log: Mutex<Vec<CandleRequest>>,
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnector {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_bars: None,
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Reject calls whose range holds more than `max` bars, like the real API.
    #[must_use]
    pub const fn with_max_bars(mut self, max: i64) -> Self {
        self.max_bars = Some(max);
        self
    }

    /// Sleep this long inside every call.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of `fetch_candles` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Every request received, in arrival order.
    pub fn requests(&self) -> Vec<CandleRequest> {
        self.log.lock().map(|g| g.clone()).unwrap_or_default()
    }

    fn check(&self, req: &CandleRequest) -> Result<(), CandelaError> {
        match req.symbol.as_str() {
            "FAIL" => Err(CandelaError::upstream_status(400, "forced failure")),
            "TIMEOUT" => Err(CandelaError::upstream_timeout("forced timeout")),
            _ => match self.max_bars {
                Some(max) if req.range.bars(req.resolution) > max => Err(
                    CandelaError::upstream_status(400, "Maximum value for 'count' exceeded"),
                ),
                _ => Ok(()),
            },
        }
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CandleProvider for MockConnector {
    fn name(&self) -> &'static str {
        "candela-mock"
    }

    async fn fetch_candles(&self, req: &CandleRequest) -> Result<CandleSeries, CandelaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut log) = self.log.lock() {
            log.push(req.clone());
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.check(req)?;
        Ok(fixtures::history::synthetic_series(req))
    }
}

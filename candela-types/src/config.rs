//! Configuration types shared across the engine and connectors.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Exponential backoff configuration for retrying transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Number of retries after the first attempt; `0` disables retrying.
    pub max_retries: u32,
    /// Minimum backoff delay in milliseconds.
    pub min_backoff_ms: u64,
    /// Maximum backoff delay in milliseconds.
    pub max_backoff_ms: u64,
    /// Exponential factor to increase delay after each failure (>= 1).
    pub factor: u32,
    /// Random jitter percentage [0, 100] added to each delay.
    pub jitter_percent: u8,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_backoff_ms: 250,
            max_backoff_ms: 5_000,
            factor: 2,
            jitter_percent: 20,
        }
    }
}

impl BackoffConfig {
    /// Base delay (without jitter) before retry number `retry` (1-based).
    #[must_use]
    pub fn base_delay_ms(&self, retry: u32) -> u64 {
        let factor = u64::from(self.factor.max(1));
        let mut delay = self.min_backoff_ms;
        for _ in 1..retry {
            delay = delay.saturating_mul(factor);
            if delay >= self.max_backoff_ms {
                return self.max_backoff_ms;
            }
        }
        delay.min(self.max_backoff_ms)
    }
}

/// Global configuration for the `Candela` history engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandelaConfig {
    /// Upstream limit on bars returned by a single call.
    pub max_bars_per_call: u32,
    /// Maximum number of upstream calls in flight across all requests.
    pub max_concurrent_fetches: usize,
    /// Interval of the wholesale cache reset.
    pub cache_reset_interval: Duration,
    /// Seconds subtracted from `to` for the `nextTime` hint of a `no_data` response.
    pub no_data_lookback_secs: i64,
}

impl Default for CandelaConfig {
    fn default() -> Self {
        Self {
            max_bars_per_call: 5000,
            max_concurrent_fetches: 100,
            cache_reset_interval: Duration::from_secs(24 * 60 * 60),
            no_data_lookback_secs: 24 * 60 * 60,
        }
    }
}

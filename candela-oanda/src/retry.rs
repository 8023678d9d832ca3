use std::future::Future;
use std::time::Duration;

use candela_core::{BackoffConfig, CandelaError};
use rand::Rng;

/// `base_ms` plus up to `jitter_percent` percent of random extra delay.
pub(crate) fn jitter_wait(base_ms: u64, jitter_percent: u8) -> u64 {
    let jitter_range = if jitter_percent == 0 {
        1
    } else {
        std::cmp::max(1, (base_ms.saturating_mul(u64::from(jitter_percent))) / 100)
    };
    let mut rng = rand::rng();
    base_ms + rng.random_range(0..jitter_range)
}

/// Run `op` until it succeeds, fails with a non-transport error, or runs out of retries.
///
/// Only `CandelaError::Transport` is retried. The final transport error reports
/// the total number of attempts.
pub(crate) async fn with_retry<T, F, Fut>(
    backoff: &BackoffConfig,
    what: &str,
    op: F,
) -> Result<T, CandelaError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, CandelaError>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(v) => return Ok(v),
            Err(CandelaError::Transport { msg, .. }) => {
                if attempt > backoff.max_retries {
                    return Err(CandelaError::transport(msg, attempt));
                }
                let delay = jitter_wait(backoff.base_delay_ms(attempt), backoff.jitter_percent);
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    what,
                    attempt,
                    delay_ms = delay,
                    error = %msg,
                    "transport failure; retrying"
                );
                #[cfg(not(feature = "tracing"))]
                let _ = (what, msg);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

//! Shared setup for the demo binaries.

use std::sync::Arc;

use candela::CandleProvider;

/// OANDA from the environment, or the synthetic upstream when
/// `CANDELA_DEMOS_USE_MOCK` is set.
///
/// # Errors
/// Fails when `OANDA_API_KEY` is missing and the mock was not requested.
pub fn get_provider() -> Result<Arc<dyn CandleProvider>, candela::CandelaError> {
    if std::env::var("CANDELA_DEMOS_USE_MOCK").is_ok() {
        println!("--- (Using mock upstream) ---");
        Ok(Arc::new(candela_mock::MockConnector::new()))
    } else {
        Ok(Arc::new(candela_oanda::OandaConnector::from_env()?))
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

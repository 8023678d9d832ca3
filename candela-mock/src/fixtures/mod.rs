/// Synthetic OHLCV generation.
pub mod history;

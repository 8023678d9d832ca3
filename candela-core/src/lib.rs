//! candela-core
//!
//! Core types, traits, and utilities shared across the candela workspace.
//!
//! - `series`: the column-oriented `CandleSeries` and its `Candle` row view.
//! - `range`: `QueryRange`, `SeriesKey`, and `RequestContext`.
//! - `calendar`: forex weekly-closure heuristics used to plan upstream calls.
//! - `connector`: the `CandleProvider` and `SymbolProvider` traits.
//! - `timeseries`: pure merge and slice functions over candle series.
//! - `udf`: the history answer and its UDF JSON shape.
//!
//! Async runtime (Tokio)
//! ---------------------
//! `task::TaskHandle` wraps `tokio::task::JoinHandle<()>` and uses
//! `tokio::sync::oneshot::Sender<()>` for cooperative shutdown, so code that
//! spawns background maintenance must run under a Tokio 1.x runtime.
//!
#![warn(missing_docs)]

/// Weekly market closure helpers.
pub mod calendar;
/// Provider traits and their request/answer types.
pub mod connector;
/// Time windows and cache keys.
pub mod range;
/// Candle series data structure.
pub mod series;
/// Background task handle used by the cache reset timer.
pub mod task;
/// Time-series utilities for merging and slicing.
pub mod timeseries;
pub mod udf;

pub use candela_types::{
    BackoffConfig, CandelaConfig, CandelaError, HistoryStatus, Resolution,
};
pub use connector::{
    CandleProvider, CandleRequest, SymbolInfo, SymbolProvider, SymbolQuery, SymbolSearchResult,
};
pub use range::{QueryRange, RequestContext, SeriesKey};
pub use rust_decimal::Decimal;
pub use series::{Candle, CandleSeries};
pub use task::TaskHandle;
pub use timeseries::merge::{MergeStats, append_series, concat_chunks, prepend_series};
pub use timeseries::slice::slice_window;
pub use udf::HistoryResponse;

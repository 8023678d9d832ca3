//! Candela serves UDF historical bars from a process-local candle cache.
//!
//! Overview
//! - Each history request is planned against what is cached for its
//!   (symbol, resolution): nothing cached fetches the whole window, a wide
//!   head gap is prepended, otherwise a missing tail is appended.
//! - Planned ranges are split into upstream-sized calls that run concurrently
//!   under one shared limiter and are reassembled in time order.
//! - Fetched bars are merged into the cache and the requested window is
//!   sliced out of it, so repeated requests cost no upstream calls.
//! - The cache is dropped wholesale on a fixed interval (daily by default).
//!
//! Key behaviors and trade-offs
//! - One gap per request: a window missing both head and tail gets the head
//!   now and the tail on the next request.
//! - Requests for one key are serialized; different keys run in parallel.
//! - Upstream failures answer `status: error` and leave the cache untouched.
//! - Weekend windows inside the forex weekly closure never reach the upstream.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use candela::{Candela, Resolution, SymbolDatabase};
//!
//! let candela = Candela::builder()
//!     .with_provider(Arc::new(candela_oanda::OandaConnector::from_env()?))
//!     .with_symbols(Arc::new(SymbolDatabase::with_defaults()))
//!     .build()?;
//! let _reset = candela.spawn_reset_timer();
//!
//! let resp = candela.history("EUR_USD", Resolution::H1, from, to).await;
//! println!("{}", serde_json::to_string(&resp)?);
//! ```
#![warn(missing_docs)]

pub(crate) mod core;
pub mod engine;
/// Splitting planned ranges into upstream-sized concurrent calls.
pub mod paginate;
/// Deciding what a history request must fetch.
pub mod planner;
pub mod store;
/// In-memory symbol catalog.
pub mod symbols;
pub mod udf;

pub use candela_core::{
    BackoffConfig, CandelaConfig, CandelaError, Candle, CandleProvider, CandleRequest,
    CandleSeries, Decimal, HistoryResponse, HistoryStatus, QueryRange, RequestContext,
    Resolution, SeriesKey, SymbolInfo, SymbolProvider, SymbolQuery, SymbolSearchResult,
    TaskHandle,
};
pub use core::{Candela, CandelaBuilder};
pub use engine::{Clock, HistoryStage};
pub use paginate::{FetchOutcome, PaginatingFetcher, chunk_ranges};
pub use planner::{FetchPlan, plan};
pub use store::{CacheStore, EntryGuard};
pub use symbols::{DEFAULT_SEARCH_LIMIT, SymbolDatabase};

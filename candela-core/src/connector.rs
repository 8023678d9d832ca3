use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{CandelaError, CandleSeries, QueryRange, Resolution};

/// One upstream candle query: a single bounded call, never paginated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleRequest {
    /// Upstream instrument name.
    pub symbol: String,
    /// Bar period.
    pub resolution: Resolution,
    /// Time window of the call.
    pub range: QueryRange,
    /// Ask the upstream to return the candle starting exactly at `range.from()`.
    pub include_first: bool,
}

/// Focused role trait for upstreams that serve OHLCV candles.
///
/// Implementations return candles in ascending time order with
/// `from < time <= to`, or `from <= time <= to` when `include_first` is set.
/// Pagination, caching and merging are the caller's job.
#[async_trait]
pub trait CandleProvider: Send + Sync {
    /// Stable connector name for logs.
    fn name(&self) -> &'static str;

    /// Fetch candles for exactly one request.
    async fn fetch_candles(&self, req: &CandleRequest) -> Result<CandleSeries, CandelaError>;
}

/// Static description of a tradable symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// Upstream instrument name, e.g. `EUR_USD`.
    pub name: String,
    /// Human readable description.
    pub description: String,
    /// Exchange (or broker) label.
    pub exchange: String,
    /// Instrument type, e.g. `forex` or `stock`.
    #[serde(rename = "type")]
    pub symbol_type: String,
}

/// Search filter passed to [`SymbolProvider::search`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolQuery {
    /// Free text matched against name and description; empty matches all.
    pub text: String,
    /// Restrict to one instrument type.
    pub symbol_type: Option<String>,
    /// Restrict to one exchange.
    pub exchange: Option<String>,
    /// Maximum number of results; `None` uses the provider default.
    pub limit: Option<usize>,
}

/// One row of a symbol search answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSearchResult {
    /// Short symbol.
    pub symbol: String,
    /// Fully qualified name.
    pub full_name: String,
    /// Description.
    pub description: String,
    /// Exchange label.
    pub exchange: String,
    /// Instrument type.
    #[serde(rename = "type")]
    pub symbol_type: String,
}

impl From<&SymbolInfo> for SymbolSearchResult {
    fn from(info: &SymbolInfo) -> Self {
        Self {
            symbol: info.name.clone(),
            full_name: info.name.clone(),
            description: info.description.clone(),
            exchange: info.exchange.clone(),
            symbol_type: info.symbol_type.clone(),
        }
    }
}

/// Focused role trait for symbol metadata lookup and search.
#[async_trait]
pub trait SymbolProvider: Send + Sync {
    /// Resolve `"EXCHANGE:NAME"` or `"NAME"` to its metadata.
    async fn lookup(&self, name: &str) -> Result<SymbolInfo, CandelaError>;

    /// Search symbols by free text and filters.
    async fn search(&self, query: &SymbolQuery) -> Result<Vec<SymbolSearchResult>, CandelaError>;
}

//! UDF datafeed payloads besides history: `/config`, `/symbols`, `/time`, `/quotes`.

use candela_core::{
    CandelaError, Decimal, HistoryStatus, Resolution, SeriesKey, SymbolProvider,
};
use serde::Serialize;

use crate::Candela;

/// Price scale advertised for every symbol (five decimals).
pub const PRICE_SCALE: u32 = 100_000;
/// Around-the-clock session string.
pub const SESSION_24H: &str = "1;0000-2400|0000-2400:1";
/// Time zone of every bar.
pub const TIMEZONE: &str = "Etc/UTC";

/// Exchange entry of the datafeed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExchangeDescriptor {
    /// Filter value sent back by the client; empty matches every exchange.
    pub value: String,
    /// Label shown in the exchange picker.
    pub name: String,
    /// Longer description.
    pub desc: String,
}

/// Symbol type entry of the datafeed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolTypeDescriptor {
    /// Label shown in the type picker.
    pub name: String,
    /// Filter value; empty matches every type.
    pub value: String,
}

/// Answer to `/config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatafeedConfig {
    /// Symbol search is available.
    pub supports_search: bool,
    /// Group symbol requests (unsupported).
    pub supports_group_request: bool,
    /// Bar marks (unsupported).
    pub supports_marks: bool,
    /// Timescale marks (unsupported).
    pub supports_timescale_marks: bool,
    /// `/time` is served.
    pub supports_time: bool,
    /// Intraday resolutions are served.
    pub has_intraday: bool,
    /// Daily bars are served.
    pub has_daily: bool,
    /// Exchange filter entries.
    pub exchanges: Vec<ExchangeDescriptor>,
    /// Symbol type filter entries.
    pub symbols_types: Vec<SymbolTypeDescriptor>,
    /// Every resolution the engine serves.
    pub supported_resolutions: Vec<Resolution>,
}

impl Default for DatafeedConfig {
    fn default() -> Self {
        Self {
            supports_search: true,
            supports_group_request: false,
            supports_marks: false,
            supports_timescale_marks: false,
            supports_time: true,
            has_intraday: true,
            has_daily: true,
            exchanges: vec![ExchangeDescriptor {
                value: String::new(),
                name: "All Exchanges".into(),
                desc: String::new(),
            }],
            symbols_types: vec![
                SymbolTypeDescriptor {
                    name: "All types".into(),
                    value: String::new(),
                },
                SymbolTypeDescriptor {
                    name: "Forex".into(),
                    value: "forex".into(),
                },
            ],
            supported_resolutions: Resolution::ALL.to_vec(),
        }
    }
}

/// Answer to `/symbols`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UdfSymbolInfo {
    /// Canonical symbol name.
    pub name: String,
    /// Exchange the symbol trades on.
    #[serde(rename = "exchange-traded")]
    pub exchange_traded: String,
    /// Exchange the symbol is listed on; same as traded.
    #[serde(rename = "exchange-listed")]
    pub exchange_listed: String,
    /// Always [`TIMEZONE`].
    pub timezone: String,
    /// Price scale numerator.
    pub minmov: u32,
    /// Zero: no fractional price format.
    pub minmov2: u32,
    /// Currency value of one point.
    pub pointvalue: u32,
    /// Always [`SESSION_24H`].
    pub session: String,
    /// Always true.
    pub has_intraday: bool,
    /// True for everything but stocks.
    pub has_no_volume: bool,
    /// Catalog description, or the name when it has none.
    pub description: String,
    /// Catalog type such as `forex`.
    #[serde(rename = "type")]
    pub symbol_type: String,
    /// Every resolution the engine serves.
    pub supported_resolutions: Vec<Resolution>,
    /// Always [`PRICE_SCALE`].
    pub pricescale: u32,
    /// Upper-cased name used as the chart ticker.
    pub ticker: String,
}

/// Resolve `name` through `provider` and describe it for a UDF client.
///
/// # Errors
/// Propagates the provider's `NotFound` for unknown symbols.
pub async fn symbol_info(
    provider: &dyn SymbolProvider,
    name: &str,
) -> Result<UdfSymbolInfo, CandelaError> {
    let info = provider.lookup(name).await?;
    let description = if info.description.is_empty() {
        info.name.clone()
    } else {
        info.description
    };
    Ok(UdfSymbolInfo {
        ticker: info.name.to_uppercase(),
        exchange_traded: info.exchange.clone(),
        exchange_listed: info.exchange,
        timezone: TIMEZONE.into(),
        minmov: 1,
        minmov2: 0,
        pointvalue: 1,
        session: SESSION_24H.into(),
        has_intraday: true,
        has_no_volume: info.symbol_type != "stock",
        description,
        symbol_type: info.symbol_type,
        supported_resolutions: Resolution::ALL.to_vec(),
        pricescale: PRICE_SCALE,
        name: info.name,
    })
}

/// Answer to `/time`: current server time in seconds.
#[must_use]
pub fn server_time() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Answer to `/quotes`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotesResponse {
    /// Overall status; per-symbol failures sit in `d`.
    pub s: HistoryStatus,
    /// One entry per requested ticker, in request order.
    pub d: Vec<QuoteEntry>,
}

/// One symbol of a quotes answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteEntry {
    /// `ok`, or `error` when nothing is cached for the symbol.
    pub s: HistoryStatus,
    /// The ticker as requested.
    pub n: String,
    /// Quote values when bars are cached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<QuoteValues>,
    /// Why `v` is missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errmsg: Option<String>,
}

/// Quote fields derived from the last two cached bars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteValues {
    /// Change from the previous close.
    pub ch: Decimal,
    /// Change in percent, four decimals.
    pub chp: Decimal,
    /// Ticker without its exchange prefix.
    pub short_name: String,
    /// Exchange prefix, empty when absent.
    pub exchange: String,
    /// Ticker as requested.
    pub original_name: String,
    /// Ticker as requested.
    pub description: String,
    /// Last price: close of the last bar.
    pub lp: Decimal,
    /// Same as `lp`; the cache holds mid prices only.
    pub ask: Decimal,
    /// Same as `lp`.
    pub bid: Decimal,
    /// Open of the last bar.
    pub open_price: Decimal,
    /// High of the last bar.
    pub high_price: Decimal,
    /// Low of the last bar.
    pub low_price: Decimal,
    /// Close of the bar before the last one, or the last open.
    pub prev_close_price: Decimal,
    /// Volume of the last bar.
    pub volume: u64,
}

impl Candela {
    /// Quotes for comma-separated `tickers`, served from the cache only.
    ///
    /// Tickers may carry an `EXCHANGE:` prefix. A ticker with nothing cached at
    /// `resolution` gets `s: "error"`; no upstream call is made.
    pub async fn quotes(&self, tickers: &str, resolution: Resolution) -> QuotesResponse {
        let mut d = Vec::new();
        for ticker in tickers.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (exchange, symbol) = ticker.split_once(':').unwrap_or(("", ticker));
            let series = self
                .store()
                .peek(&SeriesKey::new(symbol, resolution))
                .await
                .unwrap_or_default();
            let n = series.len();
            let entry = match series.last() {
                Some(last) => {
                    let prev_close = n
                        .checked_sub(2)
                        .and_then(|i| series.get(i))
                        .map_or(last.open, |c| c.close);
                    let ch = last.close - prev_close;
                    let chp = ch
                        .checked_div(prev_close)
                        .map_or(Decimal::ZERO, |r| (r * Decimal::ONE_HUNDRED).round_dp(4));
                    QuoteEntry {
                        s: HistoryStatus::Ok,
                        n: ticker.to_string(),
                        v: Some(QuoteValues {
                            ch,
                            chp,
                            short_name: symbol.to_string(),
                            exchange: exchange.to_string(),
                            original_name: ticker.to_string(),
                            description: ticker.to_string(),
                            lp: last.close,
                            ask: last.close,
                            bid: last.close,
                            open_price: last.open,
                            high_price: last.high,
                            low_price: last.low,
                            prev_close_price: prev_close,
                            volume: last.volume,
                        }),
                        errmsg: None,
                    }
                }
                None => QuoteEntry {
                    s: HistoryStatus::Error,
                    n: ticker.to_string(),
                    v: None,
                    errmsg: Some(format!("no cached bars for {symbol}")),
                },
            };
            d.push(entry);
        }
        QuotesResponse {
            s: HistoryStatus::Ok,
            d,
        }
    }
}

//! OANDA v3 candle endpoint: URL construction and payload decoding.

use candela_core::{Candle, CandelaError, CandleRequest, CandleSeries};
use chrono::{DateTime, SecondsFormat};
use rust_decimal::Decimal;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
struct CandlesBody {
    #[serde(default)]
    candles: Vec<WireCandle>,
}

#[derive(Debug, Deserialize)]
struct WireCandle {
    time: String,
    #[serde(default)]
    volume: Option<u64>,
    mid: Option<WireOhlc>,
}

#[derive(Debug, Deserialize)]
struct WireOhlc {
    #[serde(with = "rust_decimal::serde::str")]
    o: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    h: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    l: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    c: Decimal,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "errorMessage")]
    error_message: Option<String>,
}

fn rfc3339(t: i64) -> Result<String, CandelaError> {
    DateTime::from_timestamp(t, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .ok_or_else(|| CandelaError::InvalidArg(format!("timestamp {t} out of range")))
}

/// `{base}/v3/instruments/{symbol}/candles?...` for one request.
pub(crate) fn candles_url(base: &Url, req: &CandleRequest) -> Result<Url, CandelaError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| CandelaError::InvalidArg(format!("api url cannot be a base: {base}")))?
        .pop_if_empty()
        .extend(["v3", "instruments", req.symbol.as_str(), "candles"]);
    url.query_pairs_mut()
        .append_pair("from", &rfc3339(req.range.from())?)
        .append_pair("to", &rfc3339(req.range.to())?)
        .append_pair("smooth", "True")
        .append_pair("granularity", req.resolution.granularity())
        .append_pair("includeFirst", if req.include_first { "True" } else { "False" })
        .append_pair("price", "M");
    Ok(url)
}

/// Decode a candles payload into a series (mid prices, missing volume as 0).
pub(crate) fn parse_candles(body: &str) -> Result<CandleSeries, CandelaError> {
    let parsed: CandlesBody =
        serde_json::from_str(body).map_err(|e| CandelaError::UpstreamParse(e.to_string()))?;
    let mut rows = Vec::with_capacity(parsed.candles.len());
    for wc in parsed.candles {
        let time = DateTime::parse_from_rfc3339(&wc.time)
            .map_err(|e| CandelaError::UpstreamParse(format!("candle time {:?}: {e}", wc.time)))?
            .timestamp();
        let mid = wc
            .mid
            .ok_or_else(|| CandelaError::UpstreamParse(format!("candle at {time} has no mid prices")))?;
        rows.push(Candle {
            time,
            open: mid.o,
            high: mid.h,
            low: mid.l,
            close: mid.c,
            volume: wc.volume.unwrap_or(0),
        });
    }
    Ok(CandleSeries::from_unsorted(rows))
}

/// `errorMessage` of an error payload, if the body is one.
pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error_message)
}

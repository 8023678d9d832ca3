//! History answer and its UDF wire shape.
//!
//! A UDF history payload is column oriented:
//! `{"s":"ok","t":[..],"o":[..],"h":[..],"l":[..],"c":[..],"v":[..]}`;
//! `no_data` carries `nextTime`, `error` carries `errmsg`.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::{CandleSeries, HistoryStatus};

/// Answer to one history request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryResponse {
    /// Outcome flag.
    pub status: HistoryStatus,
    /// Bars of the requested window; empty unless `status` is `Ok`.
    pub series: CandleSeries,
    /// Hint for the client to look further back (`no_data` only).
    pub next_time: Option<i64>,
    /// Error description (`error` only).
    pub errmsg: Option<String>,
}

impl HistoryResponse {
    /// Successful answer.
    #[must_use]
    pub const fn ok(series: CandleSeries) -> Self {
        Self {
            status: HistoryStatus::Ok,
            series,
            next_time: None,
            errmsg: None,
        }
    }

    /// No bars in the window.
    #[must_use]
    pub const fn no_data(next_time: Option<i64>) -> Self {
        Self {
            status: HistoryStatus::NoData,
            series: CandleSeries::new(),
            next_time,
            errmsg: None,
        }
    }

    /// Failed request.
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            status: HistoryStatus::Error,
            series: CandleSeries::new(),
            next_time: None,
            errmsg: Some(msg.into()),
        }
    }

    /// True for `status: ok`.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self.status, HistoryStatus::Ok)
    }
}

#[derive(Serialize)]
struct UdfHistory<'a> {
    s: HistoryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    t: Option<&'a [i64]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    o: Option<&'a [Decimal]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    h: Option<&'a [Decimal]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    l: Option<&'a [Decimal]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    c: Option<&'a [Decimal]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    v: Option<&'a [u64]>,
    #[serde(rename = "nextTime", skip_serializing_if = "Option::is_none")]
    next_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errmsg: Option<&'a str>,
}

impl Serialize for HistoryResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns = self.is_ok().then_some(&self.series);
        UdfHistory {
            s: self.status,
            t: columns.map(CandleSeries::times),
            o: columns.map(CandleSeries::opens),
            h: columns.map(CandleSeries::highs),
            l: columns.map(CandleSeries::lows),
            c: columns.map(CandleSeries::closes),
            v: columns.map(CandleSeries::volumes),
            next_time: self.next_time,
            errmsg: self.errmsg.as_deref(),
        }
        .serialize(serializer)
    }
}

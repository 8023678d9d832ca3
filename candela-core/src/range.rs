use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{CandelaError, Resolution};

/// Half-open time window `[from, to)` in seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct QueryRange {
    from: i64,
    to: i64,
}

impl QueryRange {
    /// Build a non-empty range.
    ///
    /// # Errors
    /// Returns `CandelaError::EmptyRange` when `from >= to`.
    pub const fn new(from: i64, to: i64) -> Result<Self, CandelaError> {
        if from >= to {
            return Err(CandelaError::EmptyRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// Inclusive start.
    #[must_use]
    pub const fn from(&self) -> i64 {
        self.from
    }

    /// Exclusive end.
    #[must_use]
    pub const fn to(&self) -> i64 {
        self.to
    }

    /// Length in seconds (always positive).
    #[must_use]
    pub const fn duration(&self) -> i64 {
        self.to.saturating_sub(self.from)
    }

    /// Number of `resolution` bars the range can hold, rounded up.
    #[must_use]
    pub const fn bars(&self, resolution: Resolution) -> i64 {
        let period = resolution.period_secs();
        self.duration().saturating_add(period - 1) / period
    }

    /// The same range with its end lowered to `now`, or `None` when nothing is left.
    #[must_use]
    pub fn clamp_end(self, now: i64) -> Option<Self> {
        Self::new(self.from, self.to.min(now)).ok()
    }
}

impl fmt::Display for QueryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from, self.to)
    }
}

/// Cache key: one series per (symbol, resolution).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesKey {
    /// Upstream instrument name, e.g. `EUR_USD`.
    pub symbol: String,
    /// Bar period.
    pub resolution: Resolution,
}

impl SeriesKey {
    /// Build a key.
    pub fn new(symbol: impl Into<String>, resolution: Resolution) -> Self {
        Self {
            symbol: symbol.into(),
            resolution,
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.symbol, self.resolution)
    }
}

/// Immutable parameters of one history request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Upstream instrument name.
    pub symbol: String,
    /// Bar period.
    pub resolution: Resolution,
    /// Requested window start (seconds).
    pub from: i64,
    /// Requested window end (seconds).
    pub to: i64,
}

impl RequestContext {
    /// Build a request context.
    pub fn new(symbol: impl Into<String>, resolution: Resolution, from: i64, to: i64) -> Self {
        Self {
            symbol: symbol.into(),
            resolution,
            from,
            to,
        }
    }

    /// Cache key addressed by this request.
    #[must_use]
    pub fn key(&self) -> SeriesKey {
        SeriesKey::new(self.symbol.clone(), self.resolution)
    }

    /// The requested window as a validated range.
    ///
    /// # Errors
    /// Returns `CandelaError::EmptyRange` when `from >= to`.
    pub const fn range(&self) -> Result<QueryRange, CandelaError> {
        QueryRange::new(self.from, self.to)
    }
}

//! Column-oriented OHLCV series.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CandelaError;

/// One bar of a [`CandleSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candle {
    /// Bar start, seconds since the Unix epoch.
    pub time: i64,
    /// Opening price.
    pub open: Decimal,
    /// Highest price.
    pub high: Decimal,
    /// Lowest price.
    pub low: Decimal,
    /// Closing price.
    pub close: Decimal,
    /// Traded volume (tick count for OANDA); `0` when the upstream omits it.
    pub volume: u64,
}

/// Six parallel columns of equal length with strictly increasing, unique `time`.
///
/// Columns are private so the ordering invariant cannot be broken from the
/// outside. Builders that accept arbitrary input either validate it
/// ([`CandleSeries::from_candles`], [`CandleSeries::push`]) or normalize it
/// ([`CandleSeries::from_unsorted`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CandleSeries {
    time: Vec<i64>,
    open: Vec<Decimal>,
    high: Vec<Decimal>,
    low: Vec<Decimal>,
    close: Vec<Decimal>,
    volume: Vec<u64>,
}

impl CandleSeries {
    /// An empty series.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            time: Vec::new(),
            open: Vec::new(),
            high: Vec::new(),
            low: Vec::new(),
            close: Vec::new(),
            volume: Vec::new(),
        }
    }

    /// An empty series with room for `n` bars.
    #[must_use]
    pub fn with_capacity(n: usize) -> Self {
        Self {
            time: Vec::with_capacity(n),
            open: Vec::with_capacity(n),
            high: Vec::with_capacity(n),
            low: Vec::with_capacity(n),
            close: Vec::with_capacity(n),
            volume: Vec::with_capacity(n),
        }
    }

    /// Build a series from candles already in strictly ascending time order.
    ///
    /// # Errors
    /// Returns `CandelaError::Data` on the first out-of-order or duplicate timestamp.
    pub fn from_candles<I>(candles: I) -> Result<Self, CandelaError>
    where
        I: IntoIterator<Item = Candle>,
    {
        let iter = candles.into_iter();
        let mut out = Self::with_capacity(iter.size_hint().0);
        for c in iter {
            out.push(c)?;
        }
        Ok(out)
    }

    /// Build a series from candles in any order; the last candle wins on a duplicate timestamp.
    #[must_use]
    pub fn from_unsorted<I>(candles: I) -> Self
    where
        I: IntoIterator<Item = Candle>,
    {
        let mut rows: Vec<Candle> = candles.into_iter().collect();
        // stable sort keeps input order among equal timestamps
        rows.sort_by_key(|c| c.time);
        let mut out = Self::with_capacity(rows.len());
        for c in rows {
            if out.last_time() == Some(c.time) {
                out.pop();
            }
            out.push_unchecked(c);
        }
        out
    }

    /// Append one candle at the end.
    ///
    /// # Errors
    /// Returns `CandelaError::Data` if `candle.time` is not greater than the last timestamp.
    pub fn push(&mut self, candle: Candle) -> Result<(), CandelaError> {
        if let Some(last) = self.last_time()
            && candle.time <= last
        {
            return Err(CandelaError::Data(format!(
                "candle at {} does not follow last timestamp {last}",
                candle.time
            )));
        }
        self.push_unchecked(candle);
        Ok(())
    }

    fn push_unchecked(&mut self, c: Candle) {
        self.time.push(c.time);
        self.open.push(c.open);
        self.high.push(c.high);
        self.low.push(c.low);
        self.close.push(c.close);
        self.volume.push(c.volume);
    }

    fn pop(&mut self) {
        self.time.pop();
        self.open.pop();
        self.high.pop();
        self.low.pop();
        self.close.pop();
        self.volume.pop();
    }

    /// Number of bars.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.time.len()
    }

    /// True when the series holds no bars.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Timestamp of the first bar.
    #[must_use]
    pub fn first_time(&self) -> Option<i64> {
        self.time.first().copied()
    }

    /// Timestamp of the last bar.
    #[must_use]
    pub fn last_time(&self) -> Option<i64> {
        self.time.last().copied()
    }

    /// Bar at index `i`.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<Candle> {
        (i < self.len()).then(|| self.row(i))
    }

    fn row(&self, i: usize) -> Candle {
        Candle {
            time: self.time[i],
            open: self.open[i],
            high: self.high[i],
            low: self.low[i],
            close: self.close[i],
            volume: self.volume[i],
        }
    }

    /// Last bar, if any.
    #[must_use]
    pub fn last(&self) -> Option<Candle> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Iterate bars in time order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Candle> + ExactSizeIterator + '_ {
        (0..self.len()).map(move |i| self.row(i))
    }

    /// Timestamps column.
    #[must_use]
    pub fn times(&self) -> &[i64] {
        &self.time
    }

    /// Open prices column.
    #[must_use]
    pub fn opens(&self) -> &[Decimal] {
        &self.open
    }

    /// High prices column.
    #[must_use]
    pub fn highs(&self) -> &[Decimal] {
        &self.high
    }

    /// Low prices column.
    #[must_use]
    pub fn lows(&self) -> &[Decimal] {
        &self.low
    }

    /// Close prices column.
    #[must_use]
    pub fn closes(&self) -> &[Decimal] {
        &self.close
    }

    /// Volume column.
    #[must_use]
    pub fn volumes(&self) -> &[u64] {
        &self.volume
    }

    /// Index of the first bar with `time >= t`.
    #[must_use]
    pub fn lower_bound(&self, t: i64) -> usize {
        self.time.partition_point(|&x| x < t)
    }

    /// Drop every bar with `time >= t`; returns how many were removed.
    pub fn truncate_from(&mut self, t: i64) -> usize {
        let keep = self.lower_bound(t);
        let removed = self.len() - keep;
        self.time.truncate(keep);
        self.open.truncate(keep);
        self.high.truncate(keep);
        self.low.truncate(keep);
        self.close.truncate(keep);
        self.volume.truncate(keep);
        removed
    }

    /// Copy of the rows in `[start, end)` by index.
    #[must_use]
    pub fn range_by_index(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.len());
        let start = start.min(end);
        Self {
            time: self.time[start..end].to_vec(),
            open: self.open[start..end].to_vec(),
            high: self.high[start..end].to_vec(),
            low: self.low[start..end].to_vec(),
            close: self.close[start..end].to_vec(),
            volume: self.volume[start..end].to_vec(),
        }
    }

    /// Move all bars of `other` onto the end of `self`.
    ///
    /// # Errors
    /// Returns `CandelaError::Data` if `other` does not start strictly after `self` ends;
    /// `self` is left unchanged in that case.
    pub fn extend(&mut self, other: Self) -> Result<(), CandelaError> {
        if let (Some(last), Some(first)) = (self.last_time(), other.first_time())
            && first <= last
        {
            return Err(CandelaError::Data(format!(
                "series starting at {first} overlaps series ending at {last}"
            )));
        }
        self.time.extend(other.time);
        self.open.extend(other.open);
        self.high.extend(other.high);
        self.low.extend(other.low);
        self.close.extend(other.close);
        self.volume.extend(other.volume);
        Ok(())
    }
}

impl FromIterator<Candle> for CandleSeries {
    fn from_iter<T: IntoIterator<Item = Candle>>(iter: T) -> Self {
        Self::from_unsorted(iter)
    }
}

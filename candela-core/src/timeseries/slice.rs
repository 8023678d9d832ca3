use crate::CandleSeries;

/// Bars with `from <= time <= to`.
///
/// A bar starting exactly at `to` is kept; everything after it is not.
#[must_use]
pub fn slice_window(series: &CandleSeries, from: i64, to: i64) -> CandleSeries {
    if from > to {
        return CandleSeries::new();
    }
    let start = series.lower_bound(from);
    let end = series.times().partition_point(|&t| t <= to);
    series.range_by_index(start, end)
}

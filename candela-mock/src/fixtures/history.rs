use candela_core::calendar::is_weekly_closure;
use candela_core::{Candle, CandleRequest, CandleSeries, Decimal, Resolution};

/// Daily bars open at the New York close.
const DAILY_ANCHOR: i64 = 21 * 3600;

/// First bar start `>= t` on the grid of `resolution`.
#[must_use]
pub fn align_up(t: i64, resolution: Resolution) -> i64 {
    let period = resolution.period_secs();
    let anchor = if resolution.is_intraday() { 0 } else { DAILY_ANCHOR };
    let offset = (t - anchor).rem_euclid(period);
    if offset == 0 { t } else { t + (period - offset) }
}

/// Bar starts the synthetic upstream reports for `req`.
///
/// Bars lie on the resolution grid, skip the weekly closure, and follow the
/// upstream contract: `from < t <= to`, or `from <= t <= to` with include-first.
#[must_use]
pub fn bar_times(req: &CandleRequest) -> Vec<i64> {
    let period = req.resolution.period_secs();
    let (from, to) = (req.range.from(), req.range.to());
    let mut t = align_up(from, req.resolution);
    if t == from && !req.include_first {
        t += period;
    }
    let mut out = Vec::new();
    while t <= to {
        if !is_weekly_closure(t) {
            out.push(t);
        }
        t += period;
    }
    out
}

/// Deterministic OHLCV for one bar of `symbol`.
#[must_use]
pub fn synthetic_candle(symbol: &str, resolution: Resolution, time: i64) -> Candle {
    let seed = symbol.bytes().fold(0i64, |acc, b| acc.wrapping_mul(31).wrapping_add(i64::from(b)));
    let step = time.div_euclid(resolution.period_secs());
    let base = 100_000 + (seed.rem_euclid(20_000)) + (step.wrapping_mul(7919)).rem_euclid(1_000);
    let open = Decimal::new(base, 5);
    let close = Decimal::new(base + step.rem_euclid(7) - 3, 5);
    Candle {
        time,
        open,
        high: open.max(close) + Decimal::new(5, 5),
        low: open.min(close) - Decimal::new(5, 5),
        close,
        volume: u64::try_from(step.rem_euclid(500)).unwrap_or(0) + 1,
    }
}

/// The full synthetic answer to `req`.
#[must_use]
pub fn synthetic_series(req: &CandleRequest) -> CandleSeries {
    bar_times(req)
        .into_iter()
        .map(|t| synthetic_candle(&req.symbol, req.resolution, t))
        .collect()
}

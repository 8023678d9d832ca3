//! Forex weekly-closure heuristics.
//!
//! The market is treated as closed from Friday 21:00 UTC until Sunday 21:00
//! UTC. Holidays and daylight-saving shifts of the New York close are not
//! modeled.

use chrono::{DateTime, Datelike, Timelike, Weekday};

const CLOSE_SECS: u32 = 21 * 3600;
/// The upstream includes the first candle for starts after 20:59 on Friday.
const FRIDAY_INCLUDE_AFTER_SECS: u32 = 20 * 3600 + 59 * 60;
const DAY: i64 = 24 * 60 * 60;

fn weekday_and_secs(t: i64) -> Option<(Weekday, u32)> {
    let dt = DateTime::from_timestamp(t, 0)?;
    Some((dt.weekday(), dt.num_seconds_from_midnight()))
}

/// True if `t` falls on a Saturday (UTC).
#[must_use]
pub fn is_saturday(t: i64) -> bool {
    matches!(weekday_and_secs(t), Some((Weekday::Sat, _)))
}

/// True if `t` lies inside the weekly closure `[Fri 21:00, Sun 21:00)` UTC.
#[must_use]
pub fn is_weekly_closure(t: i64) -> bool {
    match weekday_and_secs(t) {
        Some((Weekday::Fri, s)) => s >= CLOSE_SECS,
        Some((Weekday::Sat, _)) => true,
        Some((Weekday::Sun, s)) => s < CLOSE_SECS,
        _ => false,
    }
}

/// End (Sunday 21:00 UTC) of the closure containing `t`, if `t` is inside one.
#[must_use]
pub fn closure_end(t: i64) -> Option<i64> {
    let (day, secs) = weekday_and_secs(t)?;
    if !is_weekly_closure(t) {
        return None;
    }
    let midnight = t - i64::from(secs);
    let days_to_sunday = match day {
        Weekday::Fri => 2,
        Weekday::Sat => 1,
        _ => 0,
    };
    Some(midnight + days_to_sunday * DAY + i64::from(CLOSE_SECS))
}

/// True when the whole window `[from, to)` lies inside a single weekly closure.
#[must_use]
pub fn range_within_closure(from: i64, to: i64) -> bool {
    closure_end(from).is_some_and(|end| to <= end)
}

/// Whether an upstream query starting at `start` must ask for the candle at `start`.
///
/// Starts on Friday after 20:59, any time Saturday, or Sunday up to 21:00 UTC
/// include it; every other start excludes it.
#[must_use]
pub fn include_first_candle(start: i64) -> bool {
    match weekday_and_secs(start) {
        Some((Weekday::Fri, s)) => s > FRIDAY_INCLUDE_AFTER_SECS,
        Some((Weekday::Sat, _)) => true,
        Some((Weekday::Sun, s)) => s <= CLOSE_SECS,
        _ => false,
    }
}

use core::fmt;

use candela_core::calendar::{is_saturday, range_within_closure};
use candela_core::{CandleSeries, QueryRange, RequestContext};

/// What the orchestrator must fetch to answer one history request.
///
/// At most one gap is resolved per request: the left gap wins, and a later
/// request resolves the right one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPlan {
    /// Nothing to fetch; answer from the cache.
    Cached,
    /// Nothing cached: fetch the whole window and replace the entry.
    Full(QueryRange),
    /// Fetch the missing head `[from, cacheStart)`.
    Prepend(QueryRange),
    /// Fetch the missing tail `[cacheEnd, to)`.
    Append(QueryRange),
}

impl FetchPlan {
    /// The range to fetch, if any.
    #[must_use]
    pub const fn range(&self) -> Option<QueryRange> {
        match self {
            Self::Cached => None,
            Self::Full(r) | Self::Prepend(r) | Self::Append(r) => Some(*r),
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Cached => "cached",
            Self::Full(_) => "full",
            Self::Prepend(_) => "prepend",
            Self::Append(_) => "append",
        }
    }

    /// True when no upstream call is needed.
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        matches!(self, Self::Cached)
    }
}

impl fmt::Display for FetchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.range() {
            Some(r) => write!(f, "{} {r}", self.kind()),
            None => f.write_str(self.kind()),
        }
    }
}

/// Decide which range (if any) must be fetched for `ctx` given the cached series.
///
/// Every planned range has its end clamped to `now`; a range emptied by the
/// clamp plans nothing.
#[must_use]
pub fn plan(ctx: &RequestContext, cached: &CandleSeries, now: i64) -> FetchPlan {
    // no bars exist inside the weekly closure, whatever is cached
    if range_within_closure(ctx.from, ctx.to) {
        return FetchPlan::Cached;
    }

    let period = ctx.resolution.period_secs();
    let (Some(start), Some(end)) = (cached.first_time(), cached.last_time()) else {
        return clamped(ctx.from, ctx.to, now).map_or(FetchPlan::Cached, FetchPlan::Full);
    };

    if ctx.from < start && start.saturating_sub(ctx.from) > period {
        return clamped(ctx.from, start, now).map_or(FetchPlan::Cached, FetchPlan::Prepend);
    }

    if ctx.to > end {
        return clamped(end, ctx.to, now)
            .filter(|r| !is_saturday(r.to()))
            .map_or(FetchPlan::Cached, FetchPlan::Append);
    }

    FetchPlan::Cached
}

fn clamped(from: i64, to: i64, now: i64) -> Option<QueryRange> {
    QueryRange::new(from, to).ok()?.clamp_end(now)
}

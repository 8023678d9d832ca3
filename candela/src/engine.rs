//! History request pipeline: plan, fetch, merge, slice.
//!
//! Each request runs as a small state machine over pure stage functions. The
//! cache entry for the request's key stays locked from planning until the
//! slice is taken, so concurrent requests for one key are serialized and the
//! second plans against the first one's merged result.

use std::sync::Arc;

use candela_core::{
    CandelaConfig, CandelaError, HistoryResponse, MergeStats, QueryRange, RequestContext,
    SymbolProvider,
};

use crate::paginate::{FetchOutcome, PaginatingFetcher};
use crate::planner::{FetchPlan, plan};
use crate::store::{CacheStore, EntryGuard};

/// Source of the current time in seconds since the Unix epoch.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Stage of one history request.
///
/// `Planning -> Fetching -> Merging -> Slicing -> Done`; a plan with nothing
/// to fetch goes from `Planning` straight to `Merging`. `Error` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryStage {
    /// Comparing the window with the cached series.
    Planning,
    /// Upstream calls in flight.
    Fetching,
    /// Applying the fetch outcome to the cache.
    Merging,
    /// Cutting the answer out of the cache.
    Slicing,
    /// Answered.
    Done,
    /// Failed; the cache was not touched.
    Error,
}

impl HistoryStage {
    /// Stage entered once `plan` is known.
    #[must_use]
    pub const fn after_planning(plan: &FetchPlan) -> Self {
        if plan.is_cached() {
            Self::Merging
        } else {
            Self::Fetching
        }
    }
}

#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
struct Stages {
    current: HistoryStage,
}

impl Stages {
    const fn new() -> Self {
        Self {
            current: HistoryStage::Planning,
        }
    }

    fn advance(&mut self, next: HistoryStage) {
        #[cfg(feature = "tracing")]
        tracing::debug!(from = ?self.current, to = ?next, "history stage");
        self.current = next;
    }
}

pub(crate) struct Engine {
    pub(crate) store: Arc<CacheStore>,
    pub(crate) fetcher: PaginatingFetcher,
    pub(crate) symbols: Option<Arc<dyn SymbolProvider>>,
    pub(crate) cfg: CandelaConfig,
    pub(crate) clock: Clock,
}

impl Engine {
    /// Answer one history request; failures become `status: error`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candela::history",
            skip(self, ctx),
            fields(
                symbol = %ctx.symbol,
                resolution = %ctx.resolution,
                from = ctx.from,
                to = ctx.to,
            ),
        )
    )]
    pub(crate) async fn run(self: Arc<Self>, ctx: RequestContext) -> HistoryResponse {
        let mut stages = Stages::new();
        match self.pipeline(ctx, &mut stages).await {
            Ok(resp) => {
                stages.advance(HistoryStage::Done);
                resp
            }
            Err(e) => {
                stages.advance(HistoryStage::Error);
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, "history request failed");
                HistoryResponse::error(e.to_string())
            }
        }
    }

    async fn pipeline(
        &self,
        ctx: RequestContext,
        stages: &mut Stages,
    ) -> Result<HistoryResponse, CandelaError> {
        let ctx = self.validate(ctx).await?;
        let key = ctx.key();
        let mut entry = self.store.lock(&key).await;

        let plan = plan(&ctx, entry.series(), (self.clock)());
        #[cfg(feature = "tracing")]
        tracing::debug!(plan = %plan, cached = entry.series().len(), "planned");

        stages.advance(HistoryStage::after_planning(&plan));
        let fetched = match plan.range() {
            Some(range) => {
                let outcome = self.fetch(&ctx, range).await?;
                stages.advance(HistoryStage::Merging);
                Some(outcome)
            }
            None => None,
        };

        if let Some(outcome) = fetched {
            let stats = merge(&mut entry, plan, outcome).await;
            log_merge(plan, stats);
        }

        stages.advance(HistoryStage::Slicing);
        let window = entry.slice(ctx.from, ctx.to);
        drop(entry);
        Ok(respond(&ctx, window, self.cfg.no_data_lookback_secs))
    }

    async fn fetch(
        &self,
        ctx: &RequestContext,
        range: QueryRange,
    ) -> Result<FetchOutcome, CandelaError> {
        self.fetcher.fetch(&ctx.symbol, ctx.resolution, range).await
    }

    /// Reject bad windows and unknown symbols; resolve `EXCHANGE:NAME` to `NAME`.
    async fn validate(&self, mut ctx: RequestContext) -> Result<RequestContext, CandelaError> {
        ctx.range()?;
        for t in [ctx.from, ctx.to] {
            if chrono::DateTime::from_timestamp(t, 0).is_none() {
                return Err(CandelaError::InvalidArg(format!(
                    "timestamp {t} is out of the supported range"
                )));
            }
        }
        match &self.symbols {
            Some(symbols) => {
                let info = symbols.lookup(&ctx.symbol).await?;
                ctx.symbol = info.name;
            }
            None => {
                if let Some((_, name)) = ctx.symbol.split_once(':') {
                    ctx.symbol = name.to_string();
                }
            }
        }
        if ctx.symbol.is_empty() {
            return Err(CandelaError::InvalidArg("empty symbol".into()));
        }
        Ok(ctx)
    }
}

/// Apply a fetch outcome to the locked entry according to the plan.
///
/// Returns `None` when the outcome leaves the entry untouched.
pub(crate) async fn merge(
    entry: &mut EntryGuard<'_>,
    plan: FetchPlan,
    outcome: FetchOutcome,
) -> Option<MergeStats> {
    match (plan, outcome) {
        (FetchPlan::Full(_), outcome) => {
            let series = outcome.into_series();
            let added = series.len();
            entry.replace(series).await;
            Some(MergeStats {
                added,
                overlapped: 0,
            })
        }
        (FetchPlan::Prepend(_), FetchOutcome::Data(series)) => Some(entry.prepend(series).await),
        (FetchPlan::Append(_), FetchOutcome::Data(series) | FetchOutcome::LeadingGap(series)) => {
            Some(entry.append(series).await)
        }
        _ => None,
    }
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn log_merge(plan: FetchPlan, stats: Option<MergeStats>) {
    #[cfg(feature = "tracing")]
    match stats {
        Some(s) => tracing::debug!(
            plan = plan.kind(),
            added = s.added,
            overlapped = s.overlapped,
            "merged"
        ),
        None => tracing::debug!(plan = plan.kind(), "fetch outcome left the cache unchanged"),
    }
}

/// Wrap the final slice: `ok` with bars, otherwise `no_data` pointing further back.
pub(crate) fn respond(
    ctx: &RequestContext,
    window: candela_core::CandleSeries,
    lookback_secs: i64,
) -> HistoryResponse {
    if window.is_empty() {
        HistoryResponse::no_data(Some(ctx.to.saturating_sub(lookback_secs)))
    } else {
        HistoryResponse::ok(window)
    }
}

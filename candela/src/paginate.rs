use std::sync::Arc;

use candela_core::calendar::include_first_candle;
use candela_core::{
    CandelaError, CandleProvider, CandleRequest, CandleSeries, QueryRange, Resolution,
    concat_chunks,
};
use tokio::sync::Semaphore;

/// Result of fetching one planned range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Every chunk came back empty.
    Empty,
    /// The first chunk was empty but later ones returned bars.
    LeadingGap(CandleSeries),
    /// Bars were returned from the start of the range.
    Data(CandleSeries),
}

impl FetchOutcome {
    /// The fetched bars; empty for [`FetchOutcome::Empty`].
    #[must_use]
    pub fn into_series(self) -> CandleSeries {
        match self {
            Self::Empty => CandleSeries::new(),
            Self::LeadingGap(s) | Self::Data(s) => s,
        }
    }
}

/// Split `range` into the fewest equal chunks holding at most `max_bars` bars each.
///
/// Boundaries are `from + i * (to - from) / n` in whole seconds and the last
/// chunk ends exactly at `to`.
#[must_use]
pub fn chunk_ranges(range: QueryRange, resolution: Resolution, max_bars: u32) -> Vec<QueryRange> {
    let max = i64::from(max_bars.max(1));
    let bars = range.bars(resolution);
    let n = (bars.saturating_add(max - 1) / max).max(1);
    let (from, to) = (range.from(), range.to());
    let dur = i128::from(range.duration());
    let n128 = i128::from(n);
    #[allow(clippy::cast_possible_truncation)]
    let boundary = |i: i64| from + (dur * i128::from(i) / n128) as i64;

    (0..n)
        .filter_map(|i| {
            let end = if i == n - 1 { to } else { boundary(i + 1) };
            QueryRange::new(boundary(i), end).ok()
        })
        .collect()
}

/// Splits planned ranges into upstream-sized calls and runs them under a shared limiter.
#[derive(Clone)]
pub struct PaginatingFetcher {
    provider: Arc<dyn CandleProvider>,
    limiter: Arc<Semaphore>,
    max_bars_per_call: u32,
}

impl PaginatingFetcher {
    /// Build a fetcher over `provider`.
    #[must_use]
    pub const fn new(
        provider: Arc<dyn CandleProvider>,
        limiter: Arc<Semaphore>,
        max_bars_per_call: u32,
    ) -> Self {
        Self {
            provider,
            limiter,
            max_bars_per_call,
        }
    }

    /// Name of the underlying provider.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Fetch `range` for `symbol`, paginating as needed.
    ///
    /// # Errors
    /// The first chunk error aborts the whole fetch and is returned as is.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candela::paginate::fetch",
            skip(self, range),
            fields(provider = self.provider.name(), range = %range),
        )
    )]
    pub async fn fetch(
        &self,
        symbol: &str,
        resolution: Resolution,
        range: QueryRange,
    ) -> Result<FetchOutcome, CandelaError> {
        let chunks = chunk_ranges(range, resolution, self.max_bars_per_call);
        #[cfg(feature = "tracing")]
        tracing::debug!(chunks = chunks.len(), "dispatching upstream calls");

        let calls = chunks.iter().map(|&chunk| {
            let req = CandleRequest {
                symbol: symbol.to_string(),
                resolution,
                range: chunk,
                include_first: include_first_candle(chunk.from()),
            };
            self.fetch_chunk(req)
        });
        let results = futures::future::try_join_all(calls).await?;
        Ok(assemble(results))
    }

    async fn fetch_chunk(
        &self,
        req: CandleRequest,
    ) -> Result<(QueryRange, CandleSeries), CandelaError> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| CandelaError::Other("fetch limiter closed".into()))?;
        let series = self.provider.fetch_candles(&req).await?;
        Ok((req.range, series))
    }
}

impl core::fmt::Debug for PaginatingFetcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PaginatingFetcher")
            .field("provider", &self.provider.name())
            .field("max_bars_per_call", &self.max_bars_per_call)
            .field("available_permits", &self.limiter.available_permits())
            .finish()
    }
}

/// Order chunk results chronologically and classify the outcome.
///
/// Chunks sort by their first bar; an empty chunk sorts by its range start.
pub(crate) fn assemble(mut results: Vec<(QueryRange, CandleSeries)>) -> FetchOutcome {
    if results.iter().all(|(_, s)| s.is_empty()) {
        return FetchOutcome::Empty;
    }
    let leading_gap = results
        .iter()
        .min_by_key(|(r, _)| r.from())
        .is_some_and(|(_, s)| s.is_empty());
    results.sort_by_key(|(r, s)| s.first_time().unwrap_or_else(|| r.from()));
    let merged = concat_chunks(results.into_iter().map(|(_, s)| s));
    if leading_gap {
        FetchOutcome::LeadingGap(merged)
    } else {
        FetchOutcome::Data(merged)
    }
}

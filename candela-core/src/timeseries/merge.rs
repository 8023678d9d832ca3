use crate::CandleSeries;

/// Counters describing what a merge did to the cached series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Bars added to the cached series.
    pub added: usize,
    /// Cached bars replaced by a newer copy (append) or incoming bars dropped (prepend).
    pub overlapped: usize,
}

/// Append `incoming` after `cached`.
///
/// Cached bars with `time >=` the first incoming timestamp are discarded first,
/// so the freshly fetched copy of an overlapping tail wins.
pub fn append_series(cached: &mut CandleSeries, incoming: CandleSeries) -> MergeStats {
    let Some(first) = incoming.first_time() else {
        return MergeStats::default();
    };
    let overlapped = cached.truncate_from(first);
    let added = incoming.len();
    // truncation guarantees `incoming` starts strictly after the cached tail
    let joined = cached.extend(incoming);
    debug_assert!(joined.is_ok());
    MergeStats { added, overlapped }
}

/// Insert `incoming` before `cached`.
///
/// Incoming bars with `time >=` the cached head are dropped so the boundary
/// never duplicates; `overlapped` reports how many were dropped.
pub fn prepend_series(cached: &mut CandleSeries, mut incoming: CandleSeries) -> MergeStats {
    let overlapped = match cached.first_time() {
        Some(head) => incoming.truncate_from(head),
        None => 0,
    };
    let added = incoming.len();
    if added == 0 {
        return MergeStats { added, overlapped };
    }
    let tail = std::mem::take(cached);
    let joined = incoming.extend(tail);
    debug_assert!(joined.is_ok());
    *cached = incoming;
    MergeStats { added, overlapped }
}

/// Concatenate chunk results already ordered by start time.
///
/// A timestamp reported by two chunks appears once; the later chunk wins.
pub fn concat_chunks<I>(chunks: I) -> CandleSeries
where
    I: IntoIterator<Item = CandleSeries>,
{
    let mut out = CandleSeries::new();
    for chunk in chunks {
        append_series(&mut out, chunk);
    }
    out
}

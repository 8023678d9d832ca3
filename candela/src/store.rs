//! Process-local candle cache keyed by (symbol, resolution).
//!
//! Every entry sits behind its own async mutex. A store-wide gate is held
//! shared by merges and exclusively by [`CacheStore::reset`], so a reset never
//! observes a half-applied merge. Reset only detaches entries from the map;
//! a request that already holds an entry finishes against that detached copy.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use candela_core::task::TaskHandle;
use candela_core::{
    CandleSeries, MergeStats, SeriesKey, append_series, prepend_series, slice_window,
};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, RwLock};

type Entry = Arc<AsyncMutex<CandleSeries>>;

/// Candle cache shared by every request of one engine.
#[derive(Default)]
pub struct CacheStore {
    entries: Mutex<HashMap<SeriesKey, Entry>>,
    gate: RwLock<()>,
}

/// Exclusive access to one cache entry.
///
/// Held by the orchestrator from planning until the final slice, which
/// serializes concurrent requests for the same key.
pub struct EntryGuard<'a> {
    store: &'a CacheStore,
    key: SeriesKey,
    series: OwnedMutexGuard<CandleSeries>,
}

impl CacheStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, key: &SeriesKey) -> Entry {
        let mut map = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(map.entry(key.clone()).or_default())
    }

    /// Lock the entry for `key`, creating an empty one on first access.
    pub async fn lock(&self, key: &SeriesKey) -> EntryGuard<'_> {
        let series = self.entry(key).lock_owned().await;
        EntryGuard {
            store: self,
            key: key.clone(),
            series,
        }
    }

    /// Current series for `key` (possibly empty).
    pub async fn get(&self, key: &SeriesKey) -> CandleSeries {
        self.lock(key).await.series().clone()
    }

    /// Cached bars for `key`, or `None` when nothing is cached. Never creates an entry.
    pub async fn peek(&self, key: &SeriesKey) -> Option<CandleSeries> {
        let entry = {
            let map = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            map.get(key).map(Arc::clone)
        }?;
        let series = entry.lock().await;
        (!series.is_empty()).then(|| series.clone())
    }

    /// Set the entry directly.
    pub async fn replace(&self, key: &SeriesKey, series: CandleSeries) {
        self.lock(key).await.replace(series).await;
    }

    /// Insert `series` before the cached bars.
    pub async fn prepend(&self, key: &SeriesKey, series: CandleSeries) -> MergeStats {
        self.lock(key).await.prepend(series).await
    }

    /// Insert `series` after the cached bars; the new copy of an overlapping tail wins.
    pub async fn append(&self, key: &SeriesKey, series: CandleSeries) -> MergeStats {
        self.lock(key).await.append(series).await
    }

    /// Cached bars with `from <= time <= to`.
    pub async fn slice(&self, key: &SeriesKey, from: i64, to: i64) -> CandleSeries {
        self.lock(key).await.slice(from, to)
    }

    /// Drop every entry.
    pub async fn reset(&self) {
        let _exclusive = self.gate.write().await;
        let dropped = {
            let mut map = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            let n = map.len();
            map.clear();
            n
        };
        #[cfg(feature = "tracing")]
        tracing::warn!(entries = dropped, "candle cache reset");
        #[cfg(not(feature = "tracing"))]
        let _ = dropped;
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when no entry exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(key, bar count)` for every entry, sorted by key.
    pub async fn entries(&self) -> Vec<(SeriesKey, usize)> {
        let snapshot: Vec<(SeriesKey, Entry)> = {
            let map = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            map.iter().map(|(k, v)| (k.clone(), Arc::clone(v))).collect()
        };
        let mut out = Vec::with_capacity(snapshot.len());
        for (key, entry) in snapshot {
            let len = entry.lock().await.len();
            out.push((key, len));
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Reset the store every `interval` on the current Tokio runtime.
    ///
    /// The first reset fires one full interval after the call.
    pub fn spawn_reset_timer(self: &Arc<Self>, interval: Duration) -> TaskHandle {
        let interval = interval.max(Duration::from_millis(1));
        let store = Arc::clone(self);
        let (stop_tx, mut stop_rx) = tokio::sync::oneshot::channel::<()>();
        let join = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => store.reset().await,
                }
            }
        });
        TaskHandle::new(join, stop_tx)
    }
}

impl EntryGuard<'_> {
    /// Key of the locked entry.
    #[must_use]
    pub const fn key(&self) -> &SeriesKey {
        &self.key
    }

    /// The cached series.
    #[must_use]
    pub fn series(&self) -> &CandleSeries {
        &self.series
    }

    /// Set the entry directly (used when the cache was empty).
    pub async fn replace(&mut self, series: CandleSeries) {
        let _shared = self.store.gate.read().await;
        *self.series = series;
    }

    /// Insert `series` before the cached bars, dropping incoming bars at or after the cached head.
    pub async fn prepend(&mut self, series: CandleSeries) -> MergeStats {
        let _shared = self.store.gate.read().await;
        let stats = prepend_series(&mut self.series, series);
        if stats.overlapped > 0 {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                key = %self.key,
                dropped = stats.overlapped,
                "prepend overlapped cached head; dropped duplicate bars"
            );
        }
        stats
    }

    /// Insert `series` after the cached bars; cached bars at or after its first timestamp are replaced.
    pub async fn append(&mut self, series: CandleSeries) -> MergeStats {
        let _shared = self.store.gate.read().await;
        append_series(&mut self.series, series)
    }

    /// Cached bars with `from <= time <= to`.
    #[must_use]
    pub fn slice(&self, from: i64, to: i64) -> CandleSeries {
        slice_window(&self.series, from, to)
    }
}

//! Time-series utilities shared by the fetcher and the cache.
//!
//! - `merge`: splice fetched series into cached ones without duplicate timestamps
//! - `slice`: cut a series down to a requested window
/// Merge utilities for joining fetched and cached series.
pub mod merge;
/// Window selection over a cached series.
pub mod slice;

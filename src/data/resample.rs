//! Aggregation of 1-minute bars into coarser timeframes.
//!
//! [`aggregate`] is the pure transform. [`Resampler`] memoizes its result per
//! timeframe; an entry is reused only while the source has the same length
//! and the same CRC32 content fingerprint it was built from, so a bar
//! replaced in place is picked up even though the length did not change.
//! Any change forces a full recompute of that timeframe.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;

use super::object::Bar;
use super::timeframe::Timeframe;

/// Number of timeframes memoized before the least recently used one is evicted
pub const DEFAULT_CACHE_CAPACITY: usize = 16;

/// Builder for accumulating 1-minute bars into one bucket
struct BucketBuilder {
    /// Bucket start time
    start_time: i64,
    /// Open price (first bar in bucket)
    open: f64,
    /// High price (max in bucket)
    high: f64,
    /// Low price (min in bucket)
    low: f64,
    /// Close price (last bar in bucket)
    close: f64,
}

impl BucketBuilder {
    fn new(bar: &Bar, start_time: i64) -> Self {
        Self {
            start_time,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
        }
    }

    fn update(&mut self, bar: &Bar) {
        self.high = self.high.max(bar.high);
        self.low = self.low.min(bar.low);
        self.close = bar.close;
    }

    fn build(self) -> Bar {
        Bar {
            time: self.start_time,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
        }
    }
}

/// Aggregate an ascending bar series into `timeframe` buckets.
///
/// A 1-minute timeframe returns the input unchanged. Buckets are emitted in
/// encounter order, so the caller must pass a time-ordered series.
pub fn aggregate(series: &[Bar], timeframe: Timeframe) -> Vec<Bar> {
    if timeframe.is_base() {
        return series.to_vec();
    }

    let mut aggregated = Vec::new();
    let mut current: Option<BucketBuilder> = None;

    for bar in series {
        let bucket_start = timeframe.bucket_start(bar.time);

        if let Some(builder) = current.as_mut() {
            if builder.start_time == bucket_start {
                builder.update(bar);
                continue;
            }
        }

        // New bucket - complete the old one and start a new one
        if let Some(finished) = current.replace(BucketBuilder::new(bar, bucket_start)) {
            aggregated.push(finished.build());
        }
    }

    // Don't forget the last bucket
    if let Some(builder) = current {
        aggregated.push(builder.build());
    }

    aggregated
}

/// CRC32 over the full content of a series
pub fn fingerprint(series: &[Bar]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    for bar in series {
        hasher.update(&bar.time.to_le_bytes());
        for price in [bar.open, bar.high, bar.low, bar.close] {
            hasher.update(&price.to_bits().to_le_bytes());
        }
    }
    hasher.finalize()
}

struct CacheEntry {
    source_len: usize,
    source_fingerprint: u32,
    bars: Arc<[Bar]>,
}

/// Memoizing front of [`aggregate`], owned by one chart context
pub struct Resampler {
    cache: LruCache<Timeframe, CacheEntry>,
}

impl Default for Resampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Resampler {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Create a resampler holding at most `capacity` timeframes (minimum one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
        }
    }

    /// Aggregate `series` at `timeframe`, reusing the cached result when the
    /// source is unchanged since it was built
    pub fn resample(&mut self, series: &[Bar], timeframe: Timeframe) -> Arc<[Bar]> {
        if timeframe.is_base() {
            return Arc::from(series);
        }

        let source_fingerprint = fingerprint(series);
        if let Some(entry) = self.cache.get(&timeframe) {
            if entry.source_len == series.len() && entry.source_fingerprint == source_fingerprint {
                debug!(timeframe = %timeframe, "resample cache hit");
                return Arc::clone(&entry.bars);
            }
        }

        let bars: Arc<[Bar]> = aggregate(series, timeframe).into();
        debug!(
            timeframe = %timeframe,
            source = series.len(),
            buckets = bars.len(),
            "resampled bars"
        );

        self.cache.put(
            timeframe,
            CacheEntry {
                source_len: series.len(),
                source_fingerprint,
                bars: Arc::clone(&bars),
            },
        );
        bars
    }

    /// Number of timeframes currently memoized
    pub fn cached_timeframes(&self) -> usize {
        self.cache.len()
    }

    /// Drop every memoized result
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }
}

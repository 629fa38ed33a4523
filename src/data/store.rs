//! Canonical store of 1-minute bars.
//!
//! Keeps bars ascending by time with unique timestamps. Newly fetched ranges
//! may arrive unsorted and may overlap what is already held; the most
//! recently merged bar wins on a timestamp collision.

use tracing::debug;

use super::ingest::normalize;
use super::object::{Bar, RawBar};

/// Owns the ascending, deduplicated bar sequence of one chart context
#[derive(Debug, Clone, Default)]
pub struct BarStore {
    bars: Vec<Bar>,
}

impl BarStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self { bars: Vec::new() }
    }

    /// Create a store from an initial batch
    pub fn from_bars(bars: Vec<Bar>) -> Self {
        let mut store = Self::new();
        store.merge(bars);
        store
    }

    /// Merge a batch of bars into the store.
    ///
    /// The merged sequence is built aside and swapped in at the end, so a
    /// caller never observes a partially merged store.
    pub fn merge(&mut self, new_bars: Vec<Bar>) -> &[Bar] {
        if new_bars.is_empty() {
            return &self.bars;
        }

        let incoming = new_bars.len();
        let mut merged = Vec::with_capacity(self.bars.len() + incoming);
        merged.extend_from_slice(&self.bars);
        merged.extend(new_bars);

        // Stable sort: among equal times, later-merged bars stay later
        merged.sort_by_key(|bar| bar.time);
        let merged = collapse_keep_last(merged);

        debug!(
            before = self.bars.len(),
            incoming,
            after = merged.len(),
            "merged bars into store"
        );

        self.bars = merged;
        &self.bars
    }

    /// Normalize raw records and merge the survivors
    pub fn ingest(&mut self, raw: Vec<RawBar>) -> &[Bar] {
        self.merge(normalize(raw))
    }

    /// Get all bars
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Get total number of bars
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Time of the oldest bar
    pub fn first_time(&self) -> Option<i64> {
        self.bars.first().map(|bar| bar.time)
    }

    /// Time of the newest bar
    pub fn last_time(&self) -> Option<i64> {
        self.bars.last().map(|bar| bar.time)
    }

    /// Get index for a timestamp
    pub fn index_of(&self, time: i64) -> Option<usize> {
        self.bars.binary_search_by_key(&time, |bar| bar.time).ok()
    }

    /// Clear all data
    pub fn clear(&mut self) {
        self.bars.clear();
    }
}

/// Collapse runs of equal timestamps in a time-sorted vector, keeping the
/// last bar of each run
fn collapse_keep_last(sorted: Vec<Bar>) -> Vec<Bar> {
    let mut out: Vec<Bar> = Vec::with_capacity(sorted.len());
    for bar in sorted {
        match out.last_mut() {
            Some(last) if last.time == bar.time => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}

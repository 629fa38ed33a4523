//! Bar data: model, ingestion, storage and resampling.
//!
//! This module provides:
//! - `Bar` / `RawBar` - normalized and as-delivered bar records
//! - `normalize` / `parse_bars_json` - input filtering and timestamp normalization
//! - `BarStore` - the ascending, deduplicated 1-minute series
//! - `Timeframe`, `aggregate`, `Resampler` - N-minute aggregation with memoization

mod ingest;
mod object;
mod resample;
mod store;
mod timeframe;

pub use ingest::{normalize, normalize_bar, parse_bars_json, parse_time};
pub use object::{Bar, RawBar, RawTime};
pub use resample::{aggregate, fingerprint, Resampler, DEFAULT_CACHE_CAPACITY};
pub use store::BarStore;
pub use timeframe::Timeframe;

//! Chart computations over resampled bars.
//!
//! This module provides:
//! - `IndicatorPoint`, `BandPoint`, `HistogramPoint` - index-aligned output points
//! - `Sma`, `Ema`, `Bollinger`, `Rsi`, `Macd` - indicators behind the `Indicator` trait
//! - `SwingDetector` - fractal ZigZag swings with HH/LH/LL/HL markers
//! - `classify`, `TrendClassifier` - Up/Down/Flat from the latest swings
//! - `IndicatorEngine` / `ChartContext` - one configured pass, and its owning context
//! - `MarketSummary` - parallel multi-timeframe dashboard summary
//!
//! # Example
//!
//! ```ignore
//! use fxlab_engine::chart::ChartContext;
//! use fxlab_engine::config::EngineConfig;
//!
//! let mut context = ChartContext::new(EngineConfig::default())?;
//! context.merge(bars);
//! let output = context.refresh();
//! ```

mod base;
mod context;
mod dashboard;
mod engine;
mod indicator;
mod swing;
mod trend;

pub use base::*;
pub use context::ChartContext;
pub use dashboard::{default_timeframes, DashboardOptions, MarketSummary, PriceDirection, TimeframeTrend};
pub use engine::{ChartOutput, IndicatorEngine};
pub use indicator::*;
pub use swing::{
    label_swings, swing_markers, MarkerPosition, MarkerShape, SwingDetector, SwingKind, SwingMarker,
    SwingOutput, SwingPoint, DEFAULT_FRACTAL_WIDTH,
};
pub use trend::{classify, TrendClassifier, TrendLabel};

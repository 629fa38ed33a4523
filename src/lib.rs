//! FX Lab Engine - bar resampling and technical analysis for streamed OHLC data
//!
//! This crate provides:
//!
//! - Bar ingestion, merge/dedupe storage and N-minute resampling with a cache
//! - SMA, EMA, Bollinger Bands, RSI and two independent MACD instances
//! - Fractal swing detection with HH/LH/LL/HL labels and trend classification
//! - A multi-timeframe dashboard summary and an SMA crossover replay
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use fxlab_engine::{parse_bars_json, ChartContext, EngineConfig};
//!
//! let mut config = EngineConfig::default();
//! config.rsi.enabled = true;
//!
//! let mut context = ChartContext::new(config).unwrap();
//! context.merge(parse_bars_json("[]").unwrap());
//! let output = context.refresh();
//! println!("{}", serde_json::to_string_pretty(&output).unwrap());
//! ```

pub mod backtesting;
pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod logger;
pub mod setting;
pub mod utility;

// Re-export commonly used types
pub use backtesting::{BacktestingResult, CrossoverBacktest};
pub use chart::{
    ChartContext, ChartOutput, IndicatorEngine, MarketSummary, SwingDetector, SwingPoint, TrendLabel,
};
pub use config::{load_config, EngineConfig};
pub use data::{aggregate, parse_bars_json, Bar, BarStore, RawBar, Resampler, Timeframe};
pub use error::{ConfigError, EngineError};
pub use logger::init_logger;
pub use setting::SETTINGS;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

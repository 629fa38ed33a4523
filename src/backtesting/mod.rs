//! Backtesting Module
//!
//! SMA crossover replay over a bar series, reported in pips

pub mod base;
pub mod engine;
pub mod statistics;

pub use base::{pip_multiplier, BacktestingResult, BacktestingStatistics, EquityPoint, Trade, TradeSide};
pub use engine::CrossoverBacktest;
pub use statistics::{calculate_max_drawdown, calculate_profit_factor, calculate_statistics};

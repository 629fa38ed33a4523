//! Backtesting Base Types
//!
//! Trades, equity points and statistics of an SMA crossover replay

use serde::Serialize;

use crate::chart::IndicatorPoint;

/// Pip multiplier for JPY-quoted symbols
pub const JPY_PIP_MULTIPLIER: f64 = 100.0;
/// Pip multiplier for every other symbol
pub const PIP_MULTIPLIER: f64 = 10_000.0;

/// Price-difference to pips factor of a symbol
pub fn pip_multiplier(symbol: &str) -> f64 {
    if symbol.to_ascii_uppercase().contains("JPY") {
        JPY_PIP_MULTIPLIER
    } else {
        PIP_MULTIPLIER
    }
}

/// Position side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Long,
    Short,
}

impl TradeSide {
    /// Price-unit PnL of a position opened at `entry` and valued at `price`
    pub fn pnl(&self, entry: f64, price: f64) -> f64 {
        match self {
            TradeSide::Long => price - entry,
            TradeSide::Short => entry - price,
        }
    }
}

/// Closed round trip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub entry_time: i64,
    pub exit_time: i64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub side: TradeSide,
    /// In price units
    pub pnl: f64,
}

/// Realised plus floating PnL in pips after a bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EquityPoint {
    pub time: i64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BacktestingStatistics {
    pub total_trades: usize,
    pub winning_trades: usize,
    /// Share of trades with positive PnL, 4 decimals
    pub win_rate: f64,
    /// Realised PnL in pips, 2 decimals
    pub total_pnl_pips: f64,
    /// Gross profit over gross loss, absent without a losing trade
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_factor: Option<f64>,
    /// Largest peak-to-trough fall of the equity curve in pips
    pub max_drawdown_pips: f64,
}

/// Output of one replay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestingResult {
    pub symbol: String,
    pub statistics: BacktestingStatistics,
    pub trades: Vec<Trade>,
    pub equity: Vec<EquityPoint>,
    pub fast_sma: Vec<IndicatorPoint>,
    pub slow_sma: Vec<IndicatorPoint>,
}

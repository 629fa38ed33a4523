//! SMA crossover replay.
//!
//! The position is always on the side of the latest signal: long while the
//! fast average is above the slow one, short otherwise. Each flip closes the
//! open trade at the bar's close and opens the opposite side at the same
//! price. Bars where either average is still warming up carry no signal.

use tracing::{debug, info};

use super::base::{pip_multiplier, BacktestingResult, EquityPoint, Trade, TradeSide};
use super::statistics::calculate_statistics;
use crate::chart::{to_points, Sma};
use crate::data::Bar;
use crate::error::ConfigError;
use crate::utility::round_to;

#[derive(Debug, Clone, Copy)]
struct OpenPosition {
    side: TradeSide,
    entry_time: i64,
    entry_price: f64,
}

/// Replays a fast/slow SMA crossover over a bar series
#[derive(Debug, Clone)]
pub struct CrossoverBacktest {
    fast: Sma,
    slow: Sma,
}

impl CrossoverBacktest {
    pub fn new(fast: usize, slow: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            fast: Sma::new(fast)?,
            slow: Sma::new(slow)?,
        })
    }

    pub fn run(&self, symbol: &str, bars: &[Bar]) -> BacktestingResult {
        let multiplier = pip_multiplier(symbol);
        let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();
        let fast = self.fast.values(&closes);
        let slow = self.slow.values(&closes);

        let mut trades = Vec::new();
        let mut equity = Vec::with_capacity(bars.len());
        let mut position: Option<OpenPosition> = None;
        let mut realized = 0.0;

        for (i, bar) in bars.iter().enumerate() {
            let signal = match (fast[i], slow[i]) {
                (Some(f), Some(s)) if f > s => Some(TradeSide::Long),
                (Some(_), Some(_)) => Some(TradeSide::Short),
                _ => None,
            };

            if let Some(target) = signal {
                if position.map(|p| p.side) != Some(target) {
                    if let Some(open) = position.take() {
                        let pnl = open.side.pnl(open.entry_price, bar.close);
                        realized += pnl;
                        trades.push(Trade {
                            entry_time: open.entry_time,
                            exit_time: bar.time,
                            entry_price: open.entry_price,
                            exit_price: bar.close,
                            side: open.side,
                            pnl,
                        });
                    }
                    position = Some(OpenPosition {
                        side: target,
                        entry_time: bar.time,
                        entry_price: bar.close,
                    });
                }
            }

            let floating = position.map_or(0.0, |p| p.side.pnl(p.entry_price, bar.close));
            equity.push(EquityPoint {
                time: bar.time,
                value: round_to((realized + floating) * multiplier, 0.01),
            });
        }

        let statistics = calculate_statistics(&trades, &equity, multiplier);
        debug!(symbol, bars = bars.len(), open = position.is_some(), "replay finished");
        info!(
            "回测完成 {}: {} trades, {} pips",
            symbol, statistics.total_trades, statistics.total_pnl_pips
        );

        BacktestingResult {
            symbol: symbol.to_string(),
            statistics,
            trades,
            equity,
            fast_sma: to_points(bars, &fast),
            slow_sma: to_points(bars, &slow),
        }
    }
}

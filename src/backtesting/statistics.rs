//! Backtesting Statistics Calculation
//!
//! Calculate performance metrics from replay results

use super::base::{BacktestingStatistics, EquityPoint, Trade};
use crate::utility::round_to;

/// Calculate summary statistics of a replay
pub fn calculate_statistics(trades: &[Trade], equity: &[EquityPoint], multiplier: f64) -> BacktestingStatistics {
    let total_trades = trades.len();
    let winning_trades = trades.iter().filter(|t| t.pnl > 0.0).count();

    let win_rate = if total_trades > 0 {
        round_to(winning_trades as f64 / total_trades as f64, 0.0001)
    } else {
        0.0
    };

    let realized: f64 = trades.iter().map(|t| t.pnl).sum();
    let values: Vec<f64> = equity.iter().map(|p| p.value).collect();

    BacktestingStatistics {
        total_trades,
        winning_trades,
        win_rate,
        total_pnl_pips: round_to(realized * multiplier, 0.01),
        profit_factor: calculate_profit_factor(trades),
        max_drawdown_pips: round_to(calculate_max_drawdown(&values), 0.01),
    }
}

/// Gross profit divided by gross loss. `None` when nothing was lost.
pub fn calculate_profit_factor(trades: &[Trade]) -> Option<f64> {
    let (gross_profit, gross_loss) = trades.iter().fold((0.0, 0.0), |(profit, loss), t| {
        if t.pnl > 0.0 {
            (profit + t.pnl, loss)
        } else {
            (profit, loss - t.pnl)
        }
    });

    if gross_loss > 0.0 {
        Some(round_to(gross_profit / gross_loss, 0.0001))
    } else {
        None
    }
}

/// Calculate maximum drawdown of an equity series that starts from zero
pub fn calculate_max_drawdown(values: &[f64]) -> f64 {
    let mut peak = 0.0_f64;
    let mut max_drawdown = 0.0_f64;

    for &value in values {
        peak = peak.max(value);
        max_drawdown = max_drawdown.max(peak - value);
    }

    max_drawdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtesting::base::TradeSide;

    fn trade(pnl: f64) -> Trade {
        Trade {
            entry_time: 0,
            exit_time: 60,
            entry_price: 1.0,
            exit_price: 1.0 + pnl,
            side: TradeSide::Long,
            pnl,
        }
    }

    #[test]
    fn test_calculate_max_drawdown() {
        let values = vec![0.0, 10.0, 5.0, 20.0, -10.0, -5.0];
        assert_eq!(calculate_max_drawdown(&values), 30.0);
        assert_eq!(calculate_max_drawdown(&[0.0, -4.0]), 4.0);
        assert_eq!(calculate_max_drawdown(&[]), 0.0);
    }

    #[test]
    fn test_profit_factor() {
        assert_eq!(calculate_profit_factor(&[trade(2.0), trade(-1.0), trade(-3.0)]), Some(0.5));
        assert_eq!(calculate_profit_factor(&[trade(2.0)]), None);
        assert_eq!(calculate_profit_factor(&[]), None);
    }

    #[test]
    fn test_calculate_statistics() {
        let trades = vec![trade(0.0010), trade(-0.0005), trade(0.0020)];
        let equity = vec![
            EquityPoint { time: 0, value: 10.0 },
            EquityPoint { time: 60, value: 5.0 },
            EquityPoint { time: 120, value: 25.0 },
        ];
        let stats = calculate_statistics(&trades, &equity, 10_000.0);

        assert_eq!(stats.total_trades, 3);
        assert_eq!(stats.winning_trades, 2);
        assert_eq!(stats.win_rate, 0.6667);
        assert_eq!(stats.total_pnl_pips, 25.0);
        assert_eq!(stats.profit_factor, Some(6.0));
        assert_eq!(stats.max_drawdown_pips, 5.0);
    }

    #[test]
    fn test_empty_statistics() {
        let stats = calculate_statistics(&[], &[], 100.0);
        assert_eq!(stats, BacktestingStatistics::default());
    }
}

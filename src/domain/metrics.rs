//! Backtest performance metrics.

use serde::Serialize;

use crate::domain::backtest::{EquityPoint, Trade};

/// Aggregate performance of one backtest run. All fields are zero-valued
/// when no trades occurred.
///
/// Invariants: `winning_trades + losing_trades == total_trades`;
/// `win_rate` is in [0, 100]; `max_drawdown_pct >= 0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub total_return: f64,
    pub total_return_pct: f64,
    pub avg_profit_per_trade: f64,
    pub max_profit: f64,
    pub max_loss: f64,
    pub max_drawdown_pct: f64,
    pub final_capital: f64,
}

impl BacktestReport {
    pub fn compute(
        trades: &[Trade],
        equity_curve: &[EquityPoint],
        initial_capital: f64,
        final_cash: f64,
    ) -> Self {
        let max_drawdown_pct = compute_max_drawdown(equity_curve);

        if trades.is_empty() {
            return BacktestReport {
                total_trades: 0,
                winning_trades: 0,
                losing_trades: 0,
                win_rate: 0.0,
                total_return: 0.0,
                total_return_pct: 0.0,
                avg_profit_per_trade: 0.0,
                max_profit: 0.0,
                max_loss: 0.0,
                max_drawdown_pct,
                final_capital: final_cash,
            };
        }

        let total_trades = trades.len();
        let winning_trades = trades.iter().filter(|t| t.profit > 0.0).count();
        let losing_trades = trades.iter().filter(|t| t.profit <= 0.0).count();

        let win_rate = winning_trades as f64 / total_trades as f64 * 100.0;

        let total_return: f64 = trades.iter().map(|t| t.profit).sum();
        let total_return_pct = if initial_capital > 0.0 {
            (final_cash - initial_capital) / initial_capital * 100.0
        } else {
            0.0
        };

        let avg_profit_per_trade = total_return / total_trades as f64;

        let max_profit = trades
            .iter()
            .map(|t| t.profit)
            .fold(f64::NEG_INFINITY, f64::max);
        let max_loss = trades.iter().map(|t| t.profit).fold(f64::INFINITY, f64::min);

        BacktestReport {
            total_trades,
            winning_trades,
            losing_trades,
            win_rate,
            total_return,
            total_return_pct,
            avg_profit_per_trade,
            max_profit,
            max_loss,
            max_drawdown_pct,
            final_capital: final_cash,
        }
    }
}

/// Maximum percentage decline from a running peak over the equity curve.
/// 0 for an empty or non-decreasing curve.
fn compute_max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = match equity_curve.first() {
        Some(p) => p.value,
        None => return 0.0,
    };
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        if point.value > peak {
            peak = point.value;
        } else if peak > 0.0 {
            let dd = (peak - point.value) / peak * 100.0;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

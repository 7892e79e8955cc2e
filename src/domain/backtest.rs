//! Backtest engine.
//!
//! Replays the crossover detector over a historical series with a
//! single-position simulated portfolio: all-in long entries on Buy, full
//! liquidation on Sell, forced liquidation at the end of the series.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::error::CrosswatchError;
use crate::domain::indicator::{with_moving_averages, MaBar};
use crate::domain::metrics::BacktestReport;
use crate::domain::series::{is_time_ordered, PricePoint};
use crate::domain::signal::{detect_crossover, Signal};

/// Parameters for one backtest run. Validated before the run starts and
/// immutable for its lifetime.
#[derive(Debug, Clone)]
pub struct BacktestParams {
    pub symbol: String,
    pub short_window: usize,
    pub long_window: usize,
    pub initial_capital: f64,
}

/// Why a trade was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitReason {
    /// A Sell crossover fired.
    Signal,
    /// The series ended while still long.
    EndOfData,
}

/// The side a trade was taken on. Only long positions are supported;
/// a Sell while flat is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PositionKind {
    Long,
}

/// One completed round trip. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,
    pub shares: f64,
    pub profit: f64,
    pub profit_pct: f64,
    pub kind: PositionKind,
    pub exit: ExitReason,
}

/// Portfolio valuation at one processed step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Full output of a backtest: the audit trail plus derived metrics.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestRun {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub report: BacktestReport,
}

#[derive(Debug)]
struct OpenPosition {
    entry_time: DateTime<Utc>,
    entry_price: f64,
    shares: f64,
}

fn close_position(
    position: OpenPosition,
    exit_time: DateTime<Utc>,
    exit_price: f64,
    exit: ExitReason,
) -> (Trade, f64) {
    let profit = (exit_price - position.entry_price) * position.shares;
    // entry price of zero would make the percentage undefined
    let profit_pct = if position.entry_price == 0.0 {
        f64::NAN
    } else {
        (exit_price - position.entry_price) / position.entry_price * 100.0
    };
    let cash = position.shares * exit_price;

    let trade = Trade {
        entry_time: position.entry_time,
        entry_price: position.entry_price,
        exit_time,
        exit_price,
        shares: position.shares,
        profit,
        profit_pct,
        kind: PositionKind::Long,
        exit,
    };

    (trade, cash)
}

/// Run the crossover strategy over a historical price series.
///
/// The series is annotated with both MAs; rows where either MA is undefined
/// are skipped, and the replay steps through the remaining rows in pairs.
pub fn run(series: &[PricePoint], params: &BacktestParams) -> Result<BacktestRun, CrosswatchError> {
    if series.is_empty() {
        return Err(CrosswatchError::NoData {
            symbol: params.symbol.clone(),
        });
    }
    // provider contract: strictly time-ordered, duplicate-free
    debug_assert!(is_time_ordered(series));

    let annotated = with_moving_averages(series, params.short_window, params.long_window)?;
    let bars: Vec<&MaBar> = annotated
        .iter()
        .filter(|b| b.short_ma.is_some() && b.long_ma.is_some())
        .collect();

    let mut cash = params.initial_capital;
    let mut position: Option<OpenPosition> = None;
    let mut trades: Vec<Trade> = Vec::new();
    let mut equity_curve: Vec<EquityPoint> = Vec::new();

    for pair in bars.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        let signal = detect_crossover(
            prev.short_ma.unwrap_or(f64::NAN),
            prev.long_ma.unwrap_or(f64::NAN),
            cur.short_ma.unwrap_or(f64::NAN),
            cur.long_ma.unwrap_or(f64::NAN),
        );

        match signal {
            Some(Signal::Buy) if position.is_none() => {
                position = Some(OpenPosition {
                    entry_time: cur.timestamp,
                    entry_price: cur.close,
                    shares: cash / cur.close,
                });
                cash = 0.0;
            }
            Some(Signal::Sell) => {
                if let Some(open) = position.take() {
                    let (trade, proceeds) =
                        close_position(open, cur.timestamp, cur.close, ExitReason::Signal);
                    cash = proceeds;
                    trades.push(trade);
                }
                // Sell while flat is a no-op
            }
            // Buy while long or no signal: hold
            _ => {}
        }

        let value = match &position {
            Some(p) => p.shares * cur.close,
            None => cash,
        };
        equity_curve.push(EquityPoint {
            timestamp: cur.timestamp,
            value,
        });
    }

    // closing liquidation for a position still open at the end
    if let (Some(open), Some(last)) = (position.take(), bars.last()) {
        let (trade, proceeds) =
            close_position(open, last.timestamp, last.close, ExitReason::EndOfData);
        cash = proceeds;
        trades.push(trade);
    }

    let report = BacktestReport::compute(&trades, &equity_curve, params.initial_capital, cash);

    Ok(BacktestRun {
        trades,
        equity_curve,
        report,
    })
}

//! Integration tests.
//!
//! Tests cover:
//! - Full backtest pipeline against a mock data port
//! - Known-outcome scenarios (clean round trip, end-of-data liquidation)
//! - Metric invariants across arbitrary series
//! - Monitor cycles: alert deduplication, reset, delivery failure
//! - Compression round trips
//! - Detector algebraic properties (proptest)

mod common;

use common::*;
use crosswatch::domain::backtest::{run as run_backtest, ExitReason};
use crosswatch::domain::compress;
use crosswatch::domain::error::CrosswatchError;
use crosswatch::domain::monitor::{run_cycle, MonitorParams};
use crosswatch::domain::signal::{detect_crossover, Signal};
use crosswatch::ports::data_port::{DataPort, Interval};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

fn monitor_params(symbol: &str) -> MonitorParams {
    MonitorParams {
        symbol: symbol.to_string(),
        short_window: 5,
        long_window: 20,
        lookback_days: 30,
    }
}

mod backtest_pipeline {
    use super::*;

    #[test]
    fn fetch_then_backtest_round_trip() {
        // rise then fall: one Buy, one Sell
        let closes = [
            100.0, 100.0, 100.0, 104.0, 108.0, 108.0, 104.0, 98.0, 94.0,
        ];
        let port = MockDataPort::new().with_closes("AAPL", &closes);

        let series = port
            .fetch_closes(
                "AAPL",
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
                Interval::Daily,
            )
            .unwrap();
        assert_eq!(series.len(), closes.len());

        let params = make_params("AAPL", 2, 3, 10_000.0);
        let run = run_backtest(&series, &params).unwrap();

        assert_eq!(run.trades.len(), 1);
        assert_eq!(run.trades[0].exit, ExitReason::Signal);
        assert_eq!(run.report.total_trades, 1);
    }

    #[test]
    fn clean_buy_sell_trade_accounting() {
        let closes = [
            100.0, 100.0, 100.0, 104.0, 108.0, 108.0, 104.0, 98.0, 94.0,
        ];
        let series = make_series(&closes);
        let params = make_params("AAPL", 2, 3, 10_000.0);
        let run = run_backtest(&series, &params).unwrap();

        let trade = &run.trades[0];
        // all-in entry: shares bought with the full initial capital
        assert!((trade.shares - 10_000.0 / trade.entry_price).abs() < 1e-9);
        assert!(
            (run.report.final_capital - trade.shares * trade.exit_price).abs() < 1e-9
        );
    }

    #[test]
    fn end_of_data_liquidation() {
        let closes = [100.0, 100.0, 100.0, 104.0, 108.0, 112.0, 116.0];
        let series = make_series(&closes);
        let params = make_params("AAPL", 2, 3, 10_000.0);
        let run = run_backtest(&series, &params).unwrap();

        assert_eq!(run.trades.len(), 1);
        let trade = &run.trades[0];
        assert_eq!(trade.exit, ExitReason::EndOfData);
        assert!((trade.exit_price - 116.0).abs() < f64::EPSILON);
        assert!((run.report.final_capital - trade.shares * 116.0).abs() < 1e-9);
    }

    #[test]
    fn data_port_error_aborts_before_simulation() {
        let port = MockDataPort::new().with_error("AAPL", "connection refused");
        let result = port.fetch_closes(
            "AAPL",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            Interval::Daily,
        );
        assert!(matches!(result, Err(CrosswatchError::Fetch { .. })));
    }

    #[test]
    fn unknown_symbol_is_no_data() {
        let port = MockDataPort::new();
        let result = port.fetch_closes(
            "NOSUCH",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            Interval::Daily,
        );
        assert!(matches!(result, Err(CrosswatchError::NoData { .. })));
    }
}

mod metric_invariants {
    use super::*;

    fn check_invariants(closes: &[f64]) {
        let series = make_series(closes);
        let params = make_params("TEST", 2, 3, 10_000.0);
        let run = run_backtest(&series, &params).unwrap();
        let report = &run.report;

        assert_eq!(
            report.winning_trades + report.losing_trades,
            report.total_trades
        );
        assert!(report.win_rate >= 0.0 && report.win_rate <= 100.0);
        assert!(report.max_drawdown_pct >= 0.0);
        assert_eq!(report.total_trades, run.trades.len());
    }

    #[test]
    fn invariants_hold_across_shapes() {
        let series_shapes: [&[f64]; 5] = [
            &[100.0, 100.0, 100.0, 104.0, 108.0, 108.0, 104.0, 98.0, 94.0],
            &[100.0; 15],
            &[100.0, 100.0, 100.0, 104.0, 108.0, 112.0, 116.0],
            &[108.0, 108.0, 108.0, 104.0, 100.0, 96.0, 92.0],
            &[
                100.0, 100.0, 100.0, 104.0, 108.0, 104.0, 100.0, 100.0, 104.0, 108.0,
                112.0,
            ],
        ];
        for closes in series_shapes {
            check_invariants(closes);
        }
    }

    #[test]
    fn drawdown_zero_for_monotonic_rise() {
        // Buy fires, then the position only appreciates
        let closes = [100.0, 100.0, 100.0, 104.0, 108.0, 112.0, 116.0, 120.0];
        let series = make_series(&closes);
        let params = make_params("TEST", 2, 3, 10_000.0);
        let run = run_backtest(&series, &params).unwrap();

        assert!((run.report.max_drawdown_pct - 0.0).abs() < f64::EPSILON);
    }
}

mod monitor_cycles {
    use super::*;

    fn buy_closes() -> Vec<f64> {
        let mut closes = vec![100.0; 23];
        closes.push(105.0);
        closes
    }

    #[test]
    fn full_cycle_against_mocks() {
        let data = MockDataPort::new().with_closes("AAPL", &buy_closes());
        let alerts = MockAlertPort::new();

        let report = run_cycle(&data, &alerts, &monitor_params("AAPL"), None).unwrap();

        assert_eq!(report.signal, Some(Signal::Buy));
        assert!(report.alerted);
        assert_eq!(alerts.sent_count(), 1);

        let sent = alerts.sent.borrow();
        assert_eq!(sent[0].symbol, "AAPL");
        assert!((sent[0].price - 105.0).abs() < f64::EPSILON);
    }

    #[test]
    fn repeated_signal_not_realerted() {
        let data = MockDataPort::new().with_closes("AAPL", &buy_closes());
        let alerts = MockAlertPort::new();
        let params = monitor_params("AAPL");

        let first = run_cycle(&data, &alerts, &params, None).unwrap();
        let second = run_cycle(&data, &alerts, &params, first.signal).unwrap();
        let third = run_cycle(&data, &alerts, &params, second.signal).unwrap();

        assert!(first.alerted);
        assert!(!second.alerted);
        assert!(!third.alerted);
        assert_eq!(alerts.sent_count(), 1);
    }

    #[test]
    fn quiet_cycle_resets_then_realerts() {
        let quiet_data = MockDataPort::new().with_closes("AAPL", &[100.0; 30]);
        let signal_data = MockDataPort::new().with_closes("AAPL", &buy_closes());
        let alerts = MockAlertPort::new();
        let params = monitor_params("AAPL");

        let first = run_cycle(&signal_data, &alerts, &params, None).unwrap();
        assert!(first.alerted);

        // signal disappears: previous resets to None
        let second = run_cycle(&quiet_data, &alerts, &params, first.signal).unwrap();
        assert_eq!(second.signal, None);

        // the crossover forms again: a fresh alert fires
        let third = run_cycle(&signal_data, &alerts, &params, second.signal).unwrap();
        assert!(third.alerted);
        assert_eq!(alerts.sent_count(), 2);
    }

    #[test]
    fn delivery_failure_does_not_change_state() {
        let data = MockDataPort::new().with_closes("AAPL", &buy_closes());
        let failing = MockAlertPort::failing();
        let params = monitor_params("AAPL");

        let report = run_cycle(&data, &failing, &params, None).unwrap();

        assert_eq!(report.signal, Some(Signal::Buy));
        assert!(!report.alerted);
        assert!(report.delivery_failed);
        assert_eq!(failing.sent_count(), 0);
    }

    #[test]
    fn fetch_error_skips_cycle() {
        let data = MockDataPort::new().with_error("AAPL", "timeout");
        let alerts = MockAlertPort::new();

        let result = run_cycle(&data, &alerts, &monitor_params("AAPL"), None);
        assert!(result.is_err());
        assert_eq!(alerts.sent_count(), 0);
    }
}

mod compression {
    use super::*;

    #[test]
    fn round_trip_over_fetched_series() {
        let closes = [150.23, 150.25, 150.24, 150.30, 149.98];
        let compressed = compress::compress(&closes).unwrap();
        let restored = compress::decompress(&compressed);

        for (restored, original) in restored.iter().zip(&closes) {
            assert!((restored - original).abs() < 1e-9);
        }
    }
}

proptest! {
    // the same 4-tuple can never yield both Buy and Sell
    #[test]
    fn detector_is_anti_symmetric(
        prev_short in -1e6_f64..1e6,
        prev_long in -1e6_f64..1e6,
        cur_short in -1e6_f64..1e6,
        cur_long in -1e6_f64..1e6,
    ) {
        let signal = detect_crossover(prev_short, prev_long, cur_short, cur_long);
        if signal == Some(Signal::Buy) {
            prop_assert!(prev_short <= prev_long && cur_short > cur_long);
            prop_assert!(!(prev_short >= prev_long && cur_short < cur_long));
        }
        if signal == Some(Signal::Sell) {
            prop_assert!(prev_short >= prev_long && cur_short < cur_long);
            prop_assert!(!(prev_short <= prev_long && cur_short > cur_long));
        }
    }

    // a flat series never produces a signal at any step
    #[test]
    fn flat_series_never_signals(value in 1.0_f64..10_000.0, len in 2usize..60) {
        let closes = vec![value; len];
        for short in 1usize..4 {
            for long in (short + 1)..6 {
                if closes.len() > long {
                    prop_assert_eq!(
                        crosswatch::domain::signal::detect_latest(&closes, short, long),
                        None
                    );
                }
            }
        }
    }

    // drawdown is non-negative for any backtest that runs
    #[test]
    fn drawdown_never_negative(closes in proptest::collection::vec(1.0_f64..1000.0, 5..40)) {
        let series = make_series(&closes);
        let params = make_params("PROP", 2, 3, 10_000.0);
        let run = run_backtest(&series, &params).unwrap();
        prop_assert!(run.report.max_drawdown_pct >= 0.0);
        prop_assert_eq!(
            run.report.winning_trades + run.report.losing_trades,
            run.report.total_trades
        );
    }
}

//! Single-cycle live monitoring.
//!
//! One cycle fetches the lookback window, classifies the latest crossover,
//! and emits an alert when a new signal differs from the previous one. The
//! cycle holds no state of its own; the previous signal is threaded by the
//! caller, which also owns the scheduling between cycles.

use chrono::{Duration, Utc};

use crate::domain::compress;
use crate::domain::error::CrosswatchError;
use crate::domain::indicator::{latest_snapshot, MaSnapshot};
use crate::domain::series;
use crate::domain::signal::{detect_latest, Signal};
use crate::ports::alert_port::{AlertPort, SignalAlert};
use crate::ports::data_port::{DataPort, Interval};

/// Parameters for the live monitor, validated before the loop starts.
#[derive(Debug, Clone)]
pub struct MonitorParams {
    pub symbol: String,
    pub short_window: usize,
    pub long_window: usize,
    pub lookback_days: i64,
}

/// What one cycle observed and did.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// The classification of the latest step; the caller's next `previous`.
    pub signal: Option<Signal>,
    pub snapshot: Option<MaSnapshot>,
    pub points_fetched: usize,
    /// An alert was handed to the port and accepted.
    pub alerted: bool,
    /// The port rejected the alert; signal state is unaffected.
    pub delivery_failed: bool,
    pub compression_ratio: Option<f64>,
}

/// Run one monitoring cycle.
///
/// Alerts fire only when `signal` is `Some` and differs from `previous`.
/// Delivery failure is reported but does not change the returned signal.
pub fn run_cycle(
    data: &dyn DataPort,
    alerts: &dyn AlertPort,
    params: &MonitorParams,
    previous: Option<Signal>,
) -> Result<CycleReport, CrosswatchError> {
    let end = Utc::now();
    let start = end - Duration::days(params.lookback_days);

    let prices = data.fetch_closes(&params.symbol, start, end, Interval::FiveMinute)?;
    if prices.is_empty() {
        return Err(CrosswatchError::NoData {
            symbol: params.symbol.clone(),
        });
    }

    let closes = series::closes(&prices);
    let compression_ratio = compress::compress(&closes)
        .map(|c| compress::compression_ratio(closes.len(), &c));

    let signal = detect_latest(&closes, params.short_window, params.long_window);
    let snapshot = latest_snapshot(&closes, params.short_window, params.long_window);

    let mut alerted = false;
    let mut delivery_failed = false;

    if let Some(new_signal) = signal {
        if previous != Some(new_signal) {
            let alert = SignalAlert {
                symbol: params.symbol.clone(),
                signal: new_signal,
                price: closes.last().copied().unwrap_or_default(),
                snapshot,
                at: Utc::now(),
            };
            match alerts.send(&alert) {
                Ok(()) => alerted = true,
                Err(_) => delivery_failed = true,
            }
        }
    }

    Ok(CycleReport {
        signal,
        snapshot,
        points_fetched: prices.len(),
        alerted,
        delivery_failed,
        compression_ratio,
    })
}

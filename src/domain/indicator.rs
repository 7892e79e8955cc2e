//! Simple moving average calculation.
//!
//! An SMA of window W smooths a close series by averaging the trailing W
//! values at each index. The first W-1 indices have no defined value.

use crate::domain::error::CrosswatchError;
use crate::domain::series::PricePoint;
use chrono::{DateTime, Utc};

/// A price point annotated with both moving averages. Keeping the close and
/// the optional MA values in one record keeps the alignment between the
/// three series correct by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct MaBar {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub short_ma: Option<f64>,
    pub long_ma: Option<f64>,
}

/// Latest defined MA values alongside the latest close, for display and
/// alert payloads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaSnapshot {
    pub short_ma: f64,
    pub long_ma: f64,
    pub current_price: f64,
}

/// Compute the simple moving average of `closes` over `window` periods.
///
/// The result has the same length as the input; index i is `None` for
/// i < window-1 and otherwise holds the mean of the trailing `window`
/// closes ending at i.
pub fn sma(closes: &[f64], window: usize) -> Result<Vec<Option<f64>>, CrosswatchError> {
    if window == 0 {
        return Err(CrosswatchError::InvalidWindow);
    }
    if closes.len() < window {
        return Err(CrosswatchError::InsufficientData {
            have: closes.len(),
            need: window,
        });
    }

    let mut values: Vec<Option<f64>> = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        if i < window - 1 {
            values.push(None);
        } else {
            let sum: f64 = closes[i + 1 - window..=i].iter().sum();
            values.push(Some(sum / window as f64));
        }
    }

    Ok(values)
}

/// Annotate a price series with short and long moving averages.
pub fn with_moving_averages(
    series: &[PricePoint],
    short_window: usize,
    long_window: usize,
) -> Result<Vec<MaBar>, CrosswatchError> {
    let closes: Vec<f64> = series.iter().map(|p| p.close).collect();
    let short = sma(&closes, short_window)?;
    let long = sma(&closes, long_window)?;

    Ok(series
        .iter()
        .zip(short)
        .zip(long)
        .map(|((point, short_ma), long_ma)| MaBar {
            timestamp: point.timestamp,
            close: point.close,
            short_ma,
            long_ma,
        })
        .collect())
}

/// Latest short/long MA values and close for a raw close series.
///
/// Returns `None` when fewer than `long_window` points exist or either
/// latest value is undefined or non-finite.
pub fn latest_snapshot(
    closes: &[f64],
    short_window: usize,
    long_window: usize,
) -> Option<MaSnapshot> {
    if closes.len() < long_window {
        return None;
    }

    let short = sma(closes, short_window).ok()?;
    let long = sma(closes, long_window).ok()?;

    let short_ma = short.last().copied().flatten()?;
    let long_ma = long.last().copied().flatten()?;
    let current_price = *closes.last()?;

    if !short_ma.is_finite() || !long_ma.is_finite() {
        return None;
    }

    Some(MaSnapshot {
        short_ma,
        long_ma,
        current_price,
    })
}

//! Price series representation.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One closing price at one point in time. Series are strictly
/// time-ordered with no duplicate timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Self {
        PricePoint { timestamp, close }
    }
}

/// Extract the closing prices of a series in order.
pub fn closes(series: &[PricePoint]) -> Vec<f64> {
    series.iter().map(|p| p.close).collect()
}

/// True when timestamps are strictly increasing.
pub fn is_time_ordered(series: &[PricePoint]) -> bool {
    series.windows(2).all(|w| w[0].timestamp < w[1].timestamp)
}

//! Market data access port trait.

use crate::domain::error::CrosswatchError;
use crate::domain::series::PricePoint;
use chrono::{DateTime, Utc};

/// Bar spacing of a fetched series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    FiveMinute,
    Daily,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::FiveMinute => "5m",
            Interval::Daily => "1d",
        }
    }
}

/// Supplier of time-ordered, duplicate-free closing prices.
///
/// An empty result is the `NoData` error, never a zero-length success.
pub trait DataPort {
    fn fetch_closes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<PricePoint>, CrosswatchError>;

    fn fetch_latest_price(&self, symbol: &str) -> Result<f64, CrosswatchError>;
}

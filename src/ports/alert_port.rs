//! Alert notification port trait.

use crate::domain::error::CrosswatchError;
use crate::domain::indicator::MaSnapshot;
use crate::domain::signal::Signal;
use chrono::{DateTime, Utc};

/// A signal notification to deliver. Emitted only when a newly computed
/// signal differs from the last one announced for the symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalAlert {
    pub symbol: String,
    pub signal: Signal,
    pub price: f64,
    pub snapshot: Option<MaSnapshot>,
    pub at: DateTime<Utc>,
}

/// Sink for signal notifications. Delivery failure must not affect
/// the caller's signal state.
pub trait AlertPort {
    fn send(&self, alert: &SignalAlert) -> Result<(), CrosswatchError>;
}

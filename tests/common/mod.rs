#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use crosswatch::domain::backtest::BacktestParams;
use crosswatch::domain::error::CrosswatchError;
pub use crosswatch::domain::series::PricePoint;
use crosswatch::ports::alert_port::{AlertPort, SignalAlert};
use crosswatch::ports::data_port::{DataPort, Interval};
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_closes(mut self, symbol: &str, closes: &[f64]) -> Self {
        self.data.insert(symbol.to_string(), make_series(closes));
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_closes(
        &self,
        symbol: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _interval: Interval,
    ) -> Result<Vec<PricePoint>, CrosswatchError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(CrosswatchError::Fetch {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(points) if !points.is_empty() => Ok(points.clone()),
            _ => Err(CrosswatchError::NoData {
                symbol: symbol.to_string(),
            }),
        }
    }

    fn fetch_latest_price(&self, symbol: &str) -> Result<f64, CrosswatchError> {
        self.data
            .get(symbol)
            .and_then(|points| points.last())
            .map(|p| p.close)
            .ok_or_else(|| CrosswatchError::NoData {
                symbol: symbol.to_string(),
            })
    }
}

pub struct MockAlertPort {
    pub sent: RefCell<Vec<SignalAlert>>,
    pub fail: bool,
}

impl MockAlertPort {
    pub fn new() -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.borrow().len()
    }
}

impl AlertPort for MockAlertPort {
    fn send(&self, alert: &SignalAlert) -> Result<(), CrosswatchError> {
        if self.fail {
            return Err(CrosswatchError::AlertDelivery {
                reason: "mock failure".into(),
            });
        }
        self.sent.borrow_mut().push(alert.clone());
        Ok(())
    }
}

/// Evenly spaced series starting 2024-01-01, one point per day.
pub fn make_series(closes: &[f64]) -> Vec<PricePoint> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PricePoint::new(base + Duration::days(i as i64), c))
        .collect()
}

pub fn make_params(symbol: &str, short: usize, long: usize, capital: f64) -> BacktestParams {
    BacktestParams {
        symbol: symbol.to_string(),
        short_window: short,
        long_window: long,
        initial_capital: capital,
    }
}

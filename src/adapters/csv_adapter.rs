//! CSV file data adapter.
//!
//! Reads `<SYMBOL>.csv` files with `timestamp,close` rows (RFC 3339
//! timestamps) from a base directory. Used for offline backtests and test
//! fixtures.

use crate::domain::error::CrosswatchError;
use crate::domain::series::PricePoint;
use crate::ports::data_port::{DataPort, Interval};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_closes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        _interval: Interval,
    ) -> Result<Vec<PricePoint>, CrosswatchError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| CrosswatchError::Fetch {
            symbol: symbol.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut points = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| CrosswatchError::Fetch {
                symbol: symbol.to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;

            let ts_str = record.get(0).ok_or_else(|| CrosswatchError::Fetch {
                symbol: symbol.to_string(),
                reason: "missing timestamp column".into(),
            })?;
            let timestamp = DateTime::parse_from_rfc3339(ts_str)
                .map_err(|e| CrosswatchError::Fetch {
                    symbol: symbol.to_string(),
                    reason: format!("invalid timestamp: {}", e),
                })?
                .with_timezone(&Utc);

            if timestamp < start || timestamp > end {
                continue;
            }

            let close: f64 = record
                .get(1)
                .ok_or_else(|| CrosswatchError::Fetch {
                    symbol: symbol.to_string(),
                    reason: "missing close column".into(),
                })?
                .parse()
                .map_err(|e| CrosswatchError::Fetch {
                    symbol: symbol.to_string(),
                    reason: format!("invalid close value: {}", e),
                })?;

            points.push(PricePoint::new(timestamp, close));
        }

        if points.is_empty() {
            return Err(CrosswatchError::NoData {
                symbol: symbol.to_string(),
            });
        }

        points.sort_by_key(|p| p.timestamp);
        Ok(points)
    }

    fn fetch_latest_price(&self, symbol: &str) -> Result<f64, CrosswatchError> {
        let points = self.fetch_closes(
            symbol,
            DateTime::<Utc>::MIN_UTC,
            DateTime::<Utc>::MAX_UTC,
            Interval::Daily,
        )?;
        points
            .last()
            .map(|p| p.close)
            .ok_or_else(|| CrosswatchError::NoData {
                symbol: symbol.to_string(),
            })
    }
}

//! JSON report adapter.
//!
//! Writes a backtest run as a pretty-printed JSON document: run parameters,
//! aggregate report, and the full trade log.

use crate::domain::backtest::{BacktestParams, BacktestRun};
use crate::domain::error::CrosswatchError;
use crate::ports::report_port::ReportPort;
use serde_json::json;
use std::fs;

pub struct JsonReportAdapter;

impl JsonReportAdapter {
    fn document(run: &BacktestRun, params: &BacktestParams) -> serde_json::Value {
        json!({
            "symbol": params.symbol,
            "short_window": params.short_window,
            "long_window": params.long_window,
            "initial_capital": params.initial_capital,
            "report": run.report,
            "trades": run.trades,
        })
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        run: &BacktestRun,
        params: &BacktestParams,
        output_path: &str,
    ) -> Result<(), CrosswatchError> {
        let document = Self::document(run, params);
        let content = serde_json::to_string_pretty(&document).map_err(|e| {
            CrosswatchError::Io(std::io::Error::other(e))
        })?;
        fs::write(output_path, content)?;
        Ok(())
    }
}

//! Report generation port trait.

use crate::domain::backtest::{BacktestParams, BacktestRun};
use crate::domain::error::CrosswatchError;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        run: &BacktestRun,
        params: &BacktestParams,
        output_path: &str,
    ) -> Result<(), CrosswatchError>;
}

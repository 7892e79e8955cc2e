//! Concrete adapter implementations for ports.

pub mod file_config_adapter;
pub mod yahoo_adapter;
pub mod csv_adapter;
pub mod discord_adapter;
pub mod alert_log_adapter;
pub mod json_report_adapter;

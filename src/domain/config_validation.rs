//! Configuration validation.
//!
//! Runs before any data fetch or simulation; invalid combinations are
//! rejected with a descriptive reason.

use crate::domain::error::CrosswatchError;
use crate::ports::config_port::ConfigPort;

pub fn validate_monitor_config(config: &dyn ConfigPort) -> Result<(), CrosswatchError> {
    validate_symbol(config)?;
    validate_windows(config)?;
    validate_positive_int(config, "monitor", "fetch_interval_minutes", 5)?;
    validate_positive_int(config, "monitor", "lookback_days", 30)?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), CrosswatchError> {
    validate_symbol(config)?;
    validate_windows(config)?;
    validate_positive_int(config, "backtest", "period_months", 6)?;
    validate_initial_capital(config)?;
    Ok(())
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), CrosswatchError> {
    match config.get_string("monitor", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(CrosswatchError::ConfigMissing {
            section: "monitor".to_string(),
            key: "symbol".to_string(),
        }),
    }
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), CrosswatchError> {
    let short = config.get_int("strategy", "short_window", 5);
    let long = config.get_int("strategy", "long_window", 20);

    if short <= 0 {
        return Err(CrosswatchError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "short_window".to_string(),
            reason: "short_window must be positive".to_string(),
        });
    }
    if long <= 0 {
        return Err(CrosswatchError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "long_window".to_string(),
            reason: "long_window must be positive".to_string(),
        });
    }
    if short >= long {
        return Err(CrosswatchError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "short_window".to_string(),
            reason: format!("short_window ({short}) must be less than long_window ({long})"),
        });
    }
    Ok(())
}

fn validate_positive_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<(), CrosswatchError> {
    let value = config.get_int(section, key, default);
    if value <= 0 {
        return Err(CrosswatchError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{key} must be positive"),
        });
    }
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), CrosswatchError> {
    let value = config.get_double("backtest", "initial_capital", 10_000.0);
    if value <= 0.0 {
        return Err(CrosswatchError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be positive".to_string(),
        });
    }
    Ok(())
}

//! Domain error types.

/// Top-level error type for crosswatch.
#[derive(Debug, thiserror::Error)]
pub enum CrosswatchError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("moving average window must be positive")]
    InvalidWindow,

    #[error("insufficient data: have {have} points, need {need}")]
    InsufficientData { have: usize, need: usize },

    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error("failed to fetch data for {symbol}: {reason}")]
    Fetch { symbol: String, reason: String },

    #[error("alert delivery failed: {reason}")]
    AlertDelivery { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&CrosswatchError> for std::process::ExitCode {
    fn from(err: &CrosswatchError) -> Self {
        let code: u8 = match err {
            CrosswatchError::Io(_) => 1,
            CrosswatchError::ConfigParse { .. }
            | CrosswatchError::ConfigMissing { .. }
            | CrosswatchError::ConfigInvalid { .. }
            | CrosswatchError::InvalidWindow => 2,
            CrosswatchError::Fetch { .. } => 3,
            CrosswatchError::AlertDelivery { .. } => 4,
            CrosswatchError::NoData { .. } | CrosswatchError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

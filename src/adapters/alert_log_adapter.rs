//! Append-only alert journal.
//!
//! Keeps a durable record of every emitted signal, one line per alert.

use crate::domain::error::CrosswatchError;
use crate::ports::alert_port::{AlertPort, SignalAlert};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

pub struct AlertLogAdapter {
    path: PathBuf,
}

impl AlertLogAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl AlertPort for AlertLogAdapter {
    fn send(&self, alert: &SignalAlert) -> Result<(), CrosswatchError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        writeln!(
            file,
            "[{}] {} - {} signal at ${:.2}",
            alert.at.format("%Y-%m-%d %H:%M:%S"),
            alert.symbol,
            alert.signal,
            alert.price,
        )?;

        Ok(())
    }
}

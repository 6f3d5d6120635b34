//! Append-only audit log of failed apply attempts.
//!
//! The file is opened fresh for every append and never truncated or read
//! back by the tool.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use crate::domain::{AppError, DeviceRecord, FailureKind, Result};

/// Handle on the audit log file.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append the marker that opens a new run.
    ///
    /// # Errors
    /// Returns error if the log cannot be opened or written.
    pub fn start_session(&self) -> Result<()> {
        let stamp = Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false);
        self.append(&format!(
            "\n\n=== New configuration session started {stamp} ===\n"
        ))
    }

    /// Append one `kind,location,ip,detail` line.
    ///
    /// # Errors
    /// Returns error if the log cannot be opened or written.
    pub fn record_failure(
        &self,
        kind: FailureKind,
        device: &DeviceRecord,
        detail: &str,
    ) -> Result<()> {
        self.append(&format!(
            "{kind},{},{},{}\n",
            device.location,
            device.ip,
            single_line(detail)
        ))
    }

    fn append(&self, text: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                AppError::io(format!("Failed to open audit log: {}", self.path.display()), e)
            })?;

        file.write_all(text.as_bytes())
            .map_err(|e| AppError::io("Failed to write audit log", e))
    }
}

/// Fold a multi-line tool message so one failure stays one log line.
fn single_line(detail: &str) -> String {
    detail
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

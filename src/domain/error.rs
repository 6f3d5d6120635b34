//! Domain-level error types for oob-readdress.
//!
//! Only startup and persistence problems are errors. Per-device failures
//! are reported as [`ApplyOutcome`](super::ApplyOutcome) values instead.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Device table not found at the expected location.
    #[error("input file {file} not found in directory {}", .dir.display())]
    InputNotFound { file: String, dir: PathBuf },

    /// Device table exists but could not be parsed.
    #[error("failed to parse {}: {message}", .path.display())]
    InputParse { path: PathBuf, message: String },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create an input parse error from a csv error.
    pub fn input_parse(path: impl Into<PathBuf>, err: &csv::Error) -> Self {
        let message = match err.position() {
            Some(pos) => format!("row {}: {err}", pos.line()),
            None => err.to_string(),
        };
        Self::InputParse {
            path: path.into(),
            message,
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

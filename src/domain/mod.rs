//! Domain layer - core types for a re-addressing run.
//!
//! Pure data and error types without any I/O.

pub mod config;
pub mod error;
pub mod models;

pub use config::{AppConfig, CredentialConfig, ToolConfig};
pub use error::{AppError, Result};
pub use models::{ApplyOutcome, DeviceList, DeviceRecord, FailureKind};

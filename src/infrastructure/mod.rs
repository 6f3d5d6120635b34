//! Infrastructure layer - external adapters (files, OOB tool).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod audit_log;
pub mod config;
pub mod device_list;
pub mod ipmi;
pub mod progress_store;

pub use audit_log::AuditLog;
pub use config::{executable_dir, load_config};
pub use device_list::load_devices;
pub use ipmi::{Configurator, IpmiInvoker};
pub use progress_store::ProgressStore;

//! Application layer - the operator session.
//!
//! Drives the device list through the infrastructure adapters.

pub mod formatter;
pub mod session;

pub use session::Session;

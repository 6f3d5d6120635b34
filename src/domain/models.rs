//! Domain models for a re-addressing run.
//!
//! A run is an ordered list of devices plus the outcome of applying
//! each device's new network settings.

use serde::Deserialize;

/// One management controller to re-address.
///
/// Addresses are kept exactly as read from the input table and passed
/// through to the OOB tool unvalidated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceRecord {
    /// Human location label (rack/slot), used for display and audit only.
    #[serde(rename = "位置标签", alias = "location")]
    pub location: String,

    /// Address the controller answers on today.
    pub current_ip: String,

    /// New static address.
    pub ip: String,

    /// New subnet mask.
    pub netmask: String,

    /// New default gateway.
    pub gateway: String,
}

/// Ordered devices for one run. Order defines processing order.
pub type DeviceList = Vec<DeviceRecord>;

/// Why an apply attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The tool ran and exited non-zero.
    ToolRejected,
    /// The tool could not be run to completion (missing, timed out, I/O).
    InvocationFault,
}

impl FailureKind {
    /// Label written to the audit log.
    #[must_use]
    pub const fn audit_label(self) -> &'static str {
        match self {
            Self::ToolRejected => "Failed",
            Self::InvocationFault => "Error",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.audit_label())
    }
}

/// Result of applying one device's configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Success,
    Failure { kind: FailureKind, detail: String },
}

impl ApplyOutcome {
    /// Create a failure outcome.
    pub fn failure(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

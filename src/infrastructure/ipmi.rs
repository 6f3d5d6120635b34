//! OOB tool invocation.
//!
//! Runs the external management tool against a device's current address
//! and tells it to switch the controller to the device's new static
//! network settings.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::domain::{ApplyOutcome, CredentialConfig, DeviceRecord, FailureKind, ToolConfig};

use super::audit_log::AuditLog;

/// How long to wait for pipe readers once the tool has exited.
const PIPE_GRACE: Duration = Duration::from_secs(1);

/// Applies one device's new network configuration.
pub trait Configurator {
    fn apply(&self, device: &DeviceRecord) -> ApplyOutcome;
}

/// [`Configurator`] backed by an `ipmitool`-compatible command.
///
/// Failures are appended to the audit log before being returned.
pub struct IpmiInvoker {
    credentials: CredentialConfig,
    tool: ToolConfig,
    audit: AuditLog,
}

impl IpmiInvoker {
    #[must_use]
    pub const fn new(credentials: CredentialConfig, tool: ToolConfig, audit: AuditLog) -> Self {
        Self {
            credentials,
            tool,
            audit,
        }
    }

    /// Arguments passed to the tool for `device`.
    #[must_use]
    pub fn command_args(&self, device: &DeviceRecord) -> Vec<String> {
        [
            "-H",
            device.current_ip.as_str(),
            "-U",
            self.credentials.username.as_str(),
            "-P",
            self.credentials.password.as_str(),
            "lan",
            "set",
            "ipsrc",
            "static",
            device.ip.as_str(),
            device.netmask.as_str(),
            device.gateway.as_str(),
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    fn run(&self, device: &DeviceRecord) -> ApplyOutcome {
        let program = &self.tool.program;

        tracing::debug!(
            program = %program,
            host = %device.current_ip,
            user = %self.credentials.username,
            ip = %device.ip,
            netmask = %device.netmask,
            gateway = %device.gateway,
            "Invoking OOB tool"
        );

        let spawned = Command::new(program)
            .args(self.command_args(device))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                return ApplyOutcome::failure(
                    FailureKind::InvocationFault,
                    format!("failed to start {program}: {e}"),
                );
            }
        };

        // Read both pipes during the wait; a full pipe would stall the tool.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match child.wait_timeout(self.tool.timeout()) {
            Ok(Some(status)) => status,
            Ok(None) => {
                reap(&mut child);
                return ApplyOutcome::failure(
                    FailureKind::InvocationFault,
                    format!("{program} timed out after {}s", self.tool.timeout_secs),
                );
            }
            Err(e) => {
                reap(&mut child);
                return ApplyOutcome::failure(
                    FailureKind::InvocationFault,
                    format!("failed waiting for {program}: {e}"),
                );
            }
        };

        if let Some(rx) = stdout {
            let out = collect(&rx);
            tracing::trace!(bytes = out.len(), "Tool stdout captured");
        }

        if status.success() {
            return ApplyOutcome::Success;
        }

        let stderr = stderr.map(|rx| collect(&rx)).unwrap_or_default();
        let detail = if stderr.trim().is_empty() {
            status.to_string()
        } else {
            stderr
        };

        ApplyOutcome::failure(FailureKind::ToolRejected, detail)
    }
}

impl Configurator for IpmiInvoker {
    fn apply(&self, device: &DeviceRecord) -> ApplyOutcome {
        let outcome = self.run(device);

        match &outcome {
            ApplyOutcome::Success => {
                tracing::info!(location = %device.location, ip = %device.ip, "Configuration applied");
            }
            ApplyOutcome::Failure { kind, detail } => {
                tracing::info!(location = %device.location, kind = %kind, detail = %detail.trim(), "Configuration failed");
                if let Err(e) = self.audit.record_failure(*kind, device, detail) {
                    tracing::warn!("Could not write audit entry: {}", e);
                }
            }
        }

        outcome
    }
}

/// Kill a child that overran or faulted, and collect its exit status.
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!("Failed to kill tool process: {}", e);
    }
    if let Err(e) = child.wait() {
        tracing::debug!("Failed to reap tool process: {}", e);
    }
}

/// Read `pipe` to the end on a helper thread, delivering the text once.
fn drain(mut pipe: impl Read + Send + 'static) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut buf) {
            tracing::debug!("Failed to read tool output: {}", e);
        }
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// Captured output of an exited tool. A grandchild still holding the
/// pipe open must not stall the session, so the wait is bounded.
fn collect(rx: &Receiver<String>) -> String {
    rx.recv_timeout(PIPE_GRACE).unwrap_or_else(|_| {
        tracing::debug!("Tool output still open after exit, ignoring it");
        String::new()
    })
}

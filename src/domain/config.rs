//! Run configuration.
//!
//! Built once at startup and handed to the components that need it:
//! credentials and tool settings go to the invoker, paths go to the
//! loader, progress store and audit log.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Credential pair passed through to the OOB tool.
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_password")]
    pub password: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
        }
    }
}

impl std::fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

fn default_username() -> String {
    "admin".into()
}

fn default_password() -> String {
    "password".into()
}

/// External OOB tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Program name or path of the OOB tool.
    #[serde(default = "default_program")]
    pub program: String,

    /// Upper bound on one tool invocation, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_program() -> String {
    "ipmitool".into()
}

const fn default_timeout_secs() -> u64 {
    10
}

impl ToolConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// File locations. Relative paths are resolved against the directory
/// holding the executable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    /// Device table (CSV).
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Progress file holding the cursor.
    #[serde(default = "default_state")]
    pub state: PathBuf,

    /// Append-only audit log of failed attempts.
    #[serde(default = "default_log")]
    pub log: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            state: default_state(),
            log: default_log(),
        }
    }
}

fn default_input() -> PathBuf {
    PathBuf::from("ip1.csv")
}

fn default_state() -> PathBuf {
    PathBuf::from("progress.state")
}

fn default_log() -> PathBuf {
    PathBuf::from("ip_config.log")
}

impl PathConfig {
    /// Make every relative path absolute under `base`.
    #[must_use]
    pub fn resolved_against(&self, base: &Path) -> Self {
        let resolve = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                base.join(p)
            }
        };
        Self {
            input: resolve(&self.input),
            state: resolve(&self.state),
            log: resolve(&self.log),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub credentials: CredentialConfig,

    #[serde(default)]
    pub tool: ToolConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

//! Configuration file management.
//!
//! Handles locating and loading the optional TOML configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppConfig, AppError, Result};

/// Configuration file name looked up beside the executable.
pub const CONFIG_FILE_NAME: &str = "oob-readdress.toml";

/// Directory holding the running executable.
///
/// # Errors
/// Returns error if the executable path cannot be determined.
pub fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()
        .map_err(|e| AppError::io("Failed to get executable path", e))?;

    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| AppError::Config {
            message: format!("Executable has no parent directory: {}", exe.display()),
        })
}

/// Load configuration and resolve its paths against `base_dir`.
///
/// An explicit path must exist. Otherwise the file beside the executable
/// wins over the per-user one, and defaults apply when neither exists.
///
/// # Errors
/// Returns error if a chosen file cannot be read or parsed.
pub fn load_config(explicit: Option<&Path>, base_dir: &Path) -> Result<AppConfig> {
    let mut config = match explicit {
        Some(path) => load_config_from_file(path)?,
        None => match find_config_file(base_dir) {
            Some(path) => load_config_from_file(&path)?,
            None => {
                tracing::debug!("No configuration file found, using defaults");
                AppConfig::default()
            }
        },
    };

    config.paths = config.paths.resolved_against(base_dir);
    Ok(config)
}

fn find_config_file(base_dir: &Path) -> Option<PathBuf> {
    let local = base_dir.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("oob-readdress").join("config.toml"))
        .filter(|p| p.is_file())
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    tracing::debug!(path = %path.display(), "Loading configuration");

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file {}: {e}", path.display()),
    })
}

//! Device table reader.
//!
//! Reads the CSV device table into an ordered [`DeviceList`]. Columns are
//! matched by header name, so their order in the file does not matter.

use std::fs;
use std::path::Path;

use crate::domain::{AppError, DeviceList, DeviceRecord, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Load the device table at `path`.
///
/// # Errors
/// Returns [`AppError::InputNotFound`] if the file does not exist, and
/// [`AppError::InputParse`] if a row cannot be read.
pub fn load_devices(path: &Path) -> Result<DeviceList> {
    if !path.is_file() {
        return Err(AppError::InputNotFound {
            file: path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
            dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
        });
    }

    let bytes = fs::read(path)
        .map_err(|e| AppError::io(format!("Failed to read {}", path.display()), e))?;

    let devices = parse_devices(&bytes).map_err(|e| AppError::input_parse(path, &e))?;
    tracing::debug!(path = %path.display(), count = devices.len(), "Loaded device table");

    Ok(devices)
}

/// Parse CSV bytes into device records, preserving row order.
pub fn parse_devices(bytes: &[u8]) -> std::result::Result<DeviceList, csv::Error> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body)
        .deserialize::<DeviceRecord>()
        .collect()
}

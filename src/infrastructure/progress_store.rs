//! Cursor persistence.
//!
//! The cursor is stored as decimal text in a small file. A missing or
//! corrupt file means "start from the beginning".

use std::fs;
use std::path::PathBuf;

use crate::domain::{AppError, Result};

/// File-backed store for the index of the next device to process.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the stored cursor, or 0 if there is none.
    #[must_use]
    pub fn load(&self) -> usize {
        match fs::read_to_string(&self.path) {
            Ok(content) => content.trim().parse().unwrap_or_else(|_| {
                tracing::debug!(path = %self.path.display(), "Progress file unparsable, starting at 0");
                0
            }),
            Err(_) => 0,
        }
    }

    /// Overwrite the stored cursor.
    ///
    /// # Errors
    /// Returns error if the file cannot be written.
    pub fn save(&self, cursor: usize) -> Result<()> {
        fs::write(&self.path, cursor.to_string()).map_err(|e| {
            AppError::io(
                format!("Failed to write progress file: {}", self.path.display()),
                e,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = ProgressStore::new(dir.path().join("progress.state"));

        for k in [0, 1, 7, 4096] {
            store.save(k).unwrap();
            assert_eq!(store.load(), k);
        }
    }

    #[test]
    fn test_survives_new_instance() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.state");

        ProgressStore::new(&path).save(42).unwrap();

        assert_eq!(ProgressStore::new(&path).load(), 42);
    }

    #[test]
    fn test_absent_file_is_zero() {
        let dir = tempdir().unwrap();
        let store = ProgressStore::new(dir.path().join("missing.state"));
        assert_eq!(store.load(), 0);
    }

    #[test]
    fn test_corrupt_file_is_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.state");
        let store = ProgressStore::new(&path);

        for content in ["abc", "", "-3", "1.5"] {
            fs::write(&path, content).unwrap();
            assert_eq!(store.load(), 0, "content {content:?}");
        }
    }

    #[test]
    fn test_whitespace_tolerated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.state");
        fs::write(&path, " 12\n").unwrap();

        assert_eq!(ProgressStore::new(&path).load(), 12);
    }

    #[test]
    fn test_save_into_missing_dir_is_error() {
        let dir = tempdir().unwrap();
        let store = ProgressStore::new(dir.path().join("no/such/dir/progress.state"));
        assert!(store.save(1).is_err());
    }
}

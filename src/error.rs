//! # Error Handling
//!
//! This module defines the centralized error type for the merge engine. It
//! uses the `thiserror` library to describe every failure mode with enough
//! context to act on it.
//!
//! ## Fatal and non-fatal errors
//!
//! Only a handful of variants abort a merge run:
//!
//! - [`Error::Access`]: a BASE or SOURCE root is missing or is not a directory.
//! - [`Error::InvalidLayout`]: the requested roots overlap or the run options
//!   are incompatible.
//! - [`Error::ConfigParse`]: the YAML run configuration could not be parsed.
//! - [`Error::Cancelled`]: the run was cancelled between file operations.
//!
//! Per-file failures ([`Error::Read`], [`Error::Write`]) are produced by the
//! lower layers but are converted into per-path outcomes by the classifier and
//! the executor, so they never stop a run. A deferred cleanup is not an error
//! at all; see [`crate::filesystem::Removal::Deferred`].

use std::path::Path;

use thiserror::Error;

/// Main error type for merge-wizard operations
#[derive(Error, Debug)]
pub enum Error {
    /// A root directory is missing, unreadable or not a directory.
    #[error("Cannot access '{path}': {message}")]
    Access { path: String, message: String },

    /// A single file could not be read.
    #[error("Failed to read '{path}': {message}")]
    Read { path: String, message: String },

    /// A single file could not be written or removed.
    #[error("Failed to write '{path}': {message}")]
    Write { path: String, message: String },

    /// A tree-level filesystem operation failed.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An error occurred while parsing the run configuration file.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The combination of roots and options cannot produce a valid run.
    #[error("Invalid merge layout: {message}")]
    InvalidLayout { message: String },

    /// The run was cancelled before it could finish.
    #[error("Merge run cancelled")]
    Cancelled,

    /// The worker pool for per-file merging could not be started.
    #[error("Worker pool error: {message}")]
    WorkerPool { message: String },

    /// An error indicating that a mutex has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

impl Error {
    pub(crate) fn access(path: &Path, message: impl Into<String>) -> Self {
        Error::Access {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn read(path: &Path, err: &std::io::Error) -> Self {
        Error::Read {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn write(path: &Path, err: &std::io::Error) -> Self {
        Error::Write {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_display_access() {
        let error = Error::access(&PathBuf::from("/missing/base"), "not a directory");
        let display = format!("{}", error);
        assert!(display.contains("Cannot access"));
        assert!(display.contains("/missing/base"));
        assert!(display.contains("not a directory"));
    }

    #[test]
    fn test_error_display_config_parse_with_hint() {
        let error = Error::ConfigParse {
            message: "unknown mode 'merge'".to_string(),
            hint: Some("Use 'diff' or 'additions'".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration parsing error"));
        assert!(display.contains("hint:"));
        assert!(display.contains("'additions'"));
    }

    #[test]
    fn test_error_display_write() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = Error::write(&PathBuf::from("out/a.txt"), &io);
        let display = format!("{}", error);
        assert!(display.contains("Failed to write 'out/a.txt'"));
        assert!(display.contains("denied"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }
}

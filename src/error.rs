//! Error taxonomy for the backup pipeline.
//!
//! Configuration and not-found errors are fatal and surface before any store
//! I/O. Per-file upload failures are not represented here: they are collected
//! into the batch report instead of aborting the run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type used throughout the library.
pub type BackupResult<T> = Result<T, BackupError>;

/// Errors produced by the backup pipeline.
#[derive(Debug, Error)]
pub enum BackupError {
    /// Missing or invalid settings, detected before any I/O.
    #[error("invalid configuration: {field}: {reason}")]
    Config {
        /// Settings field that failed validation.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// A required path (source folder, credentials file) does not exist.
    #[error("path not found: {}", path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },
    /// Filesystem failures while snapshotting or cleaning up.
    #[error("{operation} failed for {}: {source}", path.display())]
    Io {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Directory traversal failures.
    #[error("directory walk failed under {}: {source}", path.display())]
    Walk {
        /// Root of the walk.
        path: PathBuf,
        /// Underlying walkdir error.
        source: walkdir::Error,
    },
}

impl BackupError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Config {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn walk(path: impl Into<PathBuf>, source: walkdir::Error) -> Self {
        Self::Walk {
            path: path.into(),
            source,
        }
    }
}

//! Error types for the file module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while operating on a lockable file.
#[derive(Debug, Error)]
pub enum FileError {
    /// The lock artifact already exists; another worker owns the file.
    #[error("File is locked: {path}")]
    Locked { path: PathBuf },

    /// The path has no final component to derive sidecar names from.
    #[error("Path has no file name: {path}")]
    NoFileName { path: PathBuf },

    /// Failed to create the destination directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to rename the file into its destination.
    #[error("Failed to move file from {from} to {to}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Any other I/O failure on the file or one of its sidecars.
    #[error("Failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileError {
    /// Creates an I/O error for the given operation.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Whether this error signals lock contention rather than a real failure.
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }
}

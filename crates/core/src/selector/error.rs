//! Error types for the selector module.

use std::path::PathBuf;
use thiserror::Error;

use crate::file::FileError;

/// Errors that end a selection attempt.
///
/// Lock contention is absent on purpose: it is retried inside the selector.
#[derive(Debug, Error)]
pub enum SelectError {
    /// The cancellation token fired while selecting.
    #[error("Selection cancelled")]
    Cancelled,

    /// The configured filename pattern is not a valid glob.
    #[error("Invalid file pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// The input directory could not be listed.
    #[error("Failed to read input directory: {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Locking failed for a reason other than contention.
    #[error("Failed to lock candidate: {0}")]
    Lock(#[source] FileError),
}

impl SelectError {
    /// Whether selection stopped because of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

//! Error types for the transform module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors a transform reports for one file.
///
/// The display text is recorded verbatim in the file's error marker.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Reading the input or writing the artifact failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external program could not be found.
    #[error("Command not found: {program}")]
    CommandNotFound { program: String },

    /// The external program exited unsuccessfully.
    #[error("Command {program} failed with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The external program ran past its deadline.
    #[error("Command {program} timed out after {timeout_secs} seconds")]
    Timeout { program: String, timeout_secs: u64 },

    /// The transform refused the input.
    #[error("{0}")]
    Rejected(String),

    /// Failed to serialize the artifact.
    #[error("Failed to serialize artifact: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl TransformError {
    /// Creates an I/O error for a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a rejection with a free-form reason.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_displays_reason_only() {
        let err = TransformError::rejected("error for testing");
        assert_eq!(err.to_string(), "error for testing");
    }

    #[test]
    fn test_command_failed_display() {
        let err = TransformError::CommandFailed {
            program: "ffmpeg".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "invalid data".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Command ffmpeg failed with exit status: 1: invalid data"
        );
    }
}

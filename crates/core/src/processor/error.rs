//! Error types for the processor module.

use thiserror::Error;

use crate::selector::SelectError;

/// Errors that end a processor loop.
///
/// Per-file failures never appear here; they are routed to the error
/// directory and the loop continues.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The loop observed cancellation.
    #[error("Processor cancelled")]
    Cancelled,

    /// Selection failed for a reason other than cancellation.
    #[error("Selection failed: {0}")]
    Select(#[source] SelectError),
}

impl ProcessorError {
    /// Whether the loop ended because of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<SelectError> for ProcessorError {
    fn from(error: SelectError) -> Self {
        match error {
            SelectError::Cancelled => Self::Cancelled,
            other => Self::Select(other),
        }
    }
}

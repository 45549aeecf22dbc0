//! Types for the pipeline module.

use thiserror::Error;

use crate::processor::ProcessorError;

/// Why a worker stopped other than by cancellation.
#[derive(Debug, Error)]
pub enum WorkerFailure {
    /// The worker loop returned an error.
    #[error(transparent)]
    Failed(ProcessorError),

    /// The worker task panicked.
    #[error("Worker panicked: {0}")]
    Panicked(String),
}

impl WorkerFailure {
    /// Short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Failed(_) => "failed",
            Self::Panicked(_) => "panicked",
        }
    }
}

/// How one worker ended.
#[derive(Debug)]
pub struct WorkerExit {
    /// Stage the worker belonged to.
    pub stage: String,
    /// Index of the worker within its stage, starting at 0.
    pub worker: usize,
    /// `Ok` when the worker stopped because of cancellation.
    pub result: Result<(), WorkerFailure>,
}

impl WorkerExit {
    /// Label for the exit reason: `cancelled`, `failed` or `panicked`.
    pub fn reason(&self) -> &'static str {
        match &self.result {
            Ok(()) => "cancelled",
            Err(failure) => failure.label(),
        }
    }
}

/// Every worker exit of one pipeline run, in the order they happened.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub exits: Vec<WorkerExit>,
}

impl PipelineReport {
    /// Whether any worker stopped for a reason other than cancellation.
    pub fn has_failures(&self) -> bool {
        self.exits.iter().any(|exit| exit.result.is_err())
    }

    /// Exits that were not caused by cancellation.
    pub fn failures(&self) -> impl Iterator<Item = &WorkerExit> {
        self.exits.iter().filter(|exit| exit.result.is_err())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_failures() {
        let mut report = PipelineReport::default();
        report.exits.push(WorkerExit {
            stage: "a".to_string(),
            worker: 0,
            result: Ok(()),
        });
        assert!(!report.has_failures());
        assert_eq!(report.exits[0].reason(), "cancelled");

        report.exits.push(WorkerExit {
            stage: "b".to_string(),
            worker: 1,
            result: Err(WorkerFailure::Panicked("boom".to_string())),
        });
        assert!(report.has_failures());
        let failed: Vec<_> = report.failures().map(|e| e.stage.as_str()).collect();
        assert_eq!(failed, vec!["b"]);
        assert_eq!(report.exits[1].reason(), "panicked");
    }
}

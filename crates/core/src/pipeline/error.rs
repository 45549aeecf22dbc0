//! Error types for the pipeline module.

use thiserror::Error;

use crate::config::ConfigError;
use crate::selector::SelectError;

/// Errors raised while assembling a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The configuration did not pass validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A stage's selector could not be built.
    #[error("Stage '{stage}': {source}")]
    Selector {
        stage: String,
        #[source]
        source: SelectError,
    },
}

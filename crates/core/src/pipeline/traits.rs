//! Trait definitions for the pipeline module.

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::processor::{Processor, ProcessorError};
use crate::selector::FileSelector;
use crate::transform::Transform;

/// A long-running worker that a [`Pipeline`](super::Pipeline) supervises.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Stage name, shared by every worker of the same stage.
    fn name(&self) -> &str;

    /// Runs until cancelled or until a fatal error.
    async fn run(&self, cancel: &CancellationToken) -> Result<(), ProcessorError>;
}

#[async_trait]
impl<S, T> Stage for Processor<S, T>
where
    S: FileSelector + 'static,
    T: Transform + 'static,
{
    fn name(&self) -> &str {
        Processor::name(self)
    }

    async fn run(&self, cancel: &CancellationToken) -> Result<(), ProcessorError> {
        Processor::run(self, cancel).await
    }
}

#[async_trait]
impl<St: Stage + ?Sized> Stage for Arc<St> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn run(&self, cancel: &CancellationToken) -> Result<(), ProcessorError> {
        (**self).run(cancel).await
    }
}

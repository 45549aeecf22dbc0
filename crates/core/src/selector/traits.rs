//! Trait definitions for the selector module.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::error::SelectError;
use crate::file::File;

/// A policy that finds and locks one eligible file.
#[async_trait]
pub trait FileSelector: Send + Sync {
    /// Returns a locked file, waiting for one to become available.
    ///
    /// Returns [`SelectError::Cancelled`] promptly once `cancel` fires.
    async fn select(&self, cancel: &CancellationToken) -> Result<File, SelectError>;

    /// Wait between scans that found nothing to lock.
    fn poll_interval(&self) -> Duration;
}

#[async_trait]
impl<S: FileSelector + ?Sized> FileSelector for Arc<S> {
    async fn select(&self, cancel: &CancellationToken) -> Result<File, SelectError> {
        (**self).select(cancel).await
    }

    fn poll_interval(&self) -> Duration {
        (**self).poll_interval()
    }
}

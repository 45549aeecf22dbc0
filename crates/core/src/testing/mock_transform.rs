//! Mock transform for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::file::File;
use crate::transform::{Transform, TransformError};

/// A call recorded by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Path of the file handed to the transform.
    pub input: PathBuf,
    /// Artifact path handed to the transform.
    pub output: PathBuf,
}

/// Mock transform that records calls and can be told to fail.
///
/// On success it writes the input's file name into the artifact.
#[derive(Clone)]
pub struct MockTransform {
    /// Recorded calls.
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    /// If set, every call fails with this message.
    failure: Arc<RwLock<Option<String>>>,
    /// Simulated processing duration in milliseconds.
    duration_ms: Arc<RwLock<u64>>,
}

impl Default for MockTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransform {
    /// Create a mock that always succeeds immediately.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            failure: Arc::new(RwLock::new(None)),
            duration_ms: Arc::new(RwLock::new(0)),
        }
    }

    /// Create a mock that always fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Arc::new(RwLock::new(Some(message.into()))),
            ..Self::new()
        }
    }

    /// Make every following call fail with `message`, or succeed with `None`.
    pub async fn set_failure(&self, message: Option<String>) {
        *self.failure.write().await = message;
    }

    /// Set the simulated processing duration.
    pub async fn set_duration(&self, duration: Duration) {
        *self.duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Get the number of calls made.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl Transform for MockTransform {
    fn name(&self) -> &str {
        "mock"
    }

    async fn process(&self, output: &Path, file: &File) -> Result<(), TransformError> {
        self.calls.write().await.push(RecordedCall {
            input: file.path().to_path_buf(),
            output: output.to_path_buf(),
        });

        let duration_ms = *self.duration_ms.read().await;
        if duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        }

        if let Some(message) = self.failure.read().await.clone() {
            return Err(TransformError::rejected(message));
        }

        let name = file
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        tokio::fs::write(output, name)
            .await
            .map_err(|e| TransformError::io(output, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_records_and_writes_artifact() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("a.txt.json");
        let mock = MockTransform::new();

        mock.process(&output, &File::new("/in/a.txt")).await.unwrap();

        assert_eq!(mock.call_count().await, 1);
        assert_eq!(
            mock.recorded_calls().await[0],
            RecordedCall {
                input: PathBuf::from("/in/a.txt"),
                output: output.clone(),
            }
        );
        assert_eq!(tokio::fs::read_to_string(&output).await.unwrap(), "a.txt");
    }

    #[tokio::test]
    async fn test_failure_toggle() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out");
        let mock = MockTransform::failing("nope");

        let err = mock.process(&output, &File::new("/in/a")).await.unwrap_err();
        assert_eq!(err.to_string(), "nope");
        assert!(!output.exists());

        mock.set_failure(None).await;
        mock.process(&output, &File::new("/in/a")).await.unwrap();
        assert_eq!(mock.call_count().await, 2);
    }
}

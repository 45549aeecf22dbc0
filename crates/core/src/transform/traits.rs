//! Trait definitions for the transform module.

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::TransformError;
use crate::file::File;

/// The per-file work of one pipeline stage.
///
/// Reads the locked file and writes an artifact at `output`. The file's
/// location and markers belong to the processor; a transform must not move
/// or mark the file.
#[async_trait]
pub trait Transform: Send + Sync {
    /// Returns the name of this transform, for logs.
    fn name(&self) -> &str;

    /// Processes one file, producing an artifact at `output`.
    async fn process(&self, output: &Path, file: &File) -> Result<(), TransformError>;
}

#[async_trait]
impl<T: Transform + ?Sized> Transform for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn process(&self, output: &Path, file: &File) -> Result<(), TransformError> {
        (**self).process(output, file).await
    }
}

#[async_trait]
impl<T: Transform + ?Sized> Transform for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn process(&self, output: &Path, file: &File) -> Result<(), TransformError> {
        (**self).process(output, file).await
    }
}

/// Adapts a closure into a [`Transform`].
///
/// The closure receives owned copies of the artifact path and the file's
/// current path.
///
/// ```ignore
/// let transform = FnTransform::new("upper", |output, input| {
///     Box::pin(async move {
///         let text = tokio::fs::read_to_string(&input).await
///             .map_err(|e| TransformError::io(&input, e))?;
///         tokio::fs::write(&output, text.to_uppercase()).await
///             .map_err(|e| TransformError::io(&output, e))
///     })
/// });
/// ```
pub struct FnTransform<F> {
    name: String,
    func: F,
}

impl<F> FnTransform<F>
where
    F: Fn(PathBuf, PathBuf) -> BoxFuture<'static, Result<(), TransformError>> + Send + Sync,
{
    /// Wraps a closure.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

#[async_trait]
impl<F> Transform for FnTransform<F>
where
    F: Fn(PathBuf, PathBuf) -> BoxFuture<'static, Result<(), TransformError>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn process(&self, output: &Path, file: &File) -> Result<(), TransformError> {
        (self.func)(output.to_path_buf(), file.path().to_path_buf()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fn_transform() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        tokio::fs::write(&input, "hello").await.unwrap();

        let transform = FnTransform::new("upper", |output: PathBuf, input: PathBuf| {
            Box::pin(async move {
                let text = tokio::fs::read_to_string(&input)
                    .await
                    .map_err(|e| TransformError::io(&input, e))?;
                tokio::fs::write(&output, text.to_uppercase())
                    .await
                    .map_err(|e| TransformError::io(&output, e))
            }) as BoxFuture<'static, Result<(), TransformError>>
        });
        let shared: Arc<dyn Transform> = Arc::new(transform);

        assert_eq!(shared.name(), "upper");
        shared.process(&output, &File::new(&input)).await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&output).await.unwrap(), "HELLO");
    }
}

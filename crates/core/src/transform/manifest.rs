//! Manifest transform: describes each input file in a JSON artifact.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, BufReader};

use super::error::TransformError;
use super::traits::Transform;
use crate::file::File;

const BUFFER_SIZE: usize = 1024 * 1024;

/// Type of checksum recorded in a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumType {
    /// SHA-256 checksum.
    Sha256,
    /// MD5 checksum (faster but less secure).
    Md5,
}

/// A checksum value and its algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksum {
    pub algorithm: ChecksumType,
    pub value: String,
}

/// The artifact written for each processed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Base name of the input file.
    pub name: String,
    /// Where the input was read from.
    pub source: PathBuf,
    /// Input size in bytes.
    pub size_bytes: u64,
    /// Content checksum, when configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<Checksum>,
    /// When the manifest was produced.
    pub processed_at: DateTime<Utc>,
}

/// Writes a [`Manifest`] for every file it sees.
#[derive(Debug, Clone, Default)]
pub struct ManifestTransform {
    checksum: Option<ChecksumType>,
}

impl ManifestTransform {
    /// Creates a manifest transform with an optional checksum.
    pub fn new(checksum: Option<ChecksumType>) -> Self {
        Self { checksum }
    }

    async fn checksum(path: &Path, algorithm: ChecksumType) -> Result<Checksum, TransformError> {
        let handle = fs::File::open(path)
            .await
            .map_err(|e| TransformError::io(path, e))?;
        let mut reader = BufReader::with_capacity(BUFFER_SIZE, handle);
        let mut buffer = vec![0u8; BUFFER_SIZE];

        let mut sha = Sha256::new();
        let mut md5 = md5::Context::new();
        loop {
            let bytes_read = reader
                .read(&mut buffer)
                .await
                .map_err(|e| TransformError::io(path, e))?;
            if bytes_read == 0 {
                break;
            }
            match algorithm {
                ChecksumType::Sha256 => sha.update(&buffer[..bytes_read]),
                ChecksumType::Md5 => md5.consume(&buffer[..bytes_read]),
            }
        }

        let value = match algorithm {
            ChecksumType::Sha256 => format!("{:x}", sha.finalize()),
            ChecksumType::Md5 => format!("{:x}", md5.compute()),
        };
        Ok(Checksum { algorithm, value })
    }
}

#[async_trait]
impl Transform for ManifestTransform {
    fn name(&self) -> &str {
        "manifest"
    }

    async fn process(&self, output: &Path, file: &File) -> Result<(), TransformError> {
        let source = file.path();
        let metadata = fs::metadata(source)
            .await
            .map_err(|e| TransformError::io(source, e))?;
        if !metadata.is_file() {
            return Err(TransformError::rejected(format!(
                "Not a regular file: {}",
                source.display()
            )));
        }

        let checksum = match self.checksum {
            Some(algorithm) => Some(Self::checksum(source, algorithm).await?),
            None => None,
        };

        let manifest = Manifest {
            name: source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            source: source.to_path_buf(),
            size_bytes: metadata.len(),
            checksum,
            processed_at: Utc::now(),
        };

        let json = serde_json::to_vec_pretty(&manifest)?;
        fs::write(output, json)
            .await
            .map_err(|e| TransformError::io(output, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn run(checksum: Option<ChecksumType>) -> Manifest {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("hello.txt");
        let output = dir.path().join("hello.txt.json");
        fs::write(&input, "hello world").await.unwrap();

        ManifestTransform::new(checksum)
            .process(&output, &File::new(&input))
            .await
            .unwrap();

        let bytes = fs::read(&output).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_manifest_without_checksum() {
        let manifest = run(None).await;
        assert_eq!(manifest.name, "hello.txt");
        assert_eq!(manifest.size_bytes, 11);
        assert!(manifest.checksum.is_none());
    }

    #[tokio::test]
    async fn test_manifest_sha256() {
        let manifest = run(Some(ChecksumType::Sha256)).await;
        let checksum = manifest.checksum.unwrap();
        assert_eq!(checksum.algorithm, ChecksumType::Sha256);
        assert_eq!(
            checksum.value,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[tokio::test]
    async fn test_manifest_md5() {
        let manifest = run(Some(ChecksumType::Md5)).await;
        assert_eq!(
            manifest.checksum.unwrap().value,
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }

    #[tokio::test]
    async fn test_missing_input_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = ManifestTransform::default()
            .process(
                &dir.path().join("out.json"),
                &File::new(dir.path().join("missing.txt")),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::Io { .. }));
    }
}

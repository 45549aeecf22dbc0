//! Configuration for the built-in transforms.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::command::CommandTransform;
use super::manifest::{ChecksumType, ManifestTransform};
use super::traits::Transform;

/// Selects and configures a built-in transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformConfig {
    /// Write a JSON manifest per file.
    Manifest {
        #[serde(default)]
        checksum: Option<ChecksumType>,
    },
    /// Run an external program per file.
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self::Manifest { checksum: None }
    }
}

impl TransformConfig {
    /// Builds the configured transform.
    pub fn build(&self) -> Arc<dyn Transform> {
        match self {
            Self::Manifest { checksum } => Arc::new(ManifestTransform::new(*checksum)),
            Self::Command {
                program,
                args,
                timeout_secs,
            } => {
                let command = CommandTransform::new(program.clone(), args.clone());
                match timeout_secs {
                    Some(secs) => Arc::new(command.with_timeout(Duration::from_secs(*secs))),
                    None => Arc::new(command),
                }
            }
        }
    }
}

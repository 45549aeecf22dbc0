//! Configuration for the processor module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a stage routes files and writes artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Files that processed successfully are moved here, with a ready marker.
    pub success_dir: PathBuf,

    /// Files whose processing failed are moved here, with an error marker.
    pub error_dir: PathBuf,

    /// Root of the time-partitioned artifact tree.
    pub results_dir: PathBuf,

    /// Extension appended to the input name to form the artifact name.
    #[serde(default = "default_artifact_suffix")]
    pub artifact_suffix: String,
}

fn default_artifact_suffix() -> String {
    "json".to_string()
}

impl ProcessorConfig {
    /// Creates a config with the default artifact suffix.
    pub fn new(
        success_dir: impl Into<PathBuf>,
        error_dir: impl Into<PathBuf>,
        results_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            success_dir: success_dir.into(),
            error_dir: error_dir.into(),
            results_dir: results_dir.into(),
            artifact_suffix: default_artifact_suffix(),
        }
    }

    /// Sets the artifact suffix.
    pub fn with_artifact_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.artifact_suffix = suffix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_suffix() {
        let toml = r#"
success_dir = "/data/out"
error_dir = "/data/errors"
results_dir = "/data/results"
"#;
        let config: ProcessorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.artifact_suffix, "json");
        assert_eq!(config.success_dir, PathBuf::from("/data/out"));
    }

    #[test]
    fn test_config_builder() {
        let config = ProcessorConfig::new("/out", "/err", "/res").with_artifact_suffix("txt");
        assert_eq!(config.artifact_suffix, "txt");
        assert_eq!(config.error_dir, PathBuf::from("/err"));
    }
}

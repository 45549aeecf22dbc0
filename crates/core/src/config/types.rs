use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::processor::ProcessorConfig;
use crate::selector::SelectorConfig;
use crate::transform::TransformConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub stages: Vec<StageConfig>,
}

/// Supervision settings shared by all stages
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PipelineSettings {
    /// Stop every worker as soon as one exits with an error
    #[serde(default)]
    pub fail_fast: bool,
}

/// Metrics export configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    /// Prometheus textfile to rewrite periodically (disabled when unset)
    #[serde(default)]
    pub textfile: Option<PathBuf>,
    /// Seconds between textfile writes
    #[serde(default = "default_metrics_interval")]
    pub interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            textfile: None,
            interval_secs: default_metrics_interval(),
        }
    }
}

fn default_metrics_interval() -> u64 {
    15
}

/// One pipeline stage
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StageConfig {
    /// Stage name, used in logs and metrics
    pub name: String,
    /// Concurrent workers polling the same input directory
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Where the stage picks up work
    pub input: SelectorConfig,
    /// Where the stage routes files and artifacts
    pub output: ProcessorConfig,
    /// What the stage does with each file
    #[serde(default)]
    pub transform: TransformConfig,
}

fn default_workers() -> usize {
    1
}

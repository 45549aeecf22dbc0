pub mod config;
pub mod file;
pub mod metrics;
pub mod pipeline;
pub mod processor;
pub mod selector;
pub mod testing;
pub mod transform;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, MetricsConfig,
    PipelineSettings, StageConfig,
};
pub use file::{File, FileError, FileStatus, LockOwner, Sidecar};
pub use pipeline::{Pipeline, PipelineError, PipelineReport, Stage, WorkerExit, WorkerFailure};
pub use processor::{FileOutcome, Processor, ProcessorConfig, ProcessorError};
pub use selector::{FileSelector, RandomSelector, SelectError, SelectorConfig};
pub use transform::{
    CommandTransform, FnTransform, ManifestTransform, Transform, TransformConfig, TransformError,
};

//! Pipeline module: run many stage workers under one supervisor.
//!
//! Stages chain through the filesystem. A stage's `success_dir` is the
//! next stage's input directory, and the next stage selects with
//! `wait_for_ready` so it only sees files whose move has completed:
//!
//! ```text
//!  inbox ──[ingest]──> transcode ──[transcode]──> publish
//!    │                    │
//!    └─> errors/ingest    └─> errors/transcode
//! ```
//!
//! [`Pipeline`] only spawns workers, pre-creates input directories and
//! collects a [`PipelineReport`] once every worker has stopped.

mod error;
mod supervisor;
mod traits;
mod types;

pub use error::PipelineError;
pub use supervisor::Pipeline;
pub use traits::Stage;
pub use types::{PipelineReport, WorkerExit, WorkerFailure};

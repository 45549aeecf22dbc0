//! Processor module: one pipeline stage's work loop.
//!
//! A [`Processor`] pairs a [`FileSelector`](crate::selector::FileSelector)
//! with a [`Transform`](crate::transform::Transform) and three directories:
//!
//! - `success_dir`: processed files land here with a ready marker
//! - `error_dir`: failed files land here with an error marker
//! - `results_dir`: artifacts, under `<YYYY-MM>/<YYYYMMDD-HH00>/`
//!
//! # Example
//!
//! ```ignore
//! use hopper_core::processor::{Processor, ProcessorConfig};
//! use hopper_core::selector::{RandomSelector, SelectorConfig};
//! use hopper_core::transform::ManifestTransform;
//!
//! let processor = Processor::new(
//!     "ingest",
//!     RandomSelector::new(SelectorConfig::new("/data/inbox"))?,
//!     ManifestTransform::default(),
//!     ProcessorConfig::new("/data/transcode", "/data/errors", "/data/results"),
//! );
//! processor.run(&cancel).await?;
//! ```

mod config;
mod error;
mod types;
mod worker;

pub use config::ProcessorConfig;
pub use error::ProcessorError;
pub use types::{artifact_path_at, FileOutcome};
pub use worker::Processor;

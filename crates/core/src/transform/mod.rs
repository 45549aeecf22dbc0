//! Transform module: the per-file work a stage performs.
//!
//! A [`Transform`] reads one locked file and writes an artifact to a path
//! chosen by the processor. It reports failure through [`TransformError`],
//! whose message ends up in the file's error marker.
//!
//! Built-in transforms:
//! - [`ManifestTransform`]: JSON description of the input, optional checksum
//! - [`CommandTransform`]: runs an external program with `{input}`/`{output}`
//!
//! Custom logic plugs in by implementing [`Transform`] or wrapping a closure
//! in [`FnTransform`].

mod command;
mod config;
mod error;
mod manifest;
mod traits;

pub use command::{CommandTransform, INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER};
pub use config::TransformConfig;
pub use error::TransformError;
pub use manifest::{Checksum, ChecksumType, Manifest, ManifestTransform};
pub use traits::{FnTransform, Transform};

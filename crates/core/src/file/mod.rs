//! Lockable files on shared storage.
//!
//! A [`File`] is one unit of work: a content file plus sidecar artifacts
//! derived from its name:
//!
//! - `<name>.lock`: exclusive ownership, created with create-exclusive
//!   semantics so that it holds across processes sharing the storage
//! - `<name>.ready`: content is complete and safe for a consumer to read
//! - `<name>.error`: reason the last processing attempt failed
//!
//! The markers are modeled as a [`FileStatus`] with dedicated transitions,
//! so a file never carries both a live ready marker and an error marker.
//!
//! Mutual exclusion relies on the storage providing atomic create-if-absent.
//! Local filesystems and POSIX-compliant network filesystems do; some network
//! filesystems with weaker consistency do not, and running workers on such
//! storage is unsupported.
//!
//! # Example
//!
//! ```ignore
//! use hopper_core::file::File;
//!
//! let mut file = File::new("/data/inbox/clip.mp4");
//! file.lock().await?;
//! file.move_to(Path::new("/data/transcode")).await?;
//! file.unlock().await;
//! ```

mod error;
mod handle;
mod sidecar;

pub use error::FileError;
pub use handle::{File, LockOwner};
pub use sidecar::{FileStatus, Sidecar, ERROR_SUFFIX, LOCK_SUFFIX, READY_SUFFIX};

//! Sidecar artifact naming and the marker-derived file status.

use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Suffix of the lock artifact.
pub const LOCK_SUFFIX: &str = ".lock";
/// Suffix of the ready marker.
pub const READY_SUFFIX: &str = ".ready";
/// Suffix of the error marker.
pub const ERROR_SUFFIX: &str = ".error";

/// A sidecar artifact living next to a content file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sidecar {
    /// Exclusive ownership marker, created atomically.
    Lock,
    /// Content is complete and safe to read.
    Ready,
    /// Last processing attempt failed; content is the reason.
    Error,
}

impl Sidecar {
    pub const ALL: [Sidecar; 3] = [Sidecar::Lock, Sidecar::Ready, Sidecar::Error];

    /// Returns the filename suffix for this sidecar.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Lock => LOCK_SUFFIX,
            Self::Ready => READY_SUFFIX,
            Self::Error => ERROR_SUFFIX,
        }
    }

    /// Returns the sidecar path for a content path.
    pub fn path_for(self, content: &Path) -> PathBuf {
        let mut raw = content.as_os_str().to_os_string();
        raw.push(self.suffix());
        PathBuf::from(raw)
    }

    /// Returns the sidecar file name for a content file name.
    pub fn name_for(self, content_name: &OsStr) -> OsString {
        let mut name = content_name.to_os_string();
        name.push(self.suffix());
        name
    }

    /// Whether a file name is itself a sidecar artifact.
    pub fn is_sidecar_name(name: &OsStr) -> bool {
        let name = name.to_string_lossy();
        Self::ALL.iter().any(|s| name.ends_with(s.suffix()))
    }
}

/// Processing status of a file, as observed through its markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// No marker: the producer may still be writing.
    Pending,
    /// Ready marker present.
    Ready,
    /// Error marker present. Takes precedence over a ready marker.
    Errored,
}

impl FileStatus {
    pub(crate) fn from_markers(ready: bool, errored: bool) -> Self {
        if errored {
            Self::Errored
        } else if ready {
            Self::Ready
        } else {
            Self::Pending
        }
    }
}

//! Testing utilities and mock implementations.
//!
//! This module provides a mock [`Transform`](crate::transform::Transform) and
//! fixtures for building directory trees, so pipelines can be exercised
//! end to end without real media tooling.
//!
//! # Example
//!
//! ```rust,ignore
//! use hopper_core::testing::{fixtures, MockTransform};
//!
//! let transform = MockTransform::failing("corrupt input");
//! fixtures::seed_files(&input_dir, 10, "txt");
//! ```

mod mock_transform;

pub use mock_transform::{MockTransform, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::ffi::OsStr;
    use std::path::{Path, PathBuf};

    use crate::file::Sidecar;

    /// Write `count` files named `0.<ext>` .. `<count-1>.<ext>` into `dir`.
    ///
    /// Each file contains its own name. Returns the created paths.
    pub fn seed_files(dir: &Path, count: usize, ext: &str) -> Vec<PathBuf> {
        std::fs::create_dir_all(dir).expect("Failed to create fixture dir");
        (0..count)
            .map(|i| {
                let name = format!("{i}.{ext}");
                let path = dir.join(&name);
                std::fs::write(&path, &name).expect("Failed to write fixture file");
                path
            })
            .collect()
    }

    /// Names of the content files in `dir`, sidecars excluded, sorted.
    pub fn content_names(dir: &Path) -> Vec<String> {
        list(dir, |name| !Sidecar::is_sidecar_name(OsStr::new(name)))
    }

    /// Names of the sidecar files in `dir` with the given sidecar kind, sorted.
    pub fn sidecar_names(dir: &Path, sidecar: Sidecar) -> Vec<String> {
        list(dir, |name| name.ends_with(sidecar.suffix()))
    }

    /// Every regular file below `dir`, recursively.
    pub fn walk_files(dir: &Path) -> Vec<PathBuf> {
        let mut found = Vec::new();
        let Ok(entries) = std::fs::read_dir(dir) else {
            return found;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                found.extend(walk_files(&path));
            } else {
                found.push(path);
            }
        }
        found.sort();
        found
    }

    fn list(dir: &Path, keep: impl Fn(&str) -> bool) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .flatten()
            .filter(|e| e.path().is_file())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| keep(name))
            .collect();
        names.sort();
        names
    }
}

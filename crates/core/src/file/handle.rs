//! The lockable file handle.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::FileError;
use super::sidecar::{FileStatus, Sidecar};

/// Identity of this process in lock owner records.
static PROCESS_OWNER: Lazy<Uuid> = Lazy::new(Uuid::new_v4);

/// Owner record written into a lock artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockOwner {
    /// Random identity of the owning process.
    pub owner: Uuid,
    /// OS process id of the owner.
    pub pid: u32,
    /// When the lock was taken.
    pub locked_at: DateTime<Utc>,
}

impl LockOwner {
    fn current() -> Self {
        Self {
            owner: *PROCESS_OWNER,
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// Whether this record was written by the current process.
    pub fn is_current_process(&self) -> bool {
        self.owner == *PROCESS_OWNER
    }
}

/// A unit of work on shared storage.
///
/// The lock is owned by the handle: the lock artifact path is fixed when
/// [`File::lock`] succeeds and stays valid across moves, so [`File::unlock`]
/// always removes the artifact that was actually created. A handle dropped
/// while still holding its lock releases it.
#[derive(Debug)]
pub struct File {
    path: PathBuf,
    held_lock: Option<PathBuf>,
}

impl File {
    /// Creates a handle for a path. Touches nothing on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            held_lock: None,
        }
    }

    /// Current location of the content file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name of the content file.
    pub fn file_name(&self) -> Result<&OsStr, FileError> {
        self.path.file_name().ok_or_else(|| FileError::NoFileName {
            path: self.path.clone(),
        })
    }

    /// Lock artifact path for the current location.
    pub fn lock_path(&self) -> PathBuf {
        Sidecar::Lock.path_for(&self.path)
    }

    /// Ready marker path for the current location.
    pub fn ready_path(&self) -> PathBuf {
        Sidecar::Ready.path_for(&self.path)
    }

    /// Error marker path for the current location.
    pub fn error_path(&self) -> PathBuf {
        Sidecar::Error.path_for(&self.path)
    }

    /// Whether this handle currently owns a lock artifact.
    pub fn holds_lock(&self) -> bool {
        self.held_lock.is_some()
    }

    /// Whether the content file still exists at its current location.
    pub async fn exists(&self) -> bool {
        fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Takes the exclusive lock.
    ///
    /// Uses create-exclusive semantics on the lock artifact, so at most one
    /// caller across all processes sharing the storage can succeed. Fails
    /// with [`FileError::Locked`] if the artifact already exists, including
    /// when this same handle already holds it, and also when the handle still
    /// holds a lock taken at an earlier location.
    pub async fn lock(&mut self) -> Result<(), FileError> {
        if self.held_lock.is_some() {
            return Err(FileError::Locked {
                path: self.path.clone(),
            });
        }
        let lock_path = self.lock_path();
        let mut handle = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .await
        {
            Ok(handle) => handle,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(FileError::Locked {
                    path: self.path.clone(),
                });
            }
            Err(e) => return Err(FileError::io("create lock", lock_path, e)),
        };
        self.held_lock = Some(lock_path.clone());

        // The artifact's existence is the lock; the owner record is diagnostics.
        let record = serde_json::to_vec(&LockOwner::current()).unwrap_or_default();
        let written = async {
            handle.write_all(&record).await?;
            handle.flush().await
        }
        .await;
        if let Err(e) = written {
            warn!("Failed to record lock owner in {:?}: {}", lock_path, e);
        }

        debug!("Locked {:?}", self.path);
        Ok(())
    }

    /// Releases the lock held by this handle.
    ///
    /// Idempotent and best-effort: a missing artifact is not an error, and
    /// other failures are logged. Does nothing if the handle holds no lock.
    pub async fn unlock(&mut self) {
        let Some(lock_path) = self.held_lock.take() else {
            return;
        };
        match remove_if_exists(&lock_path).await {
            Ok(_) => debug!("Unlocked {:?}", lock_path),
            Err(e) => warn!("Failed to remove lock {:?}: {}", lock_path, e),
        }
    }

    /// Removes the lock artifact at the current location regardless of owner.
    ///
    /// Locks are never expired automatically; this is the manual recovery
    /// path for a lock left behind by a crashed worker.
    pub async fn break_lock(&self) -> Result<bool, FileError> {
        let lock_path = self.lock_path();
        remove_if_exists(&lock_path)
            .await
            .map_err(|e| FileError::io("remove lock", lock_path, e))
    }

    /// Reads the owner record of the lock at the current location.
    pub async fn lock_owner(&self) -> Result<Option<LockOwner>, FileError> {
        let lock_path = self.lock_path();
        match fs::read(&lock_path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes).ok()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FileError::io("read lock", lock_path, e)),
        }
    }

    /// Renames the content file into `dir` under its base name.
    ///
    /// The destination directory is created if needed. Ready and error
    /// markers left at the source are removed, as are stale markers of the
    /// same name at the destination, so the file arrives `Pending`. The lock
    /// artifact is not touched.
    pub async fn relocate(&mut self, dir: &Path) -> Result<(), FileError> {
        let name = self.file_name()?.to_os_string();
        fs::create_dir_all(dir)
            .await
            .map_err(|source| FileError::DirectoryCreationFailed {
                path: dir.to_path_buf(),
                source,
            })?;

        let destination = dir.join(name);
        fs::rename(&self.path, &destination)
            .await
            .map_err(|error| FileError::MoveFailed {
                from: self.path.clone(),
                to: destination.clone(),
                error,
            })?;
        let source = std::mem::replace(&mut self.path, destination);

        for sidecar in [Sidecar::Ready, Sidecar::Error] {
            for marker in [sidecar.path_for(&source), sidecar.path_for(&self.path)] {
                if let Err(e) = remove_if_exists(&marker).await {
                    warn!("Failed to clear stale marker {:?}: {}", marker, e);
                }
            }
        }

        debug!("Moved {:?} to {:?}", source, self.path);
        Ok(())
    }

    /// Moves the file into `dir` and marks it ready for the next consumer.
    pub async fn move_to(&mut self, dir: &Path) -> Result<(), FileError> {
        self.relocate(dir).await?;
        self.ready().await
    }

    /// Marks the file ready, replacing any error marker.
    pub async fn ready(&self) -> Result<(), FileError> {
        let ready_path = self.ready_path();
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&ready_path)
            .await
            .map_err(|e| FileError::io("create ready marker", ready_path, e))?;

        let error_path = self.error_path();
        remove_if_exists(&error_path)
            .await
            .map_err(|e| FileError::io("remove error marker", error_path, e))?;
        Ok(())
    }

    /// Removes the ready marker, returning the file to `Pending`.
    pub async fn not_ready(&self) -> Result<(), FileError> {
        let ready_path = self.ready_path();
        remove_if_exists(&ready_path)
            .await
            .map_err(|e| FileError::io("remove ready marker", ready_path, e))?;
        Ok(())
    }

    /// Records a failure reason in the error marker.
    ///
    /// The marker holds exactly the error's display text. Any previous error
    /// marker is overwritten and a ready marker is removed, so an errored file
    /// is never picked up by a consumer waiting for readiness.
    pub async fn write_err(&self, err: impl std::fmt::Display) -> Result<(), FileError> {
        let error_path = self.error_path();
        fs::write(&error_path, err.to_string())
            .await
            .map_err(|e| FileError::io("write error marker", error_path, e))?;

        let ready_path = self.ready_path();
        remove_if_exists(&ready_path)
            .await
            .map_err(|e| FileError::io("remove ready marker", ready_path, e))?;
        Ok(())
    }

    /// Reads the error marker, if any.
    pub async fn error_message(&self) -> Result<Option<String>, FileError> {
        let error_path = self.error_path();
        match fs::read_to_string(&error_path).await {
            Ok(message) => Ok(Some(message)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FileError::io("read error marker", error_path, e)),
        }
    }

    /// Current status derived from the markers on disk.
    pub async fn status(&self) -> Result<FileStatus, FileError> {
        let ready_path = self.ready_path();
        let ready = fs::try_exists(&ready_path)
            .await
            .map_err(|e| FileError::io("check ready marker", ready_path, e))?;
        let error_path = self.error_path();
        let errored = fs::try_exists(&error_path)
            .await
            .map_err(|e| FileError::io("check error marker", error_path, e))?;
        Ok(FileStatus::from_markers(ready, errored))
    }

    /// Whether the file is currently marked ready.
    pub async fn is_ready(&self) -> bool {
        matches!(self.status().await, Ok(FileStatus::Ready))
    }
}

impl Drop for File {
    fn drop(&mut self) {
        if let Some(lock_path) = self.held_lock.take() {
            // Blocking removal; only reached when unlock() was skipped, e.g. on panic.
            match std::fs::remove_file(&lock_path) {
                Ok(()) => debug!("Released lock {:?} on drop", lock_path),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to release lock {:?} on drop: {}", lock_path, e),
            }
        }
    }
}

/// Removes a file, treating absence as success. Returns whether it existed.
async fn remove_if_exists(path: &Path) -> std::io::Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

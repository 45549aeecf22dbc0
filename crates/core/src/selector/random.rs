//! Randomized file selector.

use async_trait::async_trait;
use globset::{Glob, GlobMatcher};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::config::SelectorConfig;
use super::error::SelectError;
use super::traits::FileSelector;
use crate::file::{File, Sidecar};
use crate::metrics;

/// Picks uniformly at random among eligible files and locks the pick.
///
/// Random choice spreads concurrent workers over the directory instead of
/// having all of them race for the same first entry. The random source is
/// injected so tests can seed it.
pub struct RandomSelector<R = StdRng> {
    config: SelectorConfig,
    matcher: GlobMatcher,
    rng: Mutex<R>,
}

impl RandomSelector<StdRng> {
    /// Creates a selector seeded from the operating system.
    pub fn new(config: SelectorConfig) -> Result<Self, SelectError> {
        Self::with_rng(config, StdRng::from_os_rng())
    }
}

impl<R: RngCore + Send> RandomSelector<R> {
    /// Creates a selector with an explicit random source.
    pub fn with_rng(config: SelectorConfig, rng: R) -> Result<Self, SelectError> {
        let matcher = Glob::new(&config.pattern)
            .map_err(|source| SelectError::InvalidPattern {
                pattern: config.pattern.clone(),
                source,
            })?
            .compile_matcher();

        Ok(Self {
            config,
            matcher,
            rng: Mutex::new(rng),
        })
    }

    /// Returns the selector configuration.
    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Lists files that are currently eligible, sorted by name.
    ///
    /// Eligible means: a regular file, not a sidecar, matching the pattern,
    /// not visibly locked, and carrying a ready marker when one is required.
    pub async fn candidates(&self) -> Result<Vec<PathBuf>, SelectError> {
        let dir = &self.config.dir;
        let read_dir_error = |source| SelectError::ReadDir {
            path: dir.clone(),
            source,
        };

        let mut entries = fs::read_dir(dir).await.map_err(read_dir_error)?;
        let mut names: HashSet<OsString> = HashSet::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_dir_error)? {
            // Entries can vanish mid-scan when another worker moves them.
            match entry.file_type().await {
                Ok(file_type) if file_type.is_file() => {
                    names.insert(entry.file_name());
                }
                _ => {}
            }
        }

        let mut candidates: Vec<PathBuf> = names
            .iter()
            .filter(|name| self.is_eligible(name, &names))
            .map(|name| dir.join(name))
            .collect();
        candidates.sort();
        Ok(candidates)
    }

    fn is_eligible(&self, name: &OsString, listing: &HashSet<OsString>) -> bool {
        if Sidecar::is_sidecar_name(name) || !self.matcher.is_match(Path::new(name)) {
            return false;
        }
        if listing.contains(&Sidecar::Lock.name_for(name)) {
            return false;
        }
        !self.config.wait_for_ready || listing.contains(&Sidecar::Ready.name_for(name))
    }

    fn pick(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.random_range(0..len)
    }

    /// Tries to lock one of the candidates, consuming them as it goes.
    async fn lock_one(
        &self,
        candidates: &mut Vec<PathBuf>,
        cancel: &CancellationToken,
    ) -> Result<Option<File>, SelectError> {
        let dir_label = self.config.dir.to_string_lossy();

        while !candidates.is_empty() {
            if cancel.is_cancelled() {
                return Err(SelectError::Cancelled);
            }

            let path = candidates.swap_remove(self.pick(candidates.len()));
            let mut file = File::new(path);
            match file.lock().await {
                Ok(()) => {}
                Err(e) if e.is_locked() => {
                    debug!("Lost lock race for {:?}", file.path());
                    metrics::LOCK_CONTENTION
                        .with_label_values(&[dir_label.as_ref()])
                        .inc();
                    continue;
                }
                Err(e) => return Err(SelectError::Lock(e)),
            }

            // Between our scan and our lock another worker may have finished
            // with this file and released its lock.
            let still_eligible =
                file.exists().await && (!self.config.wait_for_ready || file.is_ready().await);
            if !still_eligible {
                debug!("Candidate {:?} went away before it was locked", file.path());
                file.unlock().await;
                continue;
            }

            metrics::FILES_SELECTED
                .with_label_values(&[dir_label.as_ref()])
                .inc();
            return Ok(Some(file));
        }
        Ok(None)
    }
}

#[async_trait]
impl<R: RngCore + Send> FileSelector for RandomSelector<R> {
    async fn select(&self, cancel: &CancellationToken) -> Result<File, SelectError> {
        loop {
            if cancel.is_cancelled() {
                return Err(SelectError::Cancelled);
            }

            let mut candidates = self.candidates().await?;
            if candidates.is_empty() {
                metrics::EMPTY_SCANS
                    .with_label_values(&[self.config.dir.to_string_lossy().as_ref()])
                    .inc();
            } else if let Some(file) = self.lock_one(&mut candidates, cancel).await? {
                return Ok(file);
            }

            debug!(
                "Nothing to lock in {:?}, retrying in {:?}",
                self.config.dir,
                self.config.poll_interval()
            );
            tokio::select! {
                _ = cancel.cancelled() => return Err(SelectError::Cancelled),
                _ = tokio::time::sleep(self.config.poll_interval()) => {}
            }
        }
    }
    fn poll_interval(&self) -> Duration {
        self.config.poll_interval()
    }
}

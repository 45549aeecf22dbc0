//! The processor loop: select, process, route, release.

use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::time::Instant;
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::config::ProcessorConfig;
use super::error::ProcessorError;
use super::types::{artifact_path_at, FileOutcome};
use crate::file::File;
use crate::metrics;
use crate::selector::FileSelector;
use crate::transform::{Transform, TransformError};

/// Drives one pipeline stage.
///
/// Each iteration locks a file through the selector, runs the transform,
/// moves the file to the success or error directory and releases the lock.
/// A failing file never stops the loop; only selection errors and
/// cancellation do.
pub struct Processor<S, T> {
    name: String,
    selector: S,
    transform: T,
    config: ProcessorConfig,
}

impl<S: FileSelector, T: Transform> Processor<S, T> {
    /// Creates a processor for a named stage.
    pub fn new(name: impl Into<String>, selector: S, transform: T, config: ProcessorConfig) -> Self {
        Self {
            name: name.into(),
            selector,
            transform,
            config,
        }
    }

    /// Stage name used in logs and metrics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the processor configuration.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Runs until cancelled or until selection fails.
    ///
    /// Cancellation is checked between files: a transform already running is
    /// allowed to finish and its file is routed before the loop exits.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<(), ProcessorError> {
        self.prepare_output_dirs().await;
        info!(
            "[{}] Stage started (transform: {})",
            self.name,
            self.transform.name()
        );

        loop {
            if cancel.is_cancelled() {
                return Err(ProcessorError::Cancelled);
            }
            let outcome = self.process_next(cancel).await?;
            if let FileOutcome::Stranded { .. } = outcome {
                // The file is still selectable; retry it on the next poll.
                tokio::select! {
                    _ = cancel.cancelled() => return Err(ProcessorError::Cancelled),
                    _ = tokio::time::sleep(self.selector.poll_interval()) => {}
                }
            }
        }
    }

    /// Processes exactly one file: waits for it, then routes and unlocks it.
    pub async fn process_next(
        &self,
        cancel: &CancellationToken,
    ) -> Result<FileOutcome, ProcessorError> {
        let mut file = self.selector.select(cancel).await?;
        let started = Instant::now();

        let outcome = self.handle(&mut file).await;
        file.unlock().await;

        let elapsed = started.elapsed();
        metrics::FILES_PROCESSED
            .with_label_values(&[self.name.as_str(), outcome.label()])
            .inc();
        metrics::PROCESSING_DURATION
            .with_label_values(&[self.name.as_str(), outcome.label()])
            .observe(elapsed.as_secs_f64());

        match &outcome {
            FileOutcome::Completed { path, .. } => {
                info!("[{}] Completed {:?} in {:?}", self.name, path, elapsed)
            }
            FileOutcome::Failed { path, reason } => {
                warn!("[{}] Failed {:?}: {}", self.name, path, reason)
            }
            FileOutcome::Stranded { path, reason } => {
                error!("[{}] Left {:?} in place: {}", self.name, path, reason)
            }
        }
        Ok(outcome)
    }

    /// Creates the routing directories. Failures are logged, not fatal.
    async fn prepare_output_dirs(&self) {
        for dir in [&self.config.success_dir, &self.config.error_dir] {
            if let Err(e) = fs::create_dir_all(dir).await {
                error!("[{}] Failed to create directory {:?}: {}", self.name, dir, e);
            }
        }
    }

    async fn handle(&self, file: &mut File) -> FileOutcome {
        match self.produce(file, Local::now()).await {
            Ok(artifact) => self.route_success(file, artifact).await,
            Err(err) => self.route_failure(file, err.to_string()).await,
        }
    }

    async fn produce(&self, file: &File, now: DateTime<Local>) -> Result<PathBuf, TransformError> {
        let file_name = file
            .file_name()
            .map_err(|e| TransformError::rejected(e.to_string()))?;
        let artifact = artifact_path_at(
            &self.config.results_dir,
            &now,
            file_name,
            &self.config.artifact_suffix,
        );
        if let Some(parent) = artifact.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| TransformError::io(parent, e))?;
        }

        self.transform.process(&artifact, file).await?;
        Ok(artifact)
    }

    async fn route_success(&self, file: &mut File, artifact: PathBuf) -> FileOutcome {
        if let Err(e) = file.relocate(&self.config.success_dir).await {
            return FileOutcome::Stranded {
                path: file.path().to_path_buf(),
                reason: e.to_string(),
            };
        }
        // The ready marker is the handshake the next stage waits for.
        if let Err(e) = file.ready().await {
            error!(
                "[{}] Moved {:?} but could not mark it ready: {}",
                self.name,
                file.path(),
                e
            );
        }
        FileOutcome::Completed {
            path: file.path().to_path_buf(),
            artifact,
        }
    }

    async fn route_failure(&self, file: &mut File, reason: String) -> FileOutcome {
        if let Err(e) = file.relocate(&self.config.error_dir).await {
            return FileOutcome::Stranded {
                path: file.path().to_path_buf(),
                reason: format!("{reason}; {e}"),
            };
        }
        if let Err(e) = file.write_err(&reason).await {
            error!(
                "[{}] Could not record error for {:?}: {}",
                self.name,
                file.path(),
                e
            );
        }
        FileOutcome::Failed {
            path: file.path().to_path_buf(),
            reason,
        }
    }
}

//! Pipeline supervision: spawn every worker, collect every exit.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::error::PipelineError;
use super::traits::Stage;
use super::types::{PipelineReport, WorkerExit, WorkerFailure};
use crate::config::{validate_config, Config};
use crate::metrics;
use crate::processor::Processor;
use crate::selector::RandomSelector;

struct Worker {
    stage: String,
    index: usize,
    runner: Arc<dyn Stage>,
}

/// A set of stage workers run together until cancelled.
///
/// Stages are not wired to each other: a stage whose input directory is
/// another stage's success directory simply picks up what the other one
/// produces, and several workers on one directory coordinate through file
/// locks only.
#[derive(Default)]
pub struct Pipeline {
    workers: Vec<Worker>,
    input_dirs: Vec<PathBuf>,
    fail_fast: bool,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel every worker as soon as one fails.
    pub fn with_fail_fast(mut self, enabled: bool) -> Self {
        self.fail_fast = enabled;
        self
    }

    /// Adds one worker. Workers sharing a name are numbered in insertion order.
    pub fn add_stage<St: Stage + 'static>(&mut self, stage: St) -> &mut Self {
        let name = stage.name().to_string();
        let index = self.workers.iter().filter(|w| w.stage == name).count();
        self.workers.push(Worker {
            stage: name,
            index,
            runner: Arc::new(stage),
        });
        self
    }

    /// Registers a directory to create before any worker starts.
    pub fn add_input_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        let dir = dir.into();
        if !self.input_dirs.contains(&dir) {
            self.input_dirs.push(dir);
        }
        self
    }

    /// Number of workers across all stages.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Builds a validated pipeline from configuration.
    ///
    /// Each stage gets `workers` processors with their own selector; the
    /// stage's transform is shared between them.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        validate_config(config)?;

        let mut pipeline = Self::new().with_fail_fast(config.pipeline.fail_fast);
        for stage in &config.stages {
            let transform = stage.transform.build();
            for _ in 0..stage.workers {
                let selector = RandomSelector::new(stage.input.clone()).map_err(|source| {
                    PipelineError::Selector {
                        stage: stage.name.clone(),
                        source,
                    }
                })?;
                pipeline.add_stage(Processor::new(
                    stage.name.clone(),
                    selector,
                    Arc::clone(&transform),
                    stage.output.clone(),
                ));
            }
            pipeline.add_input_dir(&stage.input.dir);
        }
        Ok(pipeline)
    }

    /// Runs every worker until all of them have exited.
    ///
    /// Workers stop when `cancel` fires, or when any worker fails and
    /// fail-fast is enabled. The caller's token is never cancelled by the
    /// pipeline itself.
    pub async fn run(self, cancel: CancellationToken) -> PipelineReport {
        let mut report = PipelineReport::default();
        if self.workers.is_empty() {
            warn!("Pipeline has no workers");
            return report;
        }

        for dir in &self.input_dirs {
            if let Err(e) = fs::create_dir_all(dir).await {
                error!("Failed to create input directory {:?}: {}", dir, e);
            }
        }

        let local = cancel.child_token();
        let mut tasks = JoinSet::new();
        info!("Starting pipeline with {} workers", self.workers.len());

        for worker in self.workers {
            let token = local.clone();
            tasks.spawn(async move {
                let runner = worker.runner;
                let outcome = AssertUnwindSafe(runner.run(&token)).catch_unwind().await;
                let result = match outcome {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) if e.is_cancelled() => Ok(()),
                    Ok(Err(e)) => Err(WorkerFailure::Failed(e)),
                    Err(payload) => Err(WorkerFailure::Panicked(panic_message(payload))),
                };
                WorkerExit {
                    stage: worker.stage,
                    worker: worker.index,
                    result,
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let exit = match joined {
                Ok(exit) => exit,
                Err(e) => {
                    error!("Worker task could not be joined: {}", e);
                    continue;
                }
            };

            metrics::WORKER_EXITS
                .with_label_values(&[exit.stage.as_str(), exit.reason()])
                .inc();

            match &exit.result {
                Ok(()) => info!("[{}#{}] Worker stopped", exit.stage, exit.worker),
                Err(failure) => {
                    error!("[{}#{}] Worker exited: {}", exit.stage, exit.worker, failure);
                    if self.fail_fast && !local.is_cancelled() {
                        warn!("Fail-fast enabled, stopping remaining workers");
                        local.cancel();
                    }
                }
            }
            report.exits.push(exit);
        }

        info!(
            "Pipeline stopped ({} workers, {} failed)",
            report.exits.len(),
            report.failures().count()
        );
        report
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

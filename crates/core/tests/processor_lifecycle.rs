//! Processor lifecycle integration tests.
//!
//! These tests run full processor loops against a seeded directory with the
//! mock transform:
//! - An always-failing stage routes everything to the error directory
//! - An always-succeeding stage routes everything to the success directory
//!   and writes one artifact per file

use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use hopper_core::file::Sidecar;
use hopper_core::processor::{Processor, ProcessorConfig};
use hopper_core::selector::{RandomSelector, SelectorConfig};
use hopper_core::testing::{fixtures, MockTransform};

const FILES: usize = 10;

struct Harness {
    _root: TempDir,
    input: PathBuf,
    success: PathBuf,
    errors: PathBuf,
    results: PathBuf,
}

impl Harness {
    fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let input = root.path().join("input");
        fixtures::seed_files(&input, FILES, "txt");
        Self {
            success: root.path().join("success"),
            errors: root.path().join("errors"),
            results: root.path().join("results"),
            input,
            _root: root,
        }
    }

    fn processor(&self, transform: MockTransform) -> Processor<RandomSelector, MockTransform> {
        let selector = RandomSelector::new(
            SelectorConfig::new(&self.input).with_poll_interval(Duration::from_millis(10)),
        )
        .expect("Failed to create selector");
        Processor::new(
            "lifecycle",
            selector,
            transform,
            ProcessorConfig::new(&self.success, &self.errors, &self.results),
        )
    }
}

/// Runs `workers` copies of a processor until `done` holds `FILES` entries.
async fn run_until_drained(harness: &Harness, transform: MockTransform, workers: usize, done: &Path) {
    let cancel = CancellationToken::new();
    let mut handles = Vec::new();
    for _ in 0..workers {
        let processor = harness.processor(transform.clone());
        let cancel = cancel.clone();
        handles.push(tokio::spawn(async move { processor.run(&cancel).await }));
    }

    for _ in 0..400 {
        if fixtures::content_names(done).len() == FILES {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cancel.cancel();

    for handle in handles {
        let err = handle.await.unwrap().unwrap_err();
        assert!(err.is_cancelled());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_always_failing_stage_routes_to_error_dir() {
    let harness = Harness::new();
    let transform = MockTransform::failing("error for testing");

    run_until_drained(&harness, transform.clone(), 3, &harness.errors).await;

    assert_eq!(fixtures::content_names(&harness.errors).len(), FILES);
    assert_eq!(
        fixtures::sidecar_names(&harness.errors, Sidecar::Error).len(),
        FILES
    );
    assert!(fixtures::sidecar_names(&harness.errors, Sidecar::Ready).is_empty());
    assert!(fixtures::content_names(&harness.success).is_empty());
    assert!(fixtures::content_names(&harness.input).is_empty());
    assert!(fixtures::sidecar_names(&harness.input, Sidecar::Lock).is_empty());

    for name in fixtures::sidecar_names(&harness.errors, Sidecar::Error) {
        let message = std::fs::read_to_string(harness.errors.join(name)).unwrap();
        assert_eq!(message, "error for testing");
    }
    assert_eq!(transform.call_count().await, FILES);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_always_succeeding_stage_routes_to_success_dir() {
    let harness = Harness::new();
    let transform = MockTransform::new();

    run_until_drained(&harness, transform.clone(), 3, &harness.success).await;

    let processed = fixtures::content_names(&harness.success);
    assert_eq!(processed.len(), FILES);
    assert_eq!(
        fixtures::sidecar_names(&harness.success, Sidecar::Ready).len(),
        FILES
    );
    assert!(fixtures::content_names(&harness.errors).is_empty());
    assert!(fixtures::sidecar_names(&harness.input, Sidecar::Lock).is_empty());

    // One artifact per input, under <YYYY-MM>/<YYYYMMDD-HH00>/
    let artifacts = fixtures::walk_files(&harness.results);
    assert_eq!(artifacts.len(), FILES);
    for artifact in &artifacts {
        let relative = artifact.strip_prefix(&harness.results).unwrap();
        assert_eq!(relative.components().count(), 3);
        let name = artifact.file_name().unwrap().to_string_lossy().into_owned();
        let input_name = name.strip_suffix(".json").expect("artifact suffix");
        assert!(processed.contains(&input_name.to_string()));
        assert_eq!(std::fs::read_to_string(artifact).unwrap(), input_name);
    }
    assert_eq!(transform.call_count().await, FILES);
}

#[tokio::test]
async fn test_stage_recovers_after_transform_is_fixed() {
    let harness = Harness::new();
    let transform = MockTransform::failing("temporarily broken");
    let processor = harness.processor(transform.clone());
    let cancel = CancellationToken::new();

    let first = processor.process_next(&cancel).await.unwrap();
    assert_eq!(first.label(), "failed");

    transform.set_failure(None).await;
    let second = processor.process_next(&cancel).await.unwrap();
    assert_eq!(second.label(), "completed");

    assert_eq!(fixtures::content_names(&harness.errors).len(), 1);
    assert_eq!(fixtures::content_names(&harness.success).len(), 1);
    assert_eq!(fixtures::content_names(&harness.input).len(), FILES - 2);
}

//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Selection (locks won, lock races lost, empty scans)
//! - Processing (file outcomes, processing duration)
//! - Supervision (worker exits)

use once_cell::sync::Lazy;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

// =============================================================================
// Selection Metrics
// =============================================================================

/// Files selected and locked, by input directory.
pub static FILES_SELECTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("hopper_files_selected_total", "Total files selected and locked"),
        &["dir"],
    )
    .unwrap()
});

/// Lock attempts lost to another worker, by input directory.
pub static LOCK_CONTENTION: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "hopper_lock_contention_total",
            "Total lock attempts lost to a concurrent worker",
        ),
        &["dir"],
    )
    .unwrap()
});

/// Scans that found no eligible file, by input directory.
pub static EMPTY_SCANS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("hopper_empty_scans_total", "Total scans with no eligible file"),
        &["dir"],
    )
    .unwrap()
});

// =============================================================================
// Processing Metrics
// =============================================================================

/// Processed files by stage and outcome.
pub static FILES_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("hopper_files_processed_total", "Total files processed"),
        &["stage", "result"], // "completed", "failed", "stranded"
    )
    .unwrap()
});

/// Time spent on one file, from lock to release.
pub static PROCESSING_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "hopper_processing_duration_seconds",
            "Duration of one file's processing attempt",
        )
        .buckets(vec![
            0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0, 1800.0,
        ]),
        &["stage", "result"],
    )
    .unwrap()
});

// =============================================================================
// Supervision Metrics
// =============================================================================

/// Worker loop exits by stage and reason.
pub static WORKER_EXITS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("hopper_worker_exits_total", "Total worker loop exits"),
        &["stage", "reason"], // "cancelled", "failed", "panicked"
    )
    .unwrap()
});

/// Returns every core collector for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Selection
        Box::new(FILES_SELECTED.clone()),
        Box::new(LOCK_CONTENTION.clone()),
        Box::new(EMPTY_SCANS.clone()),
        // Processing
        Box::new(FILES_PROCESSED.clone()),
        Box::new(PROCESSING_DURATION.clone()),
        // Supervision
        Box::new(WORKER_EXITS.clone()),
    ]
}

/// Creates a registry holding every core collector.
pub fn registry() -> Result<Registry, prometheus::Error> {
    let registry = Registry::new();
    for metric in all_metrics() {
        registry.register(metric)?;
    }
    Ok(registry)
}

/// Encodes a registry in the Prometheus text format.
pub fn encode(registry: &Registry) -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

mod textfile;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hopper_core::{load_config, metrics, Pipeline};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    init_logging();

    // Determine config path
    let config_path = std::env::var("HOPPER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("hopper.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    for stage in &config.stages {
        info!(
            "Stage '{}': {} worker(s), {:?} -> {:?} (errors: {:?})",
            stage.name, stage.workers, stage.input.dir, stage.output.success_dir, stage.output.error_dir
        );
    }

    // Validates the configuration before building any worker
    let pipeline = Pipeline::from_config(&config).context("Failed to build pipeline")?;
    let registry = metrics::registry().context("Failed to register metrics")?;

    let cancel = CancellationToken::new();

    let exporter = config.metrics.textfile.clone().map(|path| {
        info!("Exporting metrics to {:?}", path);
        let handle = tokio::spawn(textfile::run_exporter(
            registry.clone(),
            path.clone(),
            Duration::from_secs(config.metrics.interval_secs),
            cancel.clone(),
        ));
        (handle, path)
    });

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, finishing in-flight files");
        signal_cancel.cancel();
    });

    let report = pipeline.run(cancel.clone()).await;

    // The pipeline can also stop on its own under fail-fast.
    cancel.cancel();
    if let Some((handle, path)) = exporter {
        let _ = handle.await;
        if let Err(e) = textfile::write_textfile(&registry, &path).await {
            error!("Final metrics export failed: {:#}", e);
        }
    }

    if report.has_failures() {
        for exit in report.failures() {
            if let Err(failure) = &exit.result {
                error!("[{}#{}] {}", exit.stage, exit.worker, failure);
            }
        }
        bail!("{} worker(s) failed", report.failures().count());
    }

    info!("Shutdown complete");
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let json = std::env::var("HOPPER_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

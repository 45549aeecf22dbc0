//! Prometheus textfile export.
//!
//! Writes the registry in the text exposition format to a file that a
//! node-exporter textfile collector scrapes. Each write goes to a sibling
//! temporary file first and is renamed into place, so a scrape never sees
//! a partial file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use prometheus::Registry;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use hopper_core::metrics;

/// Writes the current metric values to `path` atomically.
pub async fn write_textfile(registry: &Registry, path: &Path) -> Result<()> {
    let text = metrics::encode(registry).context("Failed to encode metrics")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }

    let tmp = temp_path(path);
    tokio::fs::write(&tmp, text)
        .await
        .with_context(|| format!("Failed to write {:?}", tmp))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to move {:?} to {:?}", tmp, path))?;

    debug!("Wrote metrics to {:?}", path);
    Ok(())
}

/// Rewrites the textfile every `interval` until cancelled.
pub async fn run_exporter(
    registry: Registry,
    path: PathBuf,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(e) = write_textfile(&registry, &path).await {
                    warn!("Metrics export failed: {:#}", e);
                }
            }
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_textfile_replaces_atomically() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("hopper.prom");
        let registry = metrics::registry().unwrap();
        metrics::WORKER_EXITS
            .with_label_values(&["textfile-test", "cancelled"])
            .inc();

        write_textfile(&registry, &path).await.unwrap();
        write_textfile(&registry, &path).await.unwrap();

        assert!(path.exists());
        assert!(!temp_path(&path).exists());
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("hopper_worker_exits_total"));
        assert!(text.contains("stage=\"textfile-test\""));
    }

    #[test]
    fn test_temp_path_is_sibling() {
        assert_eq!(
            temp_path(Path::new("/var/lib/hopper.prom")),
            PathBuf::from("/var/lib/hopper.prom.tmp")
        );
    }
}

//! Configuration for the selector module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Where and how a selector looks for work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Directory scanned for candidate files.
    pub dir: PathBuf,

    /// Glob matched against candidate file names.
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Wait between scans that found nothing to lock, in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Only select files whose ready marker exists.
    #[serde(default)]
    pub wait_for_ready: bool,
}

fn default_pattern() -> String {
    "*".to_string()
}

fn default_poll_interval() -> u64 {
    1000
}

impl SelectorConfig {
    /// Creates a config for a directory with default settings.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            pattern: default_pattern(),
            poll_interval_ms: default_poll_interval(),
            wait_for_ready: false,
        }
    }

    /// Sets the filename pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Sets the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Requires ready markers.
    pub fn with_wait_for_ready(mut self, enabled: bool) -> Self {
        self.wait_for_ready = enabled;
        self
    }

    /// Poll interval as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_toml() {
        let config: SelectorConfig = toml::from_str(r#"dir = "/data/in""#).unwrap();
        assert_eq!(config.dir, PathBuf::from("/data/in"));
        assert_eq!(config.pattern, "*");
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert!(!config.wait_for_ready);
    }

    #[test]
    fn test_config_builder() {
        let config = SelectorConfig::new("/data/in")
            .with_pattern("*.txt")
            .with_poll_interval(Duration::from_millis(100))
            .with_wait_for_ready(true);

        assert_eq!(config.pattern, "*.txt");
        assert_eq!(config.poll_interval_ms, 100);
        assert!(config.wait_for_ready);
    }
}

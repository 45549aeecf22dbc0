//! Types for the processor module.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// What happened to one file in one processing attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Processed and moved to the success directory with a ready marker.
    Completed { path: PathBuf, artifact: PathBuf },
    /// Processing failed; moved to the error directory with an error marker.
    Failed { path: PathBuf, reason: String },
    /// Routing failed; the file stayed where it was and will be retried.
    Stranded { path: PathBuf, reason: String },
}

impl FileOutcome {
    /// Short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
            Self::Stranded { .. } => "stranded",
        }
    }

    /// Where the file is after this attempt.
    pub fn path(&self) -> &Path {
        match self {
            Self::Completed { path, .. } | Self::Failed { path, .. } | Self::Stranded { path, .. } => {
                path
            }
        }
    }
}

/// Artifact location for an input file processed at `now`.
///
/// `<results>/<YYYY-MM>/<YYYYMMDD-HH00>/<file_name>.<suffix>`: a monthly
/// bucket, then an hourly one, so concurrent runs do not collide and the
/// tree stays browsable in time order.
pub fn artifact_path_at<Tz>(
    results_dir: &Path,
    now: &DateTime<Tz>,
    file_name: &OsStr,
    suffix: &str,
) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut name = file_name.to_os_string();
    if !suffix.is_empty() {
        name.push(".");
        name.push(suffix.trim_start_matches('.'));
    }
    results_dir
        .join(now.format("%Y-%m").to_string())
        .join(now.format("%Y%m%d-%H00").to_string())
        .join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_artifact_path_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 14, 42, 9).unwrap();
        let path = artifact_path_at(Path::new("/results"), &now, OsStr::new("clip.mp4"), "json");
        assert_eq!(
            path,
            PathBuf::from("/results/2024-03/20240307-1400/clip.mp4.json")
        );
    }

    #[test]
    fn test_artifact_path_suffix_forms() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 0, 5, 0).unwrap();
        let dotted = artifact_path_at(Path::new("/r"), &now, OsStr::new("a"), ".txt");
        assert_eq!(dotted, PathBuf::from("/r/2024-12/20241231-0000/a.txt"));

        let bare = artifact_path_at(Path::new("/r"), &now, OsStr::new("a"), "");
        assert_eq!(bare, PathBuf::from("/r/2024-12/20241231-0000/a"));
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = FileOutcome::Failed {
            path: PathBuf::from("/err/a.txt"),
            reason: "boom".to_string(),
        };
        assert_eq!(outcome.label(), "failed");
        assert_eq!(outcome.path(), Path::new("/err/a.txt"));

        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"result\":\"failed\""));
        assert!(json.contains("\"reason\":\"boom\""));
    }
}

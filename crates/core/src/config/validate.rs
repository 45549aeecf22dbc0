use std::collections::HashSet;

use globset::Glob;

use super::{types::Config, ConfigError};
use crate::transform::TransformConfig;

/// Validate configuration
/// Currently validates:
/// - At least one stage is configured
/// - Stage names are non-empty and unique
/// - Every stage has at least one worker and a non-zero poll interval
/// - Input patterns are valid globs
/// - A stage never routes files back into its own input directory
/// - Stages fed by another stage's success directory wait for ready markers
/// - Each stage writes artifacts to its own results directory
/// - Command transforms name a program
/// - Metrics textfile interval is non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.stages.is_empty() {
        return Err(invalid("at least one [[stages]] entry is required"));
    }

    let mut names = HashSet::new();
    for stage in &config.stages {
        if stage.name.trim().is_empty() {
            return Err(invalid("stage name cannot be empty"));
        }
        if !names.insert(stage.name.as_str()) {
            return Err(invalid(format!("duplicate stage name '{}'", stage.name)));
        }
        if stage.workers == 0 {
            return Err(invalid(format!(
                "stage '{}': workers must be at least 1",
                stage.name
            )));
        }
        if stage.input.poll_interval_ms == 0 {
            return Err(invalid(format!(
                "stage '{}': input.poll_interval_ms cannot be 0",
                stage.name
            )));
        }
        if let Err(e) = Glob::new(&stage.input.pattern) {
            return Err(invalid(format!(
                "stage '{}': invalid input.pattern '{}': {}",
                stage.name, stage.input.pattern, e
            )));
        }
        if stage.input.dir == stage.output.success_dir {
            return Err(invalid(format!(
                "stage '{}': output.success_dir must differ from input.dir",
                stage.name
            )));
        }
        if stage.input.dir == stage.output.error_dir {
            return Err(invalid(format!(
                "stage '{}': output.error_dir must differ from input.dir",
                stage.name
            )));
        }
        if stage.output.artifact_suffix.is_empty() {
            return Err(invalid(format!(
                "stage '{}': output.artifact_suffix cannot be empty",
                stage.name
            )));
        }
        if let TransformConfig::Command { program, .. } = &stage.transform {
            if program.trim().is_empty() {
                return Err(invalid(format!(
                    "stage '{}': transform.program cannot be empty",
                    stage.name
                )));
            }
        }
    }

    // Artifact names carry no stage, so stages sharing a results tree overwrite each other.
    for (i, stage) in config.stages.iter().enumerate() {
        let shared = config.stages[..i]
            .iter()
            .find(|other| other.output.results_dir == stage.output.results_dir);
        if let Some(other) = shared {
            return Err(invalid(format!(
                "stages '{}' and '{}' share output.results_dir {:?}",
                other.name, stage.name, stage.output.results_dir
            )));
        }
    }

    // A downstream stage must not pick up files its upstream is still routing.
    for stage in &config.stages {
        let upstream = config
            .stages
            .iter()
            .find(|other| other.output.success_dir == stage.input.dir);
        if let Some(upstream) = upstream {
            if !stage.input.wait_for_ready {
                return Err(invalid(format!(
                    "stage '{}' consumes the output of '{}' and must set input.wait_for_ready = true",
                    stage.name, upstream.name
                )));
            }
        }
    }

    if config.metrics.textfile.is_some() && config.metrics.interval_secs == 0 {
        return Err(invalid("metrics.interval_secs cannot be 0"));
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StageConfig;
    use crate::processor::ProcessorConfig;
    use crate::selector::SelectorConfig;

    fn stage(name: &str, input: &str, success: &str) -> StageConfig {
        StageConfig {
            name: name.to_string(),
            workers: 1,
            input: SelectorConfig::new(input),
            output: ProcessorConfig::new(
                success,
                format!("/err/{name}"),
                format!("/results/{name}"),
            ),
            transform: TransformConfig::default(),
        }
    }

    fn config(stages: Vec<StageConfig>) -> Config {
        Config {
            stages,
            ..Config::default()
        }
    }

    fn assert_invalid(config: &Config, needle: &str) {
        match validate_config(config) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains(needle), "'{msg}' does not mention '{needle}'")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_valid_chain() {
        let mut second = stage("b", "/b", "/c");
        second.input.wait_for_ready = true;
        let config = config(vec![stage("a", "/a", "/b"), second]);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_no_stages_fails() {
        assert_invalid(&Config::default(), "at least one");
    }

    #[test]
    fn test_validate_duplicate_names_fails() {
        let config = config(vec![stage("a", "/a", "/b"), stage("a", "/x", "/y")]);
        assert_invalid(&config, "duplicate stage name");
    }

    #[test]
    fn test_validate_empty_name_fails() {
        assert_invalid(&config(vec![stage(" ", "/a", "/b")]), "name cannot be empty");
    }

    #[test]
    fn test_validate_zero_workers_fails() {
        let mut s = stage("a", "/a", "/b");
        s.workers = 0;
        assert_invalid(&config(vec![s]), "workers");
    }

    #[test]
    fn test_validate_zero_poll_interval_fails() {
        let mut s = stage("a", "/a", "/b");
        s.input.poll_interval_ms = 0;
        assert_invalid(&config(vec![s]), "poll_interval_ms");
    }

    #[test]
    fn test_validate_bad_glob_fails() {
        let mut s = stage("a", "/a", "/b");
        s.input.pattern = "[".to_string();
        assert_invalid(&config(vec![s]), "invalid input.pattern");
    }

    #[test]
    fn test_validate_success_dir_loop_fails() {
        assert_invalid(&config(vec![stage("a", "/a", "/a")]), "success_dir");
    }

    #[test]
    fn test_validate_error_dir_loop_fails() {
        let mut s = stage("a", "/a", "/b");
        s.output.error_dir = "/a".into();
        assert_invalid(&config(vec![s]), "error_dir");
    }

    #[test]
    fn test_validate_downstream_without_ready_fails() {
        let config = config(vec![stage("a", "/a", "/b"), stage("b", "/b", "/c")]);
        assert_invalid(&config, "wait_for_ready");
    }

    #[test]
    fn test_validate_shared_results_dir_fails() {
        let mut second = stage("b", "/b", "/c");
        second.input.wait_for_ready = true;
        second.output.results_dir = "/results/a".into();
        let config = config(vec![stage("a", "/a", "/b"), second]);
        assert_invalid(&config, "share output.results_dir");
    }

    #[test]
    fn test_validate_empty_command_fails() {
        let mut s = stage("a", "/a", "/b");
        s.transform = TransformConfig::Command {
            program: String::new(),
            args: vec![],
            timeout_secs: None,
        };
        assert_invalid(&config(vec![s]), "transform.program");
    }

    #[test]
    fn test_validate_zero_metrics_interval_fails() {
        let mut config = config(vec![stage("a", "/a", "/b")]);
        config.metrics.textfile = Some("/tmp/hopper.prom".into());
        config.metrics.interval_secs = 0;
        assert_invalid(&config, "interval_secs");
    }
}

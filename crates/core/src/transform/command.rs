//! Command transform: hands each file to an external program.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::error::TransformError;
use super::traits::Transform;
use crate::file::File;

/// Placeholder replaced with the input file path.
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Placeholder replaced with the artifact path.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Keep at most this much stderr in an error message.
const STDERR_TAIL_BYTES: usize = 2048;

/// Runs an external program once per file.
///
/// Arguments may contain `{input}` and `{output}`. The program's stdin is
/// closed, stdout discarded and stderr captured for error reports. A child
/// that outlives its timeout is killed.
#[derive(Debug, Clone)]
pub struct CommandTransform {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandTransform {
    /// Creates a command transform.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    /// Kills the program if it runs longer than `limit`.
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Arguments with placeholders substituted.
    pub fn render_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, &input)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            })
            .collect()
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.len() <= STDERR_TAIL_BYTES {
        return text.to_string();
    }
    let mut start = text.len() - STDERR_TAIL_BYTES;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    format!("...{}", &text[start..])
}

#[async_trait]
impl Transform for CommandTransform {
    fn name(&self) -> &str {
        &self.program
    }

    async fn process(&self, output: &Path, file: &File) -> Result<(), TransformError> {
        let args = self.render_args(file.path(), output);
        debug!("Running {} {:?}", self.program, args);

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TransformError::CommandNotFound {
                        program: self.program.clone(),
                    }
                } else {
                    TransformError::io(&self.program, e)
                }
            })?;

        let finished = match self.timeout {
            Some(limit) => timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| TransformError::Timeout {
                    program: self.program.clone(),
                    timeout_secs: limit.as_secs(),
                })?,
            None => child.wait_with_output().await,
        };
        let result = finished.map_err(|e| TransformError::io(&self.program, e))?;

        if !result.status.success() {
            return Err(TransformError::CommandFailed {
                program: self.program.clone(),
                status: result.status.to_string(),
                stderr: stderr_tail(&result.stderr),
            });
        }
        Ok(())
    }
}

//! External tool invocation.
//!
//! Builds the headless command line for the external processor, runs it as a
//! child process, and captures its output and exit status. The invocation
//! blocks the calling task until the tool exits (or the optional watchdog
//! fires).

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::{debug, error, info};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, STDERR_ERROR_LIMIT};

/// Result of one external tool invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Exit code (0 on success).
    pub exit_code: i32,
    /// Wall-clock duration of the invocation.
    pub duration: Duration,
}

/// Invokes the external tool in headless batch mode.
#[derive(Debug, Clone)]
pub struct BlenderInvoker {
    /// Resolved path to the tool executable.
    executable: PathBuf,
    /// Directory holding the transform scripts.
    scripts_dir: PathBuf,
    /// Watchdog timeout in seconds; `0` disables it.
    timeout_seconds: u64,
    /// Whether stdout/stderr are captured.
    capture_output: bool,
}

impl BlenderInvoker {
    /// Build an invoker from a pipeline configuration.
    ///
    /// A missing executable is not detected here; the spawn reports it as
    /// [`PipelineError::ToolNotFound`].
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            executable: config.executable(),
            scripts_dir: config.scripts_dir.clone(),
            timeout_seconds: config.timeout_seconds,
            capture_output: config.capture_output,
        }
    }

    /// Build an invoker around an explicit executable path.
    pub fn new(executable: PathBuf, scripts_dir: PathBuf) -> Self {
        Self {
            executable,
            scripts_dir,
            timeout_seconds: 0,
            capture_output: true,
        }
    }

    /// The resolved executable path.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Run a transform script with positional arguments.
    ///
    /// The command line is
    /// `<executable> --background --python <scripts_dir>/<script> -- <args…>`.
    pub async fn run(
        &self,
        script: &str,
        args: &[String],
    ) -> Result<Invocation, PipelineError> {
        let script_path = self.scripts_dir.join(script);

        let mut cmd = Command::new(&self.executable);
        cmd.arg("--background")
            .arg("--python")
            .arg(&script_path)
            .arg("--")
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if self.capture_output {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        info!(
            executable = %self.executable.display(),
            script = %script_path.display(),
            args = ?args,
            "Invoking external tool"
        );

        let start = Instant::now();

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                error!(
                    executable = %self.executable.display(),
                    "External tool executable not found"
                );
                return Err(PipelineError::ToolNotFound {
                    path: self.executable.clone(),
                });
            }
            Err(e) => return Err(PipelineError::Io(e)),
        };

        let output = if self.timeout_seconds > 0 {
            let timeout = Duration::from_secs(self.timeout_seconds);
            match tokio::time::timeout(timeout, child.wait_with_output()).await {
                Ok(result) => result?,
                Err(_) => {
                    // Dropping the wait future kills the child (kill_on_drop)
                    error!(
                        timeout_s = self.timeout_seconds,
                        "External tool timed out, killing"
                    );
                    return Err(PipelineError::ToolTimedOut {
                        seconds: self.timeout_seconds,
                    });
                }
            }
        } else {
            child.wait_with_output().await?
        };

        let duration = start.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !stdout.is_empty() {
            debug!(stdout = %stdout, "External tool stdout");
        }
        if !stderr.is_empty() {
            debug!(stderr = %stderr, "External tool stderr");
        }

        if !output.status.success() {
            let exit_code = output.status.code().unwrap_or(-1);
            error!(
                exit_code,
                elapsed_ms = duration.as_millis() as u64,
                stderr = %stderr,
                "External tool failed"
            );
            return Err(PipelineError::ToolExecutionFailed {
                exit_code,
                stderr: stderr.chars().take(STDERR_ERROR_LIMIT).collect(),
            });
        }

        info!(
            elapsed_ms = duration.as_millis() as u64,
            "External tool completed"
        );

        Ok(Invocation {
            stdout,
            stderr,
            exit_code: output.status.code().unwrap_or(0),
            duration,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn stub_tool(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("fake-blender");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write stub");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
        path
    }

    #[tokio::test]
    async fn test_captures_stdout_stderr_and_exit_code() {
        let temp = tempfile::tempdir().expect("tempdir");
        let exe = stub_tool(temp.path(), "echo processing; echo notice >&2; exit 0");

        let invoker = BlenderInvoker::new(exe, temp.path().to_path_buf());
        let invocation = invoker.run("solidify.py", &[]).await.expect("run");

        assert_eq!(invocation.exit_code, 0);
        assert!(invocation.stdout.contains("processing"));
        assert!(invocation.stderr.contains("notice"));
    }

    #[tokio::test]
    async fn test_argument_vector_shape() {
        let temp = tempfile::tempdir().expect("tempdir");
        let exe = stub_tool(temp.path(), "echo \"$@\"");

        let invoker = BlenderInvoker::new(exe, PathBuf::from("/opt/scripts"));
        let args = vec![
            "/tmp/in.stl".to_string(),
            "/tmp/out.stl".to_string(),
            "2.5".to_string(),
            "true".to_string(),
        ];
        let invocation = invoker.run("solidify.py", &args).await.expect("run");

        let rendered = invocation.stdout.trim();
        assert_eq!(
            rendered,
            "--background --python /opt/scripts/solidify.py -- /tmp/in.stl /tmp/out.stl 2.5 true"
        );
    }

    #[tokio::test]
    async fn test_missing_executable_is_tool_not_found() {
        let invoker = BlenderInvoker::new(
            PathBuf::from("/nonexistent/fake-blender"),
            PathBuf::from("/opt/scripts"),
        );
        let result = invoker.run("solidify.py", &[]).await;
        assert!(matches!(result, Err(PipelineError::ToolNotFound { .. })));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_execution_failure() {
        let temp = tempfile::tempdir().expect("tempdir");
        let exe = stub_tool(temp.path(), "echo 'solidify blew up' >&2; exit 7");

        let invoker = BlenderInvoker::new(exe, temp.path().to_path_buf());
        let result = invoker.run("solidify.py", &[]).await;

        match result {
            Err(PipelineError::ToolExecutionFailed { exit_code, stderr }) => {
                assert_eq!(exit_code, 7);
                assert!(stderr.contains("solidify blew up"));
            }
            other => panic!("expected ToolExecutionFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_watchdog_kills_hung_tool() {
        let temp = tempfile::tempdir().expect("tempdir");
        let exe = stub_tool(temp.path(), "sleep 30");

        let mut invoker = BlenderInvoker::new(exe, temp.path().to_path_buf());
        invoker.timeout_seconds = 1;

        let result = invoker.run("solidify.py", &[]).await;
        assert!(matches!(
            result,
            Err(PipelineError::ToolTimedOut { seconds: 1 })
        ));
    }
}

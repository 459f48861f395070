//! Command execution for external tools.
//!
//! This module runs external programs (VCS status commands and linters)
//! with timeout support and output capture. Execution is async internally
//! on a single-threaded runtime, but callers see a blocking API.

use crate::core::error::{Error, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::runtime::Runtime;
use tokio::time::timeout;

/// Default bound on a single external invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Output from a command execution.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code of the command.
    pub exit_code: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
    /// Whether the command was killed due to timeout.
    pub timed_out: bool,
    /// Duration the command took to run.
    pub duration: Duration,
}

impl CommandOutput {
    /// Returns true if the command succeeded (exit code 0).
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }

    /// Returns combined stdout and stderr output.
    #[must_use]
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout.trim_end(), self.stderr)
        }
    }
}

/// Options for command execution.
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Working directory for the command.
    pub cwd: Option<std::path::PathBuf>,
    /// Timeout for the command.
    pub timeout: Option<Duration>,
    /// Environment variables to set.
    pub env: Vec<(String, String)>,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            timeout: Some(DEFAULT_TIMEOUT),
            env: Vec::new(),
        }
    }
}

impl ExecuteOptions {
    /// Sets the working directory.
    #[must_use]
    pub fn cwd(mut self, path: impl AsRef<Path>) -> Self {
        self.cwd = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets an environment variable.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Executor for running external programs.
///
/// Owns a current-thread tokio runtime; every call blocks until the child
/// exits or its timeout fires.
#[derive(Debug)]
pub struct Executor {
    runtime: Runtime,
}

impl Executor {
    /// Creates a new executor.
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Internal {
                message: format!("Failed to create runtime: {e}"),
            })?;

        Ok(Self { runtime })
    }

    /// Runs `program` with `args` and captures its output.
    ///
    /// A program that cannot be found yields [`Error::CommandNotFound`].
    /// A timed out program is killed and reported through
    /// [`CommandOutput::timed_out`] rather than as an error.
    pub fn execute<S: AsRef<str>>(
        &self,
        program: &str,
        args: &[S],
        options: &ExecuteOptions,
    ) -> Result<CommandOutput> {
        self.runtime.block_on(execute_async(program, args, options))
    }

    /// Checks if a command exists in PATH.
    #[must_use]
    pub fn command_exists(command: &str) -> bool {
        which::which(command).is_ok()
    }
}

async fn execute_async<S: AsRef<str>>(
    program: &str,
    args: &[S],
    options: &ExecuteOptions,
) -> Result<CommandOutput> {
    let start = std::time::Instant::now();

    let mut cmd = Command::new(program);
    for arg in args {
        let arg: &str = arg.as_ref();
        cmd.arg(arg);
    }

    if let Some(ref cwd) = options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tracing::debug!(program, args = args.len(), "spawning command");

    let mut child = cmd.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::CommandNotFound {
                command: program.to_string(),
            }
        } else {
            Error::io(format!("spawn {program}"), e)
        }
    })?;

    let result = if let Some(timeout_duration) = options.timeout {
        match timeout(timeout_duration, wait_for_output(&mut child)).await {
            Ok(result) => result,
            Err(_) => {
                // Kill the process on timeout - ignore result since we're returning anyway
                drop(child.kill().await);
                tracing::warn!(
                    program,
                    timeout = %humantime::format_duration(timeout_duration),
                    "command timed out"
                );
                return Ok(CommandOutput {
                    exit_code: 124,
                    stdout: String::new(),
                    stderr: "Command timed out".to_string(),
                    timed_out: true,
                    duration: start.elapsed(),
                });
            },
        }
    } else {
        wait_for_output(&mut child).await
    };

    let (exit_code, stdout, stderr) = result?;

    Ok(CommandOutput {
        exit_code,
        stdout,
        stderr,
        timed_out: false,
        duration: start.elapsed(),
    })
}

/// Waits for the child to exit while draining both pipes.
async fn wait_for_output(child: &mut tokio::process::Child) -> Result<(i32, String, String)> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let stdout_handle = tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut stdout) = stdout {
            if let Err(e) = stdout.read_to_end(&mut buf).await {
                tracing::debug!(error = %e, "stdout read interrupted");
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    });

    let stderr_handle = tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut stderr) = stderr {
            if let Err(e) = stderr.read_to_end(&mut buf).await {
                tracing::debug!(error = %e, "stderr read interrupted");
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    });

    let status = child
        .wait()
        .await
        .map_err(|e| Error::io("wait for command", e))?;

    let stdout = stdout_handle.await.map_err(|e| Error::Internal {
        message: format!("stdout task failed: {e}"),
    })?;
    let stderr = stderr_handle.await.map_err(|e| Error::Internal {
        message: format!("stderr task failed: {e}"),
    })?;

    Ok((status.code().unwrap_or(1), stdout, stderr))
}

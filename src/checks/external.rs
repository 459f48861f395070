//! External lint tools.
//!
//! An [`ExternalTool`] runs a fixed argv with the selected files appended
//! and returns whatever the tool printed. The tool's exit status is not
//! interpreted; only the text decides whether something was flagged.

use crate::core::error::{Error, Result};
use crate::core::executor::{ExecuteOptions, Executor, DEFAULT_TIMEOUT};
use crate::core::registry::Check;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

/// Behaviour when the tool's program is not installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingTool {
    /// Report the missing program as the checker's failure.
    Fail,
    /// Log a warning and report nothing.
    Warn,
}

/// A checker backed by an external program.
#[derive(Debug)]
pub struct ExternalTool {
    name: String,
    argv: Vec<String>,
    executor: Rc<Executor>,
    timeout: Duration,
    missing: MissingTool,
}

impl ExternalTool {
    /// Creates a tool named `name` running `argv` (program first).
    #[must_use]
    pub fn new(name: impl Into<String>, argv: Vec<String>, executor: Rc<Executor>) -> Self {
        Self {
            name: name.into(),
            argv,
            executor,
            timeout: DEFAULT_TIMEOUT,
            missing: MissingTool::Fail,
        }
    }

    /// Sets the per-invocation timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the missing-program behaviour.
    #[must_use]
    pub const fn on_missing(mut self, missing: MissingTool) -> Self {
        self.missing = missing;
        self
    }

    /// Returns the full argument list for `files`, program excluded.
    #[must_use]
    pub fn args_for(&self, files: &[PathBuf]) -> Vec<String> {
        self.argv
            .iter()
            .skip(1)
            .cloned()
            .chain(files.iter().map(|f| f.to_string_lossy().into_owned()))
            .collect()
    }

    fn program(&self) -> Result<&str> {
        self.argv
            .first()
            .map(String::as_str)
            .ok_or_else(|| Error::Internal {
                message: format!("{} has an empty command", self.name),
            })
    }
}

impl Check for ExternalTool {
    fn run(&self, files: &[PathBuf]) -> Result<String> {
        let program = self.program()?;
        let args = self.args_for(files);
        let options = ExecuteOptions::default().timeout(self.timeout);

        let output = match self.executor.execute(program, &args, &options) {
            Ok(output) => output,
            Err(Error::CommandNotFound { command }) if self.missing == MissingTool::Warn => {
                tracing::warn!(
                    checker = %self.name,
                    command = %command,
                    "{command} is not installed, skipping {}",
                    self.name
                );
                return Ok(String::new());
            },
            Err(e) => return Err(e),
        };

        if output.timed_out {
            return Err(Error::CheckTimeout {
                name: self.name.clone(),
                timeout: humantime::format_duration(self.timeout).to_string(),
            });
        }

        tracing::debug!(
            checker = %self.name,
            exit_code = output.exit_code,
            duration_ms = u64::try_from(output.duration.as_millis()).unwrap_or(u64::MAX),
            "tool finished"
        );

        Ok(output.combined_output())
    }
}

//! Checker dispatch and report aggregation.
//!
//! The dispatcher runs every registered checker, in registration order,
//! against its selection of the candidate [`FileSet`] and aggregates the
//! returned text into a [`Report`].

use crate::core::collector::FileSet;
use crate::core::registry::Registry;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Width the banner is padded to with trailing `*`.
const BANNER_WIDTH: usize = 43;

/// Output of a single checker that was given at least one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutput {
    /// Name of the checker.
    pub name: String,
    /// Files the checker was invoked with.
    pub files: Vec<PathBuf>,
    /// Text the checker returned.
    pub output: String,
}

impl CheckOutput {
    /// Returns true if the checker reported anything.
    #[must_use]
    pub fn flagged(&self) -> bool {
        !self.output.trim().is_empty()
    }
}

/// Aggregated result of one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Checkers that ran, in registration order.
    pub checks: Vec<CheckOutput>,
    /// Checkers that had no matching files.
    pub skipped: Vec<String>,
}

impl Report {
    /// Returns true if no checker flagged anything.
    #[must_use]
    pub fn success(&self) -> bool {
        !self.checks.iter().any(CheckOutput::flagged)
    }

    /// Returns the checkers that flagged something.
    pub fn flagged(&self) -> impl Iterator<Item = &CheckOutput> {
        self.checks.iter().filter(|c| c.flagged())
    }

    /// Returns the number of checkers that flagged something.
    #[must_use]
    pub fn flagged_count(&self) -> usize {
        self.flagged().count()
    }

    /// Renders every flagged checker's output under its banner.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for check in self.flagged() {
            out.push_str(&banner(&check.name));
            out.push('\n');
            out.push_str(check.output.trim_end());
            out.push_str("\n\n");
        }
        out
    }
}

/// Builds the `***** name *****...` banner line for a checker.
#[must_use]
pub fn banner(name: &str) -> String {
    let fill = BANNER_WIDTH.saturating_sub(name.chars().count());
    format!("{} {} {}", "*".repeat(5), name, "*".repeat(fill))
}

/// Runs registered checkers over a file set.
#[derive(Debug)]
pub struct Dispatcher<'a> {
    registry: &'a Registry,
    progress: bool,
}

impl<'a> Dispatcher<'a> {
    /// Creates a dispatcher over `registry`.
    #[must_use]
    pub const fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            progress: false,
        }
    }

    /// Shows a spinner naming the running checker.
    #[must_use]
    pub const fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Runs every checker against `files`.
    ///
    /// A checker that fails (missing tool, timeout) does not stop the run;
    /// its error text becomes its output, so it counts as flagged.
    pub fn dispatch(&self, files: &FileSet) -> Report {
        let mut report = Report::default();

        for checker in self.registry.iter() {
            let spinner = self.spinner(checker.name());

            let outcome = checker.apply(files);
            spinner.finish_and_clear();

            match outcome {
                Ok(None) => {
                    tracing::debug!(checker = checker.name(), "no matching files, skipped");
                    report.skipped.push(checker.name().to_string());
                },
                Ok(Some((selected, output))) => {
                    tracing::debug!(
                        checker = checker.name(),
                        files = selected.len(),
                        flagged = !output.trim().is_empty(),
                        "checker finished"
                    );
                    report.checks.push(CheckOutput {
                        name: checker.name().to_string(),
                        files: selected,
                        output,
                    });
                },
                Err(e) => {
                    tracing::error!(checker = checker.name(), error = %e, "checker failed");
                    report.checks.push(CheckOutput {
                        name: checker.name().to_string(),
                        files: checker.select(files),
                        output: format!("error: {e}"),
                    });
                },
            }
        }

        report
    }

    fn spinner(&self, name: &str) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .ok()
                .unwrap_or_else(ProgressStyle::default_spinner),
        );
        pb.set_message(format!("Running {name}..."));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

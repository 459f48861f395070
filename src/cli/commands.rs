//! CLI command implementations.

use super::{GlobalOptions, OutputFormat};
use crate::checks::builtin::{self, BUILTINS};
use crate::config::Config;
use crate::core::collector::{self, FileSet};
use crate::core::dispatcher::{Dispatcher, Report};
use crate::core::error::{Error, Result};
use crate::core::executor::Executor;
use crate::core::hooks::{self, InstallOutcome, UninstallOutcome};
use crate::core::registry::Registry;
use crate::core::vcs;
use console::style;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

/// Environment variable that skips every check when set to `1`.
const SKIP_ENV: &str = "PRECHECK_SKIP";

/// Loads configuration, honouring `--config` and `--timeout`.
fn load_config(options: &GlobalOptions) -> Result<Config> {
    let mut config = match options.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load_or_default()?,
    };

    if let Some(ref timeout) = options.timeout {
        config.timeout.clone_from(timeout);
        config.validate()?;
    }

    Ok(config)
}

/// Builds the registry of enabled built-in checkers.
fn build_registry(config: &Config, executor: &Rc<Executor>) -> Result<Registry> {
    let mut registry = Registry::new();
    builtin::register_builtins(&mut registry, config, executor)?;
    Ok(registry)
}

/// Collects the files the working copy reports as added or modified,
/// relative to the working directory.
fn changed_files(config: &Config, executor: &Executor) -> Result<FileSet> {
    let detection = vcs::detect()?;
    tracing::debug!(vcs = %detection.vcs, root = %detection.root.display(), "using working copy");

    let changed = vcs::changed_files(executor, &detection, config.timeout()?)?;

    let cwd = std::env::current_dir()
        .and_then(|cwd| cwd.canonicalize())
        .map_err(|e| Error::io("get current dir", e))?;

    Ok(FileSet::existing(changed).relative_to(&cwd))
}

/// Run checks.
pub fn run(paths: &[PathBuf], options: &GlobalOptions, format: OutputFormat) -> Result<ExitCode> {
    // Check for skip
    if std::env::var(SKIP_ENV).ok().as_deref() == Some("1") {
        if !options.quiet {
            eprintln!("{} Skipping checks ({SKIP_ENV}=1)", style("•").cyan());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(options)?;
    let executor = Rc::new(Executor::new()?);
    let registry = build_registry(&config, &executor)?;

    let files = if paths.is_empty() {
        changed_files(&config, &executor)?
    } else {
        collector::collect(paths, &config.ignore_set()?)
    };

    tracing::debug!(files = files.len(), checkers = registry.len(), "dispatching");

    if files.is_empty() && !options.quiet {
        eprintln!("{} No files to check", style("•").cyan());
    }

    let progress = !options.quiet && std::io::stderr().is_terminal();
    let report = Dispatcher::new(&registry)
        .with_progress(progress)
        .dispatch(&files);

    write_report(&report, format)?;

    if !options.quiet {
        print_summary(&report, files.len());
    }

    Ok(if report.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Writes the report to stdout.
fn write_report(report: &Report, format: OutputFormat) -> Result<()> {
    let text = match format {
        OutputFormat::Text => report.render(),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(report).map_err(|e| Error::Internal {
                message: format!("Failed to serialize report: {e}"),
            })?;
            json.push('\n');
            json
        },
    };

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| Error::io("write output", e))
}

/// Prints the one-line outcome to stderr.
fn print_summary(report: &Report, file_count: usize) {
    if report.success() {
        eprintln!(
            "{} No issues ({} file(s), {} checker(s) run, {} skipped)",
            style("✓").green().bold(),
            file_count,
            report.checks.len(),
            report.skipped.len()
        );
    } else {
        let names: Vec<&str> = report.flagged().map(|c| c.name.as_str()).collect();
        eprintln!(
            "{} {} checker(s) reported issues: {}",
            style("✗").red().bold(),
            report.flagged_count(),
            names.join(", ")
        );
    }
}

/// Show the detected working copy.
pub fn detect() -> Result<ExitCode> {
    let detection = vcs::detect()?;

    eprintln!("Detected vcs: {}", style(detection.vcs).bold());
    eprintln!("Root: {}", detection.root.display());

    Ok(ExitCode::SUCCESS)
}

/// List registered checkers.
pub fn list(options: &GlobalOptions) -> Result<ExitCode> {
    let config = load_config(options)?;
    let executor = Rc::new(Executor::new()?);
    let registry = build_registry(&config, &executor)?;

    eprintln!("{}", style("Checkers (in dispatch order):").bold());
    for spec in BUILTINS {
        let Some(checker) = registry.get(spec.name) else {
            eprintln!("  {} - {}", style(spec.name).dim(), style("disabled").yellow());
            continue;
        };

        let mut globs = checker.include_glob().to_string();
        let excludes = checker.exclude_globs();
        if !excludes.is_empty() {
            globs.push_str(&format!(" (excluding {})", excludes.join(", ")));
        }

        eprintln!("  {} - {}", style(spec.name).cyan(), spec.description);
        eprintln!("      files: {globs}");

        let program = match config.checker(spec.name).command {
            Some(argv) => argv.into_iter().next(),
            None => spec
                .default_command
                .and_then(|argv| argv.first())
                .map(ToString::to_string),
        };
        if let Some(program) = program {
            if !Executor::command_exists(&program) {
                eprintln!("      {} {program} not found in PATH", style("!").yellow());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Validate configuration.
pub fn validate(options: &GlobalOptions) -> Result<ExitCode> {
    let loaded = match options.config {
        Some(ref path) => Config::load_from(path),
        None => Config::load(),
    };

    match loaded {
        Ok(config) => match config.validate() {
            Ok(()) => {
                eprintln!("{} Configuration is valid", style("✓").green());
                Ok(ExitCode::SUCCESS)
            },
            Err(e) => {
                eprintln!("{} Configuration validation failed: {e}", style("✗").red());
                Ok(ExitCode::FAILURE)
            },
        },
        Err(Error::ConfigNotFound { path }) => {
            eprintln!(
                "{} Configuration not found: {}",
                style("!").yellow(),
                path.display()
            );
            eprintln!("  Built-in defaults apply. Example configuration:\n");
            eprintln!("{}", Config::default_toml());
            Ok(ExitCode::FAILURE)
        },
        Err(e) => {
            eprintln!("{} Failed to load configuration: {e}", style("✗").red());
            Ok(ExitCode::FAILURE)
        },
    }
}

/// Install git hook.
pub fn install(force: bool) -> Result<ExitCode> {
    let detection = vcs::detect()?;
    let hooks_dir = hooks::hooks_dir(&detection)?;

    match hooks::install(&hooks_dir, force)? {
        InstallOutcome::AlreadyInstalled(path) => {
            eprintln!(
                "{} Hook already installed at {}",
                style("✓").green(),
                path.display()
            );
        },
        InstallOutcome::Replaced { hook, backup } => {
            eprintln!(
                "{} Backed up existing hook to {}",
                style("•").cyan(),
                backup.display()
            );
            eprintln!(
                "{} Installed pre-commit hook at {}",
                style("✓").green(),
                hook.display()
            );
        },
        InstallOutcome::Installed(path) => {
            eprintln!(
                "{} Installed pre-commit hook at {}",
                style("✓").green(),
                path.display()
            );
        },
    }

    Ok(ExitCode::SUCCESS)
}

/// Uninstall git hook.
pub fn uninstall() -> Result<ExitCode> {
    let detection = vcs::detect()?;
    let hooks_dir = hooks::hooks_dir(&detection)?;

    match hooks::uninstall(&hooks_dir)? {
        UninstallOutcome::NotInstalled(path) => {
            eprintln!(
                "{} No hook installed at {}",
                style("•").cyan(),
                path.display()
            );
            Ok(ExitCode::SUCCESS)
        },
        UninstallOutcome::Foreign(path) => {
            eprintln!(
                "{} Hook at {} was not installed by precheck",
                style("!").yellow(),
                path.display()
            );
            eprintln!("  Remove manually if desired.");
            Ok(ExitCode::FAILURE)
        },
        UninstallOutcome::Removed { hook, backup } => {
            eprintln!(
                "{} Removed pre-commit hook from {}",
                style("✓").green(),
                hook.display()
            );
            if let Some(backup) = backup {
                eprintln!(
                    "  Backup exists at {} - restore if needed",
                    backup.display()
                );
            }
            Ok(ExitCode::SUCCESS)
        },
    }
}

/// Generate shell completions.
pub fn completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    clap_complete::generate(
        shell,
        &mut super::Cli::command(),
        "precheck",
        &mut std::io::stdout(),
    );
}

//! Command-line interface for precheck.
//!
//! Without a subcommand, `precheck` checks the given paths, or the files the
//! working copy reports as added or modified when no paths are given.
//! Subcommands:
//! - `list`: List registered checkers
//! - `detect`: Show the detected working copy
//! - `validate`: Validate configuration
//! - `install`: Install git hook
//! - `uninstall`: Remove git hook
//! - `completions`: Generate shell completions

mod commands;

use crate::core::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Pre-commit linting dispatcher.
#[derive(Debug, Parser)]
#[command(
    name = "precheck",
    author,
    version,
    about = "Run lint checkers over changed or given files",
    long_about = r#"
precheck runs lint checkers over the files you are about to commit.

With no paths, the files reported as added or modified by `svn status` or
`git status` are checked. With paths, each file is checked and each
directory is walked recursively, skipping ignored names.

Any checker output fails the run.

Quick start:
  precheck install   # Install git hook
  precheck src/      # Check a directory by hand
  precheck -- list   # Check a path that shares a subcommand's name

Environment variables:
  PRECHECK_SKIP=1    Skip all checks
  RUST_LOG=debug     Diagnostic logging
"#,
    propagate_version = true,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Files or directories to check.
    #[arg(value_name = "PATHS")]
    pub paths: Vec<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use color output.
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Configuration file to use instead of searching for one.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Bound on each external command, e.g. "30s" or "2m".
    #[arg(long, global = true, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Report format.
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Always use color.
    Always,
    /// Auto-detect color support.
    #[default]
    Auto,
    /// Never use color.
    Never,
}

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Banner-separated checker output.
    #[default]
    Text,
    /// The serialized report.
    Json,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List registered checkers.
    List,

    /// Show the detected version control system.
    Detect,

    /// Validate the configuration file.
    Validate,

    /// Install the git pre-commit hook.
    Install {
        /// Overwrite existing hook.
        #[arg(short, long)]
        force: bool,
    },

    /// Remove the git pre-commit hook.
    Uninstall,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Suppress non-error output.
    pub quiet: bool,
    /// Explicit configuration file.
    pub config: Option<PathBuf>,
    /// Timeout override.
    pub timeout: Option<String>,
}

/// Runs the CLI.
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);
    setup_color(cli.color);

    let options = GlobalOptions {
        quiet: cli.quiet,
        config: cli.config,
        timeout: cli.timeout,
    };

    match cli.command {
        Some(Commands::List) => commands::list(&options),
        Some(Commands::Detect) => commands::detect(),
        Some(Commands::Validate) => commands::validate(&options),
        Some(Commands::Install { force }) => commands::install(force),
        Some(Commands::Uninstall) => commands::uninstall(),
        Some(Commands::Completions { shell }) => {
            commands::completions(shell);
            Ok(ExitCode::SUCCESS)
        },
        None => commands::run(&cli.paths, &options, cli.format),
    }
}

/// Sets up logging based on verbosity flags.
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Sets up color output.
fn setup_color(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => {
            console::set_colors_enabled(true);
            console::set_colors_enabled_stderr(true);
        },
        ColorChoice::Never => {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        },
        ColorChoice::Auto => {
            // Let console crate auto-detect
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_parsing_help() {
        let cli = Cli::try_parse_from(["precheck", "--help"]);
        // --help causes early exit, so this will be an error
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_version() {
        let cli = Cli::try_parse_from(["precheck", "--version"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_parse_no_arguments() {
        let cli = Cli::try_parse_from(["precheck"]).expect("parse");
        assert!(cli.command.is_none());
        assert!(cli.paths.is_empty());
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn test_parse_paths() {
        let cli = Cli::try_parse_from(["precheck", "src", "setup.py"]).expect("parse");
        assert!(cli.command.is_none());
        assert_eq!(
            cli.paths,
            vec![PathBuf::from("src"), PathBuf::from("setup.py")]
        );
    }

    #[test]
    fn test_parse_format_json() {
        let cli = Cli::try_parse_from(["precheck", "--format", "json", "a.py"]).expect("parse");
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!(Cli::try_parse_from(["precheck", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_parse_timeout_and_config() {
        let cli = Cli::try_parse_from([
            "precheck",
            "--timeout",
            "5s",
            "--config",
            "ci/precheck.toml",
        ])
        .expect("parse");
        assert_eq!(cli.timeout.as_deref(), Some("5s"));
        assert_eq!(cli.config, Some(PathBuf::from("ci/precheck.toml")));
    }

    #[test]
    fn test_parse_list() {
        let cli = Cli::try_parse_from(["precheck", "list"]).expect("parse");
        assert!(matches!(cli.command, Some(Commands::List)));
    }

    #[test]
    fn test_single_letter_argument_is_a_path() {
        let cli = Cli::try_parse_from(["precheck", "d"]).expect("parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.paths, vec![PathBuf::from("d")]);
    }

    #[test]
    fn test_double_dash_forces_paths() {
        let cli = Cli::try_parse_from(["precheck", "--", "install", "list"]).expect("parse");
        assert!(cli.command.is_none());
        assert_eq!(
            cli.paths,
            vec![PathBuf::from("install"), PathBuf::from("list")]
        );
    }

    #[test]
    fn test_parse_detect() {
        let cli = Cli::try_parse_from(["precheck", "detect"]).expect("parse");
        assert!(matches!(cli.command, Some(Commands::Detect)));
    }

    #[test]
    fn test_parse_validate_with_config() {
        let cli = Cli::try_parse_from(["precheck", "validate", "--config", "x.toml"])
            .expect("parse");
        assert!(matches!(cli.command, Some(Commands::Validate)));
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_parse_install() {
        let cli = Cli::try_parse_from(["precheck", "install"]).expect("parse");
        assert!(matches!(
            cli.command,
            Some(Commands::Install { force: false })
        ));
    }

    #[test]
    fn test_parse_install_with_force() {
        let cli = Cli::try_parse_from(["precheck", "install", "--force"]).expect("parse");
        assert!(matches!(cli.command, Some(Commands::Install { force: true })));
    }

    #[test]
    fn test_parse_uninstall() {
        let cli = Cli::try_parse_from(["precheck", "uninstall"]).expect("parse");
        assert!(matches!(cli.command, Some(Commands::Uninstall)));
    }

    #[test]
    fn test_parse_completions() {
        for shell in ["bash", "zsh", "fish"] {
            let cli = Cli::try_parse_from(["precheck", "completions", shell]).expect("parse");
            assert!(matches!(cli.command, Some(Commands::Completions { .. })));
        }
    }

    #[test]
    fn test_parse_verbose_flag() {
        let cli = Cli::try_parse_from(["precheck", "--verbose", "detect"]).expect("parse");
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_parse_short_quiet() {
        let cli = Cli::try_parse_from(["precheck", "-q", "src"]).expect("parse");
        assert!(cli.quiet);
    }

    #[test]
    fn test_parse_color() {
        let cli = Cli::try_parse_from(["precheck", "--color", "never"]).expect("parse");
        assert_eq!(cli.color, ColorChoice::Never);

        let cli = Cli::try_parse_from(["precheck"]).expect("parse");
        assert_eq!(cli.color, ColorChoice::Auto);
    }
}

//! Error types for precheck.
//!
//! This module defines all errors that can occur during operation.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in precheck.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Configuration errors
    // =========================================================================
    /// Configuration file not found.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path where config was expected.
        path: PathBuf,
    },

    /// Failed to parse configuration file.
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        /// Description of the parse error.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {field} - {message}")]
    ConfigInvalid {
        /// Field name that is invalid.
        field: String,
        /// Description of why it's invalid.
        message: String,
    },

    // =========================================================================
    // VCS errors
    // =========================================================================
    /// No VCS metadata directory between the start path and the filesystem root.
    #[error("No version control system found above {start}")]
    NoVcsFound {
        /// Directory the search started from.
        start: PathBuf,
    },

    /// VCS identifier that has no status pattern.
    #[error("Unsupported vcs {name}")]
    UnsupportedVcs {
        /// The identifier that was requested.
        name: String,
    },

    /// The detected VCS has no client-side hooks.
    #[error("{vcs} does not support client-side commit hooks")]
    HooksUnsupported {
        /// Name of the VCS.
        vcs: String,
    },

    // =========================================================================
    // Registry errors
    // =========================================================================
    /// A filename glob could not be compiled.
    #[error("Invalid glob '{pattern}': {message}")]
    InvalidGlob {
        /// The offending pattern.
        pattern: String,
        /// Why it failed to compile.
        message: String,
    },

    /// Two checkers were registered under the same name.
    #[error("Checker already registered: {name}")]
    DuplicateChecker {
        /// Name of the checker.
        name: String,
    },

    // =========================================================================
    // Check execution errors
    // =========================================================================
    /// Command not found.
    #[error("Command not found: {command}")]
    CommandNotFound {
        /// The command that wasn't found.
        command: String,
    },

    /// External command timed out.
    #[error("'{name}' timed out after {timeout}")]
    CheckTimeout {
        /// Name of the command or checker that timed out.
        name: String,
        /// Timeout duration as string.
        timeout: String,
    },

    // =========================================================================
    // Hook errors
    // =========================================================================
    /// Failed to install hook.
    #[error("Failed to install Git hook: {message}")]
    HookInstall {
        /// Error message.
        message: String,
    },

    /// Hook already exists and wasn't created by us.
    #[error("Git hook already exists at {path}. Use --force to overwrite.")]
    HookExists {
        /// Path to existing hook.
        path: PathBuf,
    },

    // =========================================================================
    // I/O errors
    // =========================================================================
    /// File I/O error.
    #[error("I/O error: {message}")]
    Io {
        /// Description of what failed.
        message: String,
        /// Source error.
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Internal errors
    // =========================================================================
    /// Internal error (should never happen).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Creates a new configuration parse error with source.
    pub fn config_parse_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new I/O error with context.
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Creates a new invalid glob error.
    pub fn invalid_glob(pattern: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidGlob {
            pattern: pattern.into(),
            message: message.to_string(),
        }
    }

    /// Returns an exit code appropriate for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CheckTimeout { .. } => 124, // Standard timeout exit code
            Self::ConfigNotFound { .. }
            | Self::ConfigParse { .. }
            | Self::ConfigInvalid { .. }
            | Self::InvalidGlob { .. } => 78, // EX_CONFIG
            Self::NoVcsFound { .. } | Self::UnsupportedVcs { .. } | Self::HooksUnsupported { .. } => {
                65
            }, // EX_DATAERR
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Display / Error message tests
    // =========================================================================

    #[test]
    fn test_display_config_not_found() {
        let err = Error::ConfigNotFound {
            path: PathBuf::from("/my/precheck.toml"),
        };
        assert_eq!(
            err.to_string(),
            "Configuration file not found: /my/precheck.toml"
        );
    }

    #[test]
    fn test_display_config_invalid() {
        let err = Error::ConfigInvalid {
            field: "timeout".to_string(),
            message: "Invalid duration".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration: timeout - Invalid duration"
        );
    }

    #[test]
    fn test_display_no_vcs_found() {
        let err = Error::NoVcsFound {
            start: PathBuf::from("/tmp/work"),
        };
        assert_eq!(
            err.to_string(),
            "No version control system found above /tmp/work"
        );
    }

    #[test]
    fn test_display_unsupported_vcs() {
        let err = Error::UnsupportedVcs {
            name: "hg".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported vcs hg");
    }

    #[test]
    fn test_display_hooks_unsupported() {
        let err = Error::HooksUnsupported {
            vcs: "svn".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "svn does not support client-side commit hooks"
        );
    }

    #[test]
    fn test_display_invalid_glob() {
        let err = Error::invalid_glob("[", "unclosed bracket");
        assert_eq!(err.to_string(), "Invalid glob '[': unclosed bracket");
    }

    #[test]
    fn test_display_duplicate_checker() {
        let err = Error::DuplicateChecker {
            name: "pep8".to_string(),
        };
        assert_eq!(err.to_string(), "Checker already registered: pep8");
    }

    #[test]
    fn test_display_command_not_found() {
        let err = Error::CommandNotFound {
            command: "pyflakes".to_string(),
        };
        assert_eq!(err.to_string(), "Command not found: pyflakes");
    }

    #[test]
    fn test_display_check_timeout() {
        let err = Error::CheckTimeout {
            name: "jshint".to_string(),
            timeout: "30s".to_string(),
        };
        assert_eq!(err.to_string(), "'jshint' timed out after 30s");
    }

    #[test]
    fn test_display_hook_exists() {
        let err = Error::HookExists {
            path: PathBuf::from(".git/hooks/pre-commit"),
        };
        assert_eq!(
            err.to_string(),
            "Git hook already exists at .git/hooks/pre-commit. Use --force to overwrite."
        );
    }

    #[test]
    fn test_display_io() {
        let err = Error::io("read file", std::io::Error::other("denied"));
        assert_eq!(err.to_string(), "I/O error: read file");
    }

    // =========================================================================
    // Constructor tests
    // =========================================================================

    #[test]
    fn test_config_parse_with_source() {
        let toml_err = toml::from_str::<toml::Value>("invalid [[[toml").expect_err("should fail");
        let err = Error::config_parse_with_source("bad toml", toml_err);
        assert!(matches!(&err, Error::ConfigParse { message, source }
            if message == "bad toml" && source.is_some()
        ));
    }

    // =========================================================================
    // Exit code tests
    // =========================================================================

    #[test]
    fn test_exit_code_timeout() {
        let err = Error::CheckTimeout {
            name: "t".into(),
            timeout: "1s".into(),
        };
        assert_eq!(err.exit_code(), 124);
    }

    #[test]
    fn test_exit_code_config() {
        let toml_err = toml::from_str::<toml::Value>("[[[").expect_err("should fail");
        assert_eq!(
            Error::config_parse_with_source("x", toml_err).exit_code(),
            78
        );
        assert_eq!(Error::invalid_glob("[", "x").exit_code(), 78);
    }

    #[test]
    fn test_exit_code_vcs() {
        assert_eq!(
            Error::NoVcsFound {
                start: PathBuf::from("/")
            }
            .exit_code(),
            65
        );
        assert_eq!(
            Error::UnsupportedVcs { name: "hg".into() }.exit_code(),
            65
        );
    }

    #[test]
    fn test_exit_code_default() {
        assert_eq!(
            Error::CommandNotFound {
                command: "x".into()
            }
            .exit_code(),
            1
        );
        assert_eq!(
            Error::Internal {
                message: "x".into()
            }
            .exit_code(),
            1
        );
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error as StdError;
        let err = Error::io("x", std::io::Error::other("inner"));
        assert!(err.source().is_some());
    }
}

//! Configuration handling for precheck.
//!
//! Configuration is optional. When no `precheck.toml` is found walking up
//! from the working directory (or in the user config directory), the
//! built-in defaults apply.

use crate::checks::builtin;
use crate::core::collector::{IgnoreSet, DEFAULT_IGNORE};
use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "precheck.toml";

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bound on every external command, e.g. "60s".
    pub timeout: String,
    /// File-name globs skipped when expanding directories.
    pub ignore: Vec<String>,
    /// Per-checker overrides keyed by checker name.
    pub checkers: BTreeMap<String, CheckerConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: "60s".to_string(),
            ignore: DEFAULT_IGNORE.iter().map(ToString::to_string).collect(),
            checkers: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads configuration from the default location.
    pub fn load() -> Result<Self> {
        let path = Self::find_config_file()?;
        Self::load_from(&path)
    }

    /// Loads configuration or returns defaults if not found.
    pub fn load_or_default() -> Result<Self> {
        match Self::find_config_file() {
            Ok(path) => Self::load_from(&path),
            Err(Error::ConfigNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| Error::io("read config", e))?;
        let config = Self::from_toml(&content)?;

        tracing::debug!(path = %path.display(), "loaded configuration");

        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::config_parse_with_source("Failed to parse TOML", e))?;

        config.validate()?;

        Ok(config)
    }

    /// Finds the configuration file.
    ///
    /// Searches up the directory tree from the working directory, then
    /// falls back to `<config dir>/precheck/config.toml`.
    pub fn find_config_file() -> Result<PathBuf> {
        let cwd = std::env::current_dir().map_err(|e| Error::io("get current dir", e))?;

        let mut current = cwd.as_path();
        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Ok(config_path);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        if let Some(user_path) = Self::user_config_path() {
            if user_path.is_file() {
                return Ok(user_path);
            }
        }

        Err(Error::ConfigNotFound {
            path: cwd.join(CONFIG_FILE_NAME),
        })
    }

    /// Returns the per-user configuration path, if the platform has one.
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("precheck").join("config.toml"))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if humantime::parse_duration(&self.timeout).is_err() {
            return Err(Error::ConfigInvalid {
                field: "timeout".to_string(),
                message: format!("Invalid duration: {}", self.timeout),
            });
        }

        IgnoreSet::from_globs(&self.ignore).map_err(|e| Error::ConfigInvalid {
            field: "ignore".to_string(),
            message: e.to_string(),
        })?;

        for (name, checker) in &self.checkers {
            let Some(spec) = builtin::find(name) else {
                return Err(Error::ConfigInvalid {
                    field: format!("checkers.{name}"),
                    message: format!(
                        "Unknown checker. Expected one of: {}",
                        builtin::names().join(", ")
                    ),
                });
            };

            checker.validate(name, spec.default_command.is_some())?;
        }

        Ok(())
    }

    /// Returns the parsed timeout.
    pub fn timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.timeout).map_err(|e| Error::ConfigInvalid {
            field: "timeout".to_string(),
            message: format!("Invalid duration: {e}"),
        })
    }

    /// Returns the compiled ignore globs.
    pub fn ignore_set(&self) -> Result<IgnoreSet> {
        IgnoreSet::from_globs(&self.ignore)
    }

    /// Returns the overrides for `name`, or defaults.
    #[must_use]
    pub fn checker(&self, name: &str) -> CheckerConfig {
        self.checkers.get(name).cloned().unwrap_or_default()
    }

    /// Generates default configuration as a string.
    #[must_use]
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Overrides for a single checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Whether the checker is registered at all.
    pub enabled: bool,
    /// Replacement argv for external tools; files are appended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    /// Replacement include glob.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
    /// Replacement exclude globs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: None,
            include: None,
            exclude: None,
        }
    }
}

impl CheckerConfig {
    fn validate(&self, name: &str, external: bool) -> Result<()> {
        if let Some(ref command) = self.command {
            if !external {
                return Err(Error::ConfigInvalid {
                    field: format!("checkers.{name}.command"),
                    message: "This checker does not run an external command".to_string(),
                });
            }
            if command.first().map_or(true, |program| program.trim().is_empty()) {
                return Err(Error::ConfigInvalid {
                    field: format!("checkers.{name}.command"),
                    message: "Command must name a program".to_string(),
                });
            }
        }

        let globs = self
            .include
            .iter()
            .chain(self.exclude.iter().flatten());
        for glob in globs {
            if let Err(e) = glob::Pattern::new(glob) {
                return Err(Error::ConfigInvalid {
                    field: format!("checkers.{name}"),
                    message: format!("Invalid glob '{glob}': {e}"),
                });
            }
        }

        Ok(())
    }
}

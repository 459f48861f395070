//! Built-in checker definitions.
//!
//! These checkers are registered by default, in table order.

use crate::checks::external::{ExternalTool, MissingTool};
use crate::checks::whitespace::TrailingWhitespace;
use crate::config::Config;
use crate::core::error::Result;
use crate::core::executor::Executor;
use crate::core::registry::{Registry, DEFAULT_INCLUDE};
use std::rc::Rc;

/// Names of built-in checkers.
pub mod names {
    /// Python static analysis via `pyflakes`.
    pub const PYFLAKES: &str = "pyflakes";
    /// Python style via `pep8`.
    pub const PEP8: &str = "pep8";
    /// Trailing whitespace scan for non-Python, non-JSON files.
    pub const TRAILING_WHITESPACE: &str = "trailing_whitespace";
    /// JavaScript lint via `jshint`.
    pub const JSHINT: &str = "jshint";
}

/// Static description of a built-in checker.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinSpec {
    /// Checker name.
    pub name: &'static str,
    /// Default include glob.
    pub include: &'static str,
    /// Default exclude globs.
    pub exclude: &'static [&'static str],
    /// Default external command, or `None` for in-process checkers.
    pub default_command: Option<&'static [&'static str]>,
    /// What to do when the external program is not installed.
    pub missing: MissingTool,
    /// One-line description.
    pub description: &'static str,
}

/// Built-in checkers in registration order.
pub const BUILTINS: &[BuiltinSpec] = &[
    BuiltinSpec {
        name: names::PYFLAKES,
        include: "*.py",
        exclude: &[],
        default_command: Some(&["pyflakes"]),
        missing: MissingTool::Fail,
        description: "Report Python errors with pyflakes",
    },
    BuiltinSpec {
        name: names::PEP8,
        include: "*.py",
        exclude: &[],
        default_command: Some(&["pep8", "--repeat"]),
        missing: MissingTool::Fail,
        description: "Report Python style issues with pep8",
    },
    BuiltinSpec {
        name: names::TRAILING_WHITESPACE,
        include: DEFAULT_INCLUDE,
        exclude: &["*.py", "*.json"],
        default_command: None,
        missing: MissingTool::Fail,
        description: "Report lines ending in whitespace",
    },
    BuiltinSpec {
        name: names::JSHINT,
        include: "*.js",
        exclude: &[],
        default_command: Some(&["jshint"]),
        missing: MissingTool::Warn,
        description: "Report JavaScript issues with jshint",
    },
];

/// Looks up a built-in checker by name.
#[must_use]
pub fn find(name: &str) -> Option<&'static BuiltinSpec> {
    BUILTINS.iter().find(|spec| spec.name == name)
}

/// Returns the built-in checker names in registration order.
#[must_use]
pub fn names() -> Vec<&'static str> {
    BUILTINS.iter().map(|spec| spec.name).collect()
}

/// Registers every enabled built-in checker, applying `config` overrides.
pub fn register_builtins(
    registry: &mut Registry,
    config: &Config,
    executor: &Rc<Executor>,
) -> Result<()> {
    let timeout = config.timeout()?;

    for spec in BUILTINS {
        let overrides = config.checker(spec.name);
        if !overrides.enabled {
            tracing::debug!(checker = spec.name, "disabled by configuration");
            continue;
        }

        let include = overrides.include.as_deref().unwrap_or(spec.include);
        let exclude: Vec<String> = overrides.exclude.clone().unwrap_or_else(|| {
            spec.exclude.iter().map(ToString::to_string).collect()
        });

        match spec.default_command {
            Some(default_command) => {
                let argv: Vec<String> = overrides.command.clone().unwrap_or_else(|| {
                    default_command.iter().map(ToString::to_string).collect()
                });
                let tool = ExternalTool::new(spec.name, argv, Rc::clone(executor))
                    .timeout(timeout)
                    .on_missing(spec.missing);
                registry.register(spec.name, include, &exclude, tool)?;
            },
            None => {
                registry.register(spec.name, include, &exclude, TrailingWhitespace::new())?;
            },
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckerConfig;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn executor() -> Rc<Executor> {
        Rc::new(Executor::new().expect("create executor"))
    }

    #[test]
    fn test_find() {
        assert!(find("pyflakes").is_some());
        assert!(find("trailing_whitespace").is_some());
        assert!(find("custom-check").is_none());
    }

    #[test]
    fn test_only_jshint_tolerates_missing_tool() {
        for spec in BUILTINS {
            let expected = if spec.name == names::JSHINT {
                MissingTool::Warn
            } else {
                MissingTool::Fail
            };
            assert_eq!(spec.missing, expected, "{}", spec.name);
        }
    }

    #[test]
    fn test_registers_all_in_order() {
        let mut registry = Registry::new();
        register_builtins(&mut registry, &Config::default(), &executor()).expect("register");

        assert_eq!(
            registry.names(),
            vec!["pyflakes", "pep8", "trailing_whitespace", "jshint"]
        );
    }

    #[test]
    fn test_default_globs() {
        let mut registry = Registry::new();
        register_builtins(&mut registry, &Config::default(), &executor()).expect("register");

        let pyflakes = registry.get("pyflakes").expect("pyflakes");
        assert!(pyflakes.selects(Path::new("bla.py")));
        assert!(!pyflakes.selects(Path::new("baz.exe")));

        let whitespace = registry.get("trailing_whitespace").expect("whitespace");
        assert!(whitespace.selects(Path::new("README")));
        assert!(!whitespace.selects(Path::new("a.py")));
        assert!(!whitespace.selects(Path::new("data.json")));

        let jshint = registry.get("jshint").expect("jshint");
        assert!(jshint.selects(Path::new("static/app.js")));
    }

    #[test]
    fn test_disabled_checker_not_registered() {
        let mut config = Config::default();
        config.checkers.insert(
            "pep8".to_string(),
            CheckerConfig {
                enabled: false,
                ..CheckerConfig::default()
            },
        );

        let mut registry = Registry::new();
        register_builtins(&mut registry, &config, &executor()).expect("register");

        assert!(registry.get("pep8").is_none());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_glob_overrides_applied() {
        let mut config = Config::default();
        config.checkers.insert(
            "trailing_whitespace".to_string(),
            CheckerConfig {
                include: Some("*.md".to_string()),
                exclude: Some(vec!["CHANGELOG.md".to_string()]),
                ..CheckerConfig::default()
            },
        );

        let mut registry = Registry::new();
        register_builtins(&mut registry, &config, &executor()).expect("register");

        let whitespace = registry.get("trailing_whitespace").expect("whitespace");
        assert_eq!(whitespace.include_glob(), "*.md");
        assert!(whitespace.selects(Path::new("README.md")));
        assert!(!whitespace.selects(Path::new("CHANGELOG.md")));
        assert!(!whitespace.selects(Path::new("notes.txt")));
    }

    #[test]
    fn test_every_builtin_has_description() {
        for spec in BUILTINS {
            assert!(!spec.description.is_empty(), "{} lacks a description", spec.name);
        }
    }
}

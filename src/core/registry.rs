//! Checker registration.
//!
//! A [`Registry`] is built once at startup and handed to the dispatcher.
//! Each [`Checker`] binds a [`Check`] implementation to an include glob and
//! a list of exclude globs; the globs decide which candidate files the check
//! ever sees.

use crate::core::collector::FileSet;
use crate::core::error::{Error, Result};
use glob::Pattern;
use std::fmt;
use std::path::{Path, PathBuf};

/// Include glob used when a checker applies to every file.
pub const DEFAULT_INCLUDE: &str = "*";

/// A check over a list of files.
///
/// Implementations return their findings as text; an empty (or
/// whitespace-only) string means nothing was flagged.
pub trait Check {
    /// Inspects `files` and returns the report text.
    fn run(&self, files: &[PathBuf]) -> Result<String>;
}

impl<F> Check for F
where
    F: Fn(&[PathBuf]) -> Result<String>,
{
    fn run(&self, files: &[PathBuf]) -> Result<String> {
        self(files)
    }
}

/// A registered check with its file selection globs.
pub struct Checker {
    name: String,
    include: Pattern,
    exclude: Vec<Pattern>,
    check: Box<dyn Check>,
}

impl fmt::Debug for Checker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checker")
            .field("name", &self.name)
            .field("include", &self.include.as_str())
            .field("exclude", &self.exclude_globs())
            .finish_non_exhaustive()
    }
}

impl Checker {
    /// Returns the checker name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the include glob.
    #[must_use]
    pub fn include_glob(&self) -> &str {
        self.include.as_str()
    }

    /// Returns the exclude globs.
    #[must_use]
    pub fn exclude_globs(&self) -> Vec<&str> {
        self.exclude.iter().map(Pattern::as_str).collect()
    }

    /// Returns true if `path` is selected by the include glob and not
    /// rejected by any exclude glob.
    #[must_use]
    pub fn selects(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.include.matches(&path) && !self.exclude.iter().any(|p| p.matches(&path))
    }

    /// Returns the subset of `files` this checker applies to, in order.
    #[must_use]
    pub fn select(&self, files: &FileSet) -> Vec<PathBuf> {
        files.filter(|path| self.selects(path)).iter().cloned().collect()
    }

    /// Runs the check over its selection of `files`.
    ///
    /// Returns `Ok(None)` without invoking the check when nothing is
    /// selected.
    pub fn apply(&self, files: &FileSet) -> Result<Option<(Vec<PathBuf>, String)>> {
        let selected = self.select(files);
        if selected.is_empty() {
            return Ok(None);
        }

        let output = self.check.run(&selected)?;
        Ok(Some((selected, output)))
    }
}

/// Ordered collection of checkers.
#[derive(Debug, Default)]
pub struct Registry {
    checkers: Vec<Checker>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `check` under `name`.
    ///
    /// Checkers are dispatched in registration order. Names must be unique
    /// and every glob must compile.
    pub fn register<S, C>(
        &mut self,
        name: impl Into<String>,
        include: &str,
        exclude: &[S],
        check: C,
    ) -> Result<()>
    where
        S: AsRef<str>,
        C: Check + 'static,
    {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(Error::DuplicateChecker { name });
        }

        let include = compile(include)?;
        let exclude = exclude
            .iter()
            .map(|glob| compile(glob.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            checker = %name,
            include = include.as_str(),
            exclude = exclude.len(),
            "registered checker"
        );

        self.checkers.push(Checker {
            name,
            include,
            exclude,
            check: Box::new(check),
        });

        Ok(())
    }

    /// Looks up a checker by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Checker> {
        self.checkers.iter().find(|c| c.name == name)
    }

    /// Iterates the checkers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Checker> {
        self.checkers.iter()
    }

    /// Returns the checker names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.checkers.iter().map(Checker::name).collect()
    }

    /// Returns the number of registered checkers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }
}

fn compile(glob: &str) -> Result<Pattern> {
    Pattern::new(glob).map_err(|e| Error::invalid_glob(glob, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    const NO_EXCLUDES: &[&str] = &[];

    fn file_set(names: &[&str]) -> FileSet {
        names.iter().map(PathBuf::from).collect()
    }

    fn echo_names(files: &[PathBuf]) -> Result<String> {
        Ok(files
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(","))
    }

    #[test]
    fn test_include_glob_selects_subset() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut registry = Registry::new();
        registry
            .register(
                "py",
                "*.py",
                NO_EXCLUDES,
                move |files: &[PathBuf]| -> Result<String> {
                    sink.borrow_mut().extend_from_slice(files);
                    Ok(String::new())
                },
            )
            .expect("register");

        let files = file_set(&["foo", "bar", "bla.py", "baz.exe"]);
        let checker = registry.get("py").expect("registered");
        checker.apply(&files).expect("apply");

        assert_eq!(*seen.borrow(), vec![PathBuf::from("bla.py")]);
    }

    #[test]
    fn test_exclude_globs_reject() {
        let mut registry = Registry::new();
        registry
            .register("ws", DEFAULT_INCLUDE, &["*.py", "*.json"], echo_names)
            .expect("register");

        let files = file_set(&["a.py", "b.json", "c.txt", "src/d.js"]);
        let checker = registry.get("ws").expect("registered");
        assert_eq!(
            checker.select(&files),
            vec![PathBuf::from("c.txt"), PathBuf::from("src/d.js")]
        );
    }

    #[test]
    fn test_glob_star_crosses_directories() {
        let mut registry = Registry::new();
        registry
            .register("py", "*.py", NO_EXCLUDES, echo_names)
            .expect("register");

        let checker = registry.get("py").expect("registered");
        assert!(checker.selects(Path::new("pkg/sub/mod.py")));
        assert!(!checker.selects(Path::new("pkg/sub/mod.pyc")));
    }

    #[test]
    fn test_empty_selection_skips_check() {
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);

        let mut registry = Registry::new();
        registry
            .register(
                "js",
                "*.js",
                NO_EXCLUDES,
                move |_: &[PathBuf]| -> Result<String> {
                    *counter.borrow_mut() += 1;
                    Ok("never".to_string())
                },
            )
            .expect("register");

        let result = registry
            .get("js")
            .expect("registered")
            .apply(&file_set(&["a.py"]))
            .expect("apply");

        assert!(result.is_none());
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = Registry::new();
        for name in ["first", "second", "third"] {
            registry
                .register(name, DEFAULT_INCLUDE, NO_EXCLUDES, echo_names)
                .expect("register");
        }
        assert_eq!(registry.names(), vec!["first", "second", "third"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = Registry::new();
        registry
            .register("dup", DEFAULT_INCLUDE, NO_EXCLUDES, echo_names)
            .expect("register");
        let result = registry.register("dup", "*.py", NO_EXCLUDES, echo_names);
        assert!(matches!(result, Err(Error::DuplicateChecker { name }) if name == "dup"));
    }

    #[test]
    fn test_invalid_glob_rejected() {
        let mut registry = Registry::new();
        let result = registry.register("bad", "[", NO_EXCLUDES, echo_names);
        assert!(matches!(result, Err(Error::InvalidGlob { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_checker_debug_shows_globs() {
        let mut registry = Registry::new();
        registry
            .register("ws", DEFAULT_INCLUDE, &["*.py"], echo_names)
            .expect("register");
        let debug = format!("{:?}", registry.get("ws").expect("registered"));
        assert!(debug.contains("ws"));
        assert!(debug.contains("*.py"));
    }
}

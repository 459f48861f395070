//! Candidate file collection.
//!
//! Turns command-line path arguments (or VCS-reported paths) into the
//! [`FileSet`] that checkers are dispatched over.

use crate::core::error::{Error, Result};
use glob::Pattern;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Default ignore globs, matched against each directory entry's file name.
pub const DEFAULT_IGNORE: &[&str] = &[
    ".*",
    "*~",
    "*.bak",
    "*.orig",
    "*.swp",
    "*.pyc",
    "*.pyo",
    "*.o",
    "*.so",
    "*.egg",
    "*.egg-info",
    "*.whl",
    "*.tar.gz",
    "*.zip",
    "*.db",
    "*.sqlite",
    "*.sqlite3",
];

/// The set of candidate files for one invocation.
///
/// Ordered internally so dispatch output is stable; filtering builds new
/// sets rather than mutating this one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    files: BTreeSet<PathBuf>,
}

impl FileSet {
    /// Builds a set from `paths`, keeping only existing regular files.
    pub fn existing<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        paths
            .into_iter()
            .filter(|path| {
                let keep = path.is_file();
                if !keep {
                    tracing::debug!(path = %path.display(), "dropping non-file candidate");
                }
                keep
            })
            .collect()
    }

    /// Returns the number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if the set holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns true if `path` is in the set.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains(&normalize(path))
    }

    /// Iterates the files in order.
    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.iter()
    }

    /// Returns the subset matching `predicate`.
    #[must_use]
    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Path) -> bool,
    {
        self.files
            .iter()
            .filter(|path| predicate(path))
            .cloned()
            .collect()
    }

    /// Rewrites every path under `base` relative to it.
    #[must_use]
    pub fn relative_to(&self, base: &Path) -> Self {
        self.files
            .iter()
            .map(|path| path.strip_prefix(base).map_or_else(|_| path.clone(), Path::to_path_buf))
            .collect()
    }
}

impl FromIterator<PathBuf> for FileSet {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().map(|path| normalize(&path)).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a PathBuf;
    type IntoIter = std::collections::btree_set::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// Drops `.` components so `./a.py` and `a.py` are the same candidate.
fn normalize(path: &Path) -> PathBuf {
    let normalized: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

/// File-name globs excluded while walking directories.
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    patterns: Vec<Pattern>,
}

impl IgnoreSet {
    /// Compiles `globs` into an ignore set.
    pub fn from_globs<S: AsRef<str>>(globs: &[S]) -> Result<Self> {
        let patterns = globs
            .iter()
            .map(|glob| {
                let glob = glob.as_ref();
                Pattern::new(glob).map_err(|e| Error::invalid_glob(glob, e))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Returns true if `name` matches any ignore glob.
    #[must_use]
    pub fn is_ignored(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(name))
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_IGNORE
                .iter()
                .filter_map(|glob| Pattern::new(glob).ok())
                .collect(),
        }
    }
}

/// Expands path arguments into a [`FileSet`].
///
/// Regular files are taken as given. Directories are walked recursively,
/// pruning any entry below the argument whose file name is ignored.
/// Missing paths and unreadable entries are skipped with a warning.
pub fn collect<P: AsRef<Path>>(args: &[P], ignore: &IgnoreSet) -> FileSet {
    let mut candidates = Vec::new();

    for arg in args {
        let arg = arg.as_ref();

        if arg.is_file() {
            candidates.push(arg.to_path_buf());
        } else if arg.is_dir() {
            let walker = WalkDir::new(arg)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| {
                    entry.depth() == 0 || !ignore.is_ignored(&entry.file_name().to_string_lossy())
                });

            for entry in walker {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => {
                        candidates.push(entry.into_path());
                    },
                    Ok(_) => {},
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping unreadable entry");
                    },
                }
            }
        } else {
            tracing::warn!(path = %arg.display(), "skipping path that is not a file or directory");
        }
    }

    let files = FileSet::existing(candidates);
    tracing::debug!(count = files.len(), "collected candidate files");
    files
}

//! Version-control detection and status parsing.
//!
//! Detection walks from a start directory towards the filesystem root,
//! looking for a metadata directory (`.svn`, `.git`) at each level. It never
//! touches the process working directory. Status parsing extracts the
//! added/modified paths from the textual output of `<vcs> status`.

use crate::core::error::{Error, Result};
use crate::core::executor::{ExecuteOptions, Executor};
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

// Added or modified, then the rest of the line is the path.
static SVN_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:A|M)\s+(.*)$").expect("valid svn status pattern"));

// Optional '#' (older git prefixed status lines with it), then "new file:" or
// "modified:", then the path.
static GIT_STATUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#?\s+(?:new file|modified):\s+(.*)$").expect("valid git status pattern")
});

/// A supported version-control system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Vcs {
    /// Subversion.
    Svn,
    /// Git.
    Git,
}

impl Vcs {
    /// All supported systems, in detection priority order.
    pub const ALL: [Self; 2] = [Self::Svn, Self::Git];

    /// Returns the identifier used on the command line.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Svn => "svn",
            Self::Git => "git",
        }
    }

    /// Returns the metadata directory that marks a working copy.
    #[must_use]
    pub const fn metadata_dir(&self) -> &'static str {
        match self {
            Self::Svn => ".svn",
            Self::Git => ".git",
        }
    }

    /// Arguments for the status command.
    ///
    /// Git is asked for the long format explicitly so a `status.short`
    /// setting in the user's config cannot change the output shape, and
    /// with `core.quotePath` off so non-ASCII names are printed verbatim.
    #[must_use]
    pub const fn status_args(&self) -> &'static [&'static str] {
        match self {
            Self::Svn => &["status"],
            Self::Git => &["-c", "core.quotePath=false", "status", "--long"],
        }
    }

    /// Returns the status-line pattern for this system.
    #[must_use]
    pub fn status_pattern(&self) -> &'static Regex {
        match self {
            Self::Svn => &SVN_STATUS,
            Self::Git => &GIT_STATUS,
        }
    }
}

impl std::fmt::Display for Vcs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Vcs {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "svn" => Ok(Self::Svn),
            "git" => Ok(Self::Git),
            _ => Err(Error::UnsupportedVcs {
                name: s.to_string(),
            }),
        }
    }
}

/// Result of VCS detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    /// The detected system.
    pub vcs: Vcs,
    /// Directory holding the metadata directory.
    pub root: PathBuf,
}

/// Detects the VCS for the current working directory.
pub fn detect() -> Result<Detection> {
    let cwd = std::env::current_dir().map_err(|e| Error::io("get current dir", e))?;
    detect_from(&cwd)
}

/// Detects the VCS by walking up from `start`.
///
/// At each level every system in [`Vcs::ALL`] is tried in order. The walk
/// stops with [`Error::NoVcsFound`] once the filesystem root has been
/// checked without a match.
pub fn detect_from(start: &Path) -> Result<Detection> {
    let start = start
        .canonicalize()
        .map_err(|e| Error::io(format!("resolve {}", start.display()), e))?;

    let mut current = start.as_path();
    loop {
        for vcs in Vcs::ALL {
            if current.join(vcs.metadata_dir()).exists() {
                tracing::debug!(vcs = %vcs, root = %current.display(), "detected working copy");
                return Ok(Detection {
                    vcs,
                    root: current.to_path_buf(),
                });
            }
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }

    Err(Error::NoVcsFound { start })
}

/// Extracts added/modified paths from `vcs` status output, in input order.
///
/// Git paths printed in C-style quotes are unquoted.
#[must_use]
pub fn parse_status(vcs: Vcs, text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| vcs.status_pattern().captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|m| match vcs {
            Vcs::Git => unquote(m.as_str()),
            Vcs::Svn => m.as_str().to_string(),
        })
        .collect()
}

/// Undoes git's C-style path quoting (`"caf\303\251.txt"`).
///
/// Unquoted input is returned as is. Octal escapes are raw bytes, decoded
/// as UTF-8 lossily.
fn unquote(path: &str) -> String {
    let Some(inner) = path
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return path.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }

        match chars.next() {
            Some('n') => bytes.push(b'\n'),
            Some('t') => bytes.push(b'\t'),
            Some('r') => bytes.push(b'\r'),
            Some('a') => bytes.push(0x07),
            Some('b') => bytes.push(0x08),
            Some('f') => bytes.push(0x0c),
            Some('v') => bytes.push(0x0b),
            Some(digit @ '0'..='7') => {
                let mut value = digit.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        },
                        None => break,
                    }
                }
                bytes.push(u8::try_from(value).unwrap_or(u8::MAX));
            },
            Some(other) => {
                let mut buf = [0; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            },
            None => bytes.push(b'\\'),
        }
    }

    String::from_utf8_lossy(&bytes).into_owned()
}

/// Like [`parse_status`], keyed by the VCS identifier string.
pub fn parse_status_for(name: &str, text: &str) -> Result<Vec<String>> {
    let vcs: Vcs = name.parse()?;
    Ok(parse_status(vcs, text))
}

/// Runs the status command at the working-copy root and returns the
/// changed paths joined onto the root.
///
/// The exit status of the command is not interpreted; whatever it printed
/// is parsed.
pub fn changed_files(
    executor: &Executor,
    detection: &Detection,
    timeout: Duration,
) -> Result<Vec<PathBuf>> {
    let vcs = detection.vcs;
    let options = ExecuteOptions::default()
        .cwd(&detection.root)
        .timeout(timeout)
        .env("LC_ALL", "C");

    let output = executor.execute(vcs.name(), vcs.status_args(), &options)?;

    if output.timed_out {
        return Err(Error::CheckTimeout {
            name: format!("{vcs} status"),
            timeout: humantime::format_duration(timeout).to_string(),
        });
    }

    if !output.success() {
        tracing::debug!(
            vcs = %vcs,
            exit_code = output.exit_code,
            stderr = %output.stderr.trim(),
            "status command exited non-zero"
        );
    }

    let files: Vec<PathBuf> = parse_status(vcs, &output.stdout)
        .into_iter()
        .map(|path| detection.root.join(path))
        .collect();

    tracing::debug!(vcs = %vcs, count = files.len(), "collected changed files");

    Ok(files)
}

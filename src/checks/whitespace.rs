//! Trailing whitespace scanner.

use crate::core::error::Result;
use crate::core::registry::Check;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static TRAILING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+$").expect("valid trailing whitespace pattern"));

/// Reports every line that ends in whitespace.
///
/// Output is one `<file>:<line>: trailing whitespace` entry per offending
/// line, with 1-based line numbers. Files that cannot be read are skipped
/// with a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailingWhitespace;

impl TrailingWhitespace {
    /// Creates the scanner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the 1-based numbers of lines in `content` ending in whitespace.
    #[must_use]
    pub fn scan(content: &str) -> Vec<usize> {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| TRAILING.is_match(line))
            .map(|(idx, _)| idx + 1)
            .collect()
    }

    fn scan_file(path: &Path) -> Option<Vec<usize>> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
                return None;
            },
        };

        Some(Self::scan(&String::from_utf8_lossy(&bytes)))
    }
}

impl Check for TrailingWhitespace {
    fn run(&self, files: &[PathBuf]) -> Result<String> {
        let mut out = String::new();

        for path in files {
            let Some(lines) = Self::scan_file(path) else {
                continue;
            };

            for line in lines {
                out.push_str(&format!("{}:{line}: trailing whitespace\n", path.display()));
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_scan_reports_lines_two_and_three() {
        assert_eq!(
            TrailingWhitespace::scan("foo\nbar \n \n"),
            vec![2, 3]
        );
    }

    #[rstest]
    #[case("clean\nlines\n", vec![])]
    #[case("tab\t\n", vec![1])]
    #[case("crlf\r\nok\r\n", vec![])]
    #[case("last line without newline ", vec![1])]
    #[case("", vec![])]
    #[case("a\n\nb", vec![])]
    fn test_scan_cases(#[case] content: &str, #[case] expected: Vec<usize>) {
        assert_eq!(TrailingWhitespace::scan(content), expected);
    }

    #[test]
    fn test_run_formats_output() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("foo");
        std::fs::write(&path, "foo\nbar \n \n").expect("write file");

        let output = TrailingWhitespace::new().run(&[path.clone()]).expect("run");
        assert_eq!(
            output,
            format!(
                "{0}:2: trailing whitespace\n{0}:3: trailing whitespace\n",
                path.display()
            )
        );
    }

    #[test]
    fn test_run_skips_unreadable_files() {
        let temp = TempDir::new().expect("create temp dir");
        let missing = temp.path().join("vanished.txt");
        let present = temp.path().join("present.txt");
        std::fs::write(&present, "x \n").expect("write file");

        let output = TrailingWhitespace::new()
            .run(&[missing, present.clone()])
            .expect("run");
        assert_eq!(output, format!("{}:1: trailing whitespace\n", present.display()));
    }

    #[test]
    fn test_run_clean_file_reports_nothing() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("clean.txt");
        std::fs::write(&path, "all\ngood\n").expect("write file");

        assert!(TrailingWhitespace::new().run(&[path]).expect("run").is_empty());
    }

    #[test]
    fn test_run_handles_non_utf8() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("latin1.txt");
        std::fs::write(&path, b"caf\xe9 \nok\n").expect("write file");

        let output = TrailingWhitespace::new().run(&[path]).expect("run");
        assert!(output.contains(":1: trailing whitespace"));
    }
}

//! # precheck
//!
//! A pre-commit linting dispatcher.
//!
//! `precheck` finds the files changed in a Subversion or git working copy
//! (or takes explicit paths), hands each registered checker the files
//! matching its globs, and prints whatever the checkers report. Any output
//! at all means the commit should be stopped.
//!
//! ## Features
//!
//! - **VCS detection**: Walks up from the working directory to find `.svn` or `.git`
//! - **Glob dispatch**: Each checker declares an include glob and exclude globs
//! - **Built-in checkers**: pyflakes, pep8, trailing whitespace, jshint
//! - **Bounded tools**: Every external command runs under a timeout
//!
//! ## Example
//!
//! ```rust,no_run
//! use precheck::checks::builtin;
//! use precheck::core::executor::Executor;
//! use precheck::{collector, Config, Dispatcher, Registry};
//! use std::rc::Rc;
//!
//! fn main() -> precheck::Result<()> {
//!     let config = Config::load_or_default()?;
//!     let executor = Rc::new(Executor::new()?);
//!
//!     let mut registry = Registry::new();
//!     builtin::register_builtins(&mut registry, &config, &executor)?;
//!
//!     let files = collector::collect(&["src"], &config.ignore_set()?);
//!     let report = Dispatcher::new(&registry).dispatch(&files);
//!
//!     print!("{}", report.render());
//!     if !report.success() {
//!         std::process::exit(1);
//!     }
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/precheck/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod checks;
pub mod cli;
pub mod config;
pub mod core;

// Re-export main types for convenience
pub use crate::config::Config;
pub use crate::core::collector::{self, FileSet};
pub use crate::core::dispatcher::{CheckOutput, Dispatcher, Report};
pub use crate::core::error::{Error, Result};
pub use crate::core::registry::{Check, Registry};
pub use crate::core::vcs::{Detection, Vcs};

//! Core functionality for precheck.
//!
//! This module contains the main components:
//! - [`vcs`]: Working-copy detection and status parsing
//! - [`collector`]: Candidate file sets from explicit paths
//! - [`registry`]: Checker registration and file selection
//! - [`dispatcher`]: Running checkers and aggregating their output
//! - [`executor`]: Bounded subprocess execution
//! - [`hooks`]: Git pre-commit hook management
//! - [`error`]: Error types and result handling

pub mod collector;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod hooks;
pub mod registry;
pub mod vcs;

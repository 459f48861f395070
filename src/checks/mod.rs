//! Built-in checkers.
//!
//! - [`builtin`]: the checker table and registration
//! - [`external`]: wrapper around external lint tools
//! - [`whitespace`]: trailing-whitespace scanner

pub mod builtin;
pub mod external;
pub mod whitespace;

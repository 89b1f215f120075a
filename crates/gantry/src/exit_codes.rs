//! Exit codes for the CLI
//!
//! External tool failures propagate the tool's own exit code instead.

#![allow(dead_code)]

/// Success
pub const SUCCESS: i32 = 0;

/// Configuration, identity, or verification error
pub const ERROR: i32 = 1;

//! CLI command implementations.
//!
//! Each command returns the process exit code; stage results go to stdout,
//! diagnostics to stderr.

pub mod feeds;
pub mod load;
pub mod provision;

//! # CLI Command Implementations
//!
//! One file per subcommand of the `merge-wizard` tool.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args`, calls into the
//!   `merge_wizard` library and returns the process exit code.

pub mod compare;
pub mod completions;
pub mod merge;

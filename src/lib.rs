//! # Merge Wizard Library
//!
//! Folds divergent copies of a directory tree (a BASE and one or more
//! SOURCE trees) into a new output tree, choosing a content strategy per
//! file and writing a human-readable report of everything it did. The
//! `merge-wizard` command-line tool is a thin wrapper around this crate.
//!
//! ## Quick Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use merge_wizard::cancel::CancellationToken;
//! use merge_wizard::config::{MergeMode, RunConfig};
//! use merge_wizard::phases::orchestrator;
//!
//! let config = RunConfig::new(
//!     PathBuf::from("game-v1"),
//!     vec![PathBuf::from("game-v1-fork")],
//!     PathBuf::from("game-merged"),
//! )
//! .with_mode(MergeMode::Additions);
//!
//! let summary = orchestrator::execute_merge(&config, &CancellationToken::new(), None)?;
//! println!("{}", summary.status());
//! # Ok::<(), merge_wizard::error::Error>(())
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: the immutable [`config::RunConfig`] and the
//!   extension-driven [`config::StrategyTable`].
//! - **Snapshots (`snapshot`)**: relative-path views of a tree, with VCS
//!   metadata always excluded.
//! - **Phases (`phases`)**: classification, output seeding, per-file
//!   execution on a worker pool and the orchestrator chaining them.
//! - **Content strategies (`merge`)**: binary overwrite, unified diff, line
//!   addition and conflict blocks.
//! - **Safety layer (`filesystem`)**: retrying removal and writes that cope
//!   with read-only and locked files.
//! - **Reporting (`report`, `progress`)**: per-path outcomes, counters, the
//!   report file and progress lines.
//!
//! ## Execution Flow
//!
//! 1.  **Collection**: Snapshot BASE and SOURCE concurrently.
//! 2.  **Classification**: Label every path added, removed, modified or unchanged.
//! 3.  **Output Preparation**: Replace the output and seed it from BASE.
//! 4.  **Execution**: Apply a strategy to every changed path in parallel.
//! 5.  **Reporting**: Write the deterministic, sorted report.
//!
//! With several SOURCE trees, steps 1, 2 and 4 repeat with the output acting
//! as BASE for every additional SOURCE.

pub mod cancel;
pub mod config;
pub mod defaults;
pub mod error;
pub mod exit_codes;
pub mod filesystem;
pub mod merge;
pub mod output;
pub mod phases;
pub mod progress;
pub mod report;
pub mod settings;
pub mod snapshot;
pub mod suggestions;

#[cfg(test)]
mod merge_proptest;

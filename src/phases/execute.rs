//! # Phase 4: Merge Execution
//!
//! Applies the classification to the output tree, one relative path at a
//! time, and returns one [`MergeOutcome`] per record in sorted path order.
//!
//! ## Per-status behavior
//!
//! - **Added**: SOURCE is copied to the same relative path.
//! - **Removed**: deleted from a BASE-seeded output; nothing to do when the
//!   output was seeded empty. Listed in the report either way. A file that
//!   cannot be deleted is moved into the `<output>.stale/` directory beside
//!   the output and the outcome carries a warning.
//! - **Unchanged**: no write.
//! - **Modified**: the content strategy selector picks a strategy and its
//!   result is written. An addition merge with nothing new leaves the file
//!   alone and reports it as unchanged.
//!
//! ## Concurrency
//!
//! Records are spread over a bounded rayon pool. Relative paths are unique,
//! so every output path is touched by exactly one worker and workers share no
//! locks; counts are derived from the collected outcomes afterwards. Empty
//! directories left behind by deletions are pruned sequentially once all
//! workers are done.
//!
//! Every merged file is computed from the BASE and SOURCE locations recorded
//! in the classification, never from what the output already holds, so
//! running the phase again over the same inputs rewrites identical bytes.
//!
//! Read and write failures are recorded on the path's outcome and the run
//! carries on.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, warn};
use rayon::prelude::*;

use crate::cancel::CancellationToken;
use crate::config::{MergeMode, RemovalPolicy, SeedMode, StrategyTable};
use crate::defaults;
use crate::error::{Error, Result};
use crate::filesystem::{self, Removal};
use crate::merge::{self, Merged};
use crate::phases::classify::{ClassificationRecord, Status};
use crate::report::{Action, MergeOutcome};

/// Progress callback: `(completed, total, relative_path)`.
pub type ProgressFn<'a> = &'a (dyn Fn(usize, usize, &str) + Sync);

/// Everything the executor needs besides the records.
pub struct ExecuteOptions<'a> {
    pub output_root: &'a Path,
    pub mode: MergeMode,
    pub seed: SeedMode,
    pub strategies: &'a StrategyTable,
    pub removal: &'a RemovalPolicy,
    /// Worker count; 0 lets rayon decide.
    pub jobs: usize,
    pub cancel: &'a CancellationToken,
    pub progress: Option<ProgressFn<'a>>,
}

/// Execute Phase 4 over `records`.
pub fn execute(records: &[ClassificationRecord], options: &ExecuteOptions) -> Result<Vec<MergeOutcome>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.jobs)
        .build()
        .map_err(|e| Error::WorkerPool {
            message: e.to_string(),
        })?;

    let total = records.len();
    let completed = AtomicUsize::new(0);

    let outcomes: Vec<Option<MergeOutcome>> = pool.install(|| {
        records
            .par_iter()
            .map(|record| {
                if options.cancel.is_cancelled() {
                    return None;
                }
                let outcome = execute_record(record, options);
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(progress) = options.progress {
                    progress(done, total, &record.relative_path);
                }
                Some(outcome)
            })
            .collect()
    });

    if options.cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    let outcomes: Vec<MergeOutcome> = outcomes.into_iter().flatten().collect();
    prune_empty_dirs(options.output_root, &outcomes);
    Ok(outcomes)
}

fn execute_record(record: &ClassificationRecord, options: &ExecuteOptions) -> MergeOutcome {
    let rel = record.relative_path.as_str();
    let target = options.output_root.join(rel);

    match record.status {
        Status::Unchanged => MergeOutcome::new(rel, Status::Unchanged, Action::Skipped),
        Status::Added => copy_added(record, &target),
        Status::Removed => remove_path(rel, &target, options),
        Status::Modified => merge_modified(record, &target, options),
    }
}

fn copy_added(record: &ClassificationRecord, target: &Path) -> MergeOutcome {
    let rel = record.relative_path.as_str();
    let Some(source) = record.source.as_deref() else {
        return failed(rel, Status::Added, "added path has no SOURCE location".to_string());
    };

    match filesystem::copy_file(source, target) {
        Ok(bytes) => {
            debug!("Copied {}", rel);
            let mut outcome = MergeOutcome::new(rel, Status::Added, Action::Copied);
            outcome.byte_count = bytes;
            outcome
        }
        Err(e) => {
            let err = Error::write(target, &e);
            warn!("{}", err);
            failed(rel, Status::Added, err.to_string())
        }
    }
}

fn remove_path(rel: &str, target: &Path, options: &ExecuteOptions) -> MergeOutcome {
    if options.seed == SeedMode::Empty {
        return MergeOutcome::new(rel, Status::Removed, Action::Skipped);
    }

    let stale_root = defaults::stale_dir(options.output_root);
    let holding_dir = match stale_root.join(rel).parent() {
        Some(dir) => dir.to_path_buf(),
        None => stale_root.clone(),
    };

    match filesystem::remove_tree_safely_into(target, options.removal, &holding_dir) {
        Ok(removal) => {
            debug!("Deleted {}", rel);
            deleted(rel, &removal, &stale_root)
        }
        Err(e) => {
            warn!("{}", e);
            failed(rel, Status::Removed, e.to_string())
        }
    }
}

/// Outcome of a removed path; a deferred deletion carries a warning.
fn deleted(rel: &str, removal: &Removal, stale_root: &Path) -> MergeOutcome {
    let mut outcome = MergeOutcome::new(rel, Status::Removed, Action::Deleted);
    if let Removal::Deferred { moved_to } = removal {
        let shown = stale_root
            .parent()
            .and_then(|parent| moved_to.strip_prefix(parent).ok())
            .unwrap_or(moved_to.as_path());
        outcome.warning = Some(format!(
            "could not be deleted; moved to {}",
            shown.display()
        ));
    }
    outcome
}

fn merge_modified(record: &ClassificationRecord, target: &Path, options: &ExecuteOptions) -> MergeOutcome {
    let rel = record.relative_path.as_str();
    let mut read_errors = Vec::new();
    if let Some(e) = &record.read_error {
        read_errors.push(e.clone());
    }

    let base = read_side(record.base.as_deref(), &mut read_errors);
    let source = read_side(record.source.as_deref(), &mut read_errors);
    read_errors.dedup();

    let strategy = merge::select_strategy(
        rel,
        Some(&base),
        Some(&source),
        options.mode,
        options.strategies,
    );

    let mut outcome = match merge::apply(strategy, rel, &base, &source, options.strategies) {
        Merged::Untouched => {
            debug!("No new lines for {}", rel);
            MergeOutcome::new(rel, Status::Unchanged, Action::Skipped)
        }
        Merged::Write(content) => match filesystem::write_file(target, &content) {
            Ok(()) => {
                debug!("Merged {} with {}", rel, strategy);
                let mut outcome =
                    MergeOutcome::new(rel, Status::Modified, Action::for_strategy(strategy));
                outcome.byte_count = content.len() as u64;
                outcome
            }
            Err(e) => {
                let err = Error::write(target, &e);
                warn!("{}", err);
                read_errors.push(err.to_string());
                MergeOutcome::new(rel, Status::Modified, Action::Failed)
            }
        },
    };

    outcome.strategy = Some(strategy);
    if !read_errors.is_empty() {
        outcome.error = Some(read_errors.join("; "));
    }
    outcome
}

/// Read one side of a modified file, degrading to empty content.
fn read_side(location: Option<&Path>, errors: &mut Vec<String>) -> Vec<u8> {
    let Some(location) = location else {
        return Vec::new();
    };
    match fs::read(location) {
        Ok(bytes) => bytes,
        Err(e) => {
            let err = Error::read(location, &e);
            warn!("{}; merging against empty content", err);
            errors.push(err.to_string());
            Vec::new()
        }
    }
}

fn failed(rel: &str, status: Status, message: String) -> MergeOutcome {
    let mut outcome = MergeOutcome::new(rel, status, Action::Failed);
    outcome.error = Some(message);
    outcome
}

/// Remove directories emptied by deletions, deepest first, up to the root.
fn prune_empty_dirs(output_root: &Path, outcomes: &[MergeOutcome]) {
    let mut dirs: Vec<&Path> = outcomes
        .iter()
        .filter(|o| o.action == Action::Deleted)
        .flat_map(|o| Path::new(o.relative_path.as_str()).ancestors().skip(1))
        .filter(|p| !p.as_os_str().is_empty())
        .collect();
    dirs.sort_by(|a, b| {
        b.components()
            .count()
            .cmp(&a.components().count())
            .then_with(|| a.cmp(b))
    });
    dirs.dedup();

    for dir in dirs {
        // Fails harmlessly when the directory still has entries.
        let _ = fs::remove_dir(output_root.join(dir));
    }
}

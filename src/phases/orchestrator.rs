//! Orchestrator for a complete merge run
//!
//! This module coordinates all phases behind one call. A run folds each
//! SOURCE into the output in order:
//!
//! - Stage 1 compares BASE with the first SOURCE. The output is reset and
//!   seeded according to the run's seed mode before anything is merged.
//! - Every later stage compares the output produced so far (acting as BASE)
//!   with the next SOURCE and merges in place.
//!
//! Each stage collects, classifies and executes, and contributes one block to
//! the report written at the end. Files that could not be seeded and files
//! whose names are not valid UTF-8 become error outcomes of their stage.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::classify::{self, Status};
use super::seed::SeedFailure;
use super::{execute, seed};
use crate::cancel::CancellationToken;
use crate::config::{RunConfig, SeedMode};
use crate::error::{Error, Result};
use crate::report::{self, Action, MergeOutcome, RunSummary, StageReport};
use crate::snapshot::{self, TreeSnapshot};

pub use super::execute::ProgressFn;

/// Execute a complete merge run and write its report.
///
/// Returns `Err` only for failures that abort the run (inaccessible roots,
/// overlapping layout, cancellation, an unwritable report). Per-file
/// failures are part of the returned summary.
pub fn execute_merge(
    config: &RunConfig,
    cancel: &CancellationToken,
    progress: Option<ProgressFn<'_>>,
) -> Result<RunSummary> {
    seed::validate_layout(config)?;
    let ignore = snapshot::compile_ignore(&config.ignore)?;

    let mut stages = Vec::with_capacity(config.sources.len());

    for (i, source_root) in config.sources.iter().enumerate() {
        let index = i + 1;
        let (base, source) = if index == 1 {
            snapshot::collect_pair(&config.base_root, source_root, &ignore)?
        } else {
            snapshot::collect_pair(&config.output_root, source_root, &ignore)?
        };
        check_cancelled(cancel)?;
        debug!(
            "Stage {}: {} files ({} bytes) against {} files ({} bytes)",
            index,
            base.len(),
            base.total_bytes(),
            source.len(),
            source.total_bytes()
        );

        let (stage_seed, seed_failures) = if index == 1 {
            let prepared = seed::execute(&config.output_root, config.seed, &base, &config.removal)?;
            (config.seed, prepared.failed)
        } else {
            (SeedMode::Base, Vec::new())
        };

        let mut outcomes = run_stage(config, &base, &source, stage_seed, cancel, progress)?;
        attach_seed_failures(&mut outcomes, &seed_failures);
        outcomes.extend(unsupported_outcomes(&base, &source));
        let stage = StageReport { index, outcomes };
        let counts = stage.counts();
        info!(
            "Stage {}: {} added, {} modified, {} removed, {} unchanged, {} errors",
            index, counts.added, counts.modified, counts.removed, counts.unchanged, counts.errors
        );
        stages.push(stage);
    }

    let summary = RunSummary {
        mode: config.mode,
        seed: config.seed,
        stages,
    };
    report::write_report(&summary, &config.report_path)?;
    info!("Report written to {}", config.report_path.display());
    Ok(summary)
}

fn run_stage(
    config: &RunConfig,
    base: &TreeSnapshot,
    source: &TreeSnapshot,
    seed: SeedMode,
    cancel: &CancellationToken,
    progress: Option<ProgressFn<'_>>,
) -> Result<Vec<MergeOutcome>> {
    let records = classify::execute(base, source);
    check_cancelled(cancel)?;

    let options = execute::ExecuteOptions {
        output_root: &config.output_root,
        mode: config.mode,
        seed,
        strategies: &config.strategies,
        removal: &config.removal,
        jobs: config.jobs,
        cancel,
        progress,
    };
    execute::execute(&records, &options)
}

/// Mark paths whose seeded copy is missing from the output.
///
/// Only outcomes that left the output alone are affected; a path the executor
/// wrote, or that was meant to disappear, is already correct.
fn attach_seed_failures(outcomes: &mut [MergeOutcome], failures: &[SeedFailure]) {
    if failures.is_empty() {
        return;
    }
    let by_path: HashMap<&str, &str> = failures
        .iter()
        .map(|f| (f.relative_path.as_str(), f.message.as_str()))
        .collect();

    for outcome in outcomes.iter_mut() {
        let Some(message) = by_path.get(outcome.relative_path.as_str()) else {
            continue;
        };
        if outcome.action == Action::Skipped
            && outcome.status != Status::Removed
            && outcome.error.is_none()
        {
            outcome.error = Some((*message).to_string());
        }
    }
}

/// One failed outcome per path left out of collection for its name.
fn unsupported_outcomes(base: &TreeSnapshot, source: &TreeSnapshot) -> Vec<MergeOutcome> {
    let in_base: BTreeSet<&PathBuf> = base.unsupported_paths().iter().collect();
    let in_source: BTreeSet<&PathBuf> = source.unsupported_paths().iter().collect();

    in_base
        .union(&in_source)
        .map(|path| {
            let status = match (in_base.contains(path), in_source.contains(path)) {
                (true, true) => Status::Modified,
                (true, false) => Status::Removed,
                _ => Status::Added,
            };
            let mut outcome = MergeOutcome::new(path.to_string_lossy(), status, Action::Failed);
            outcome.error = Some("file name is not valid UTF-8; left out of the merge".to_string());
            outcome
        })
        .collect()
}

/// Classify BASE against one SOURCE without writing anything.
pub fn execute_compare(
    base_root: &Path,
    source_root: &Path,
    ignore: &[String],
) -> Result<Vec<classify::ClassificationRecord>> {
    let ignore = snapshot::compile_ignore(ignore)?;
    let (base, source) = snapshot::collect_pair(base_root, source_root, &ignore)?;
    Ok(classify::execute(&base, &source))
}

fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}

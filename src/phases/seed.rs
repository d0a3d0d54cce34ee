//! # Phase 3: Output Preparation
//!
//! Validates the layout of the run and prepares the output directory before
//! any merge result is written.
//!
//! ## Process
//!
//! 1.  **Layout check**: the output may not be, contain, or sit inside BASE or
//!     any SOURCE. Otherwise collecting one tree would pick up the other.
//!
//! 2.  **Reset**: an existing output directory is removed through the
//!     filesystem safety layer. A removal that had to be deferred (the old
//!     tree was renamed aside) still frees the name.
//!
//! 3.  **Seed**: with [`SeedMode::Base`] every file of the BASE snapshot is
//!     copied in, so version-control metadata and ignored paths never reach
//!     the output. With [`SeedMode::Empty`] the directory stays empty. A BASE
//!     file that cannot be copied is logged and returned in
//!     [`SeedOutcome::failed`]; the run goes on without it.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::{RemovalPolicy, RunConfig, SeedMode};
use crate::error::{Error, Result};
use crate::filesystem::{self, Removal};
use crate::snapshot::TreeSnapshot;

/// Reject runs whose roots overlap or whose options conflict.
pub fn validate_layout(config: &RunConfig) -> Result<()> {
    if config.sources.is_empty() {
        return Err(Error::InvalidLayout {
            message: "at least one SOURCE tree is required".to_string(),
        });
    }
    if config.sources.len() > 1 && config.seed == SeedMode::Empty {
        return Err(Error::InvalidLayout {
            message: "merging several SOURCE trees requires the 'base' seed mode".to_string(),
        });
    }

    let output = absolute(&config.output_root)?;
    let mut inputs = vec![("BASE", &config.base_root)];
    inputs.extend(config.sources.iter().map(|s| ("SOURCE", s)));

    for (label, input) in inputs {
        let input_abs = std::fs::canonicalize(input).map_err(|e| Error::access(input, e.to_string()))?;
        if output.starts_with(&input_abs) || input_abs.starts_with(&output) {
            return Err(Error::InvalidLayout {
                message: format!(
                    "output '{}' overlaps {} '{}'",
                    config.output_root.display(),
                    label,
                    input.display()
                ),
            });
        }
    }
    Ok(())
}

/// Absolute form of a path that may not exist yet.
///
/// The deepest existing ancestor is canonicalized and the missing tail is
/// appended, so symlinked parents compare equal to their targets.
fn absolute(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut existing = joined.as_path();
    let mut tail = Vec::new();
    loop {
        if let Ok(canonical) = std::fs::canonicalize(existing) {
            let mut result = canonical;
            for part in tail.iter().rev() {
                result.push(part);
            }
            return Ok(result);
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(joined),
        }
    }
}

/// A BASE file that could not be copied into the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedFailure {
    pub relative_path: String,
    pub message: String,
}

/// What preparing the output did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedOutcome {
    pub previous_output: Removal,
    pub seeded_files: usize,
    /// Sorted by relative path.
    pub failed: Vec<SeedFailure>,
}

/// Execute Phase 3: reset the output and seed it.
pub fn execute(
    output_root: &Path,
    seed: SeedMode,
    base: &TreeSnapshot,
    policy: &RemovalPolicy,
) -> Result<SeedOutcome> {
    let previous_output = filesystem::remove_tree_safely(output_root, policy)?;
    if previous_output != Removal::Absent {
        info!("Cleared previous output at {}", output_root.display());
    }

    std::fs::create_dir_all(output_root).map_err(|e| Error::write(output_root, &e))?;

    let failed = match seed {
        SeedMode::Empty => Vec::new(),
        SeedMode::Base => seed_from(base, output_root)?,
    };
    let seeded_files = match seed {
        SeedMode::Empty => 0,
        SeedMode::Base => base.len() - failed.len(),
    };
    debug!("Seeded {} files into {}", seeded_files, output_root.display());

    Ok(SeedOutcome {
        previous_output,
        seeded_files,
        failed,
    })
}

fn seed_from(base: &TreeSnapshot, output_root: &Path) -> Result<Vec<SeedFailure>> {
    let entries: Vec<_> = base.iter().collect();
    let failures: Mutex<Vec<SeedFailure>> = Mutex::new(Vec::new());

    entries.par_iter().for_each(|(rel, entry)| {
        let target = output_root.join(rel.as_str());
        if let Err(e) = filesystem::copy_file(&entry.location, &target) {
            // Drop whatever part of the copy was written.
            let _ = std::fs::remove_file(&target);
            let err = Error::read(&entry.location, &e);
            warn!("{}; '{}' left out of the seeded output", err, rel);
            if let Ok(mut failures) = failures.lock() {
                failures.push(SeedFailure {
                    relative_path: rel.to_string(),
                    message: err.to_string(),
                });
            }
        }
    });

    let mut failures = failures.into_inner().map_err(|_| Error::LockPoisoned {
        context: "seed failures".to_string(),
    })?;
    failures.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(failures)
}

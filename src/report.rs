//! # Merge Outcomes and Report Writer
//!
//! Every classified path produces one [`MergeOutcome`]. Outcomes are grouped
//! per SOURCE stage into a [`StageReport`], and the stages of one run form a
//! [`RunSummary`].
//!
//! The rendered report is plain, line-oriented text with no timestamps and no
//! absolute paths, so identical inputs always render identical bytes:
//!
//! ```text
//! MERGE WIZARD REPORT
//! mode: diff
//! seed: base
//!
//! == ORIGEM 1 ==
//! ADICIONADOS: 1
//! MODIFICADOS: 1
//! REMOVIDOS: 0
//! INALTERADOS: 4
//! CONFLITOS: 0
//! ERROS: 0
//!
//! [ADICIONADOS]
//! A assets/logo.png
//! [MODIFICADOS]
//! M README.md
//!
//! STATUS: OK
//! ```
//!
//! Every path list is sorted before it is written, so the report does not
//! depend on the order in which outcomes were produced.
//!
//! Warnings such as a deletion that had to be deferred are listed under
//! `[AVISOS]` and do not change the STATUS line.

use std::fmt::{self, Write as _};
use std::path::Path;

use crate::config::{MergeMode, SeedMode};
use crate::error::{Error, Result};
use crate::filesystem;
use crate::merge::Strategy;
use crate::phases::classify::Status;

/// What the executor did with one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// SOURCE copied to the output (added path).
    Copied,
    /// Unified diff written.
    Diffed,
    /// Novel SOURCE lines appended to BASE.
    LineMerged,
    /// Both versions written between conflict markers.
    ConflictBlocked,
    /// SOURCE bytes written over BASE.
    BinaryUpdated,
    /// Nothing written (unchanged, or removed with an empty seed).
    Skipped,
    /// Removed path deleted from a BASE-seeded output.
    Deleted,
    /// The write or delete failed; see [`MergeOutcome::error`].
    Failed,
}

impl Action {
    /// Action reported for a successful write by `strategy`.
    pub fn for_strategy(strategy: Strategy) -> Self {
        match strategy {
            Strategy::BinaryOverwrite => Action::BinaryUpdated,
            Strategy::LineDiff => Action::Diffed,
            Strategy::LineAdditionMerge => Action::LineMerged,
            Strategy::ConflictBlock => Action::ConflictBlocked,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Copied => "copied",
            Action::Diffed => "diffed",
            Action::LineMerged => "line-merged",
            Action::ConflictBlocked => "conflict-blocked",
            Action::BinaryUpdated => "binary-updated",
            Action::Skipped => "skipped",
            Action::Deleted => "deleted",
            Action::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of merging one relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub relative_path: String,
    /// Effective status; an addition merge with nothing new reports `Unchanged`.
    pub status: Status,
    pub action: Action,
    pub strategy: Option<Strategy>,
    /// Bytes written to the output.
    pub byte_count: u64,
    /// Read or write failure attached to this path.
    pub error: Option<String>,
    /// Non-fatal problem worth reporting, such as a deferred deletion.
    pub warning: Option<String>,
}

impl MergeOutcome {
    pub fn new(relative_path: impl Into<String>, status: Status, action: Action) -> Self {
        Self {
            relative_path: relative_path.into(),
            status,
            action,
            strategy: None,
            byte_count: 0,
            error: None,
            warning: None,
        }
    }
}

/// Per-run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    pub added: usize,
    pub modified: usize,
    pub removed: usize,
    pub unchanged: usize,
    pub conflicts: usize,
    pub errors: usize,
    pub bytes_written: u64,
}

impl RunCounts {
    pub fn from_outcomes(outcomes: &[MergeOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut counts, outcome| {
            match outcome.status {
                Status::Added => counts.added += 1,
                Status::Modified => counts.modified += 1,
                Status::Removed => counts.removed += 1,
                Status::Unchanged => counts.unchanged += 1,
            }
            if outcome.action == Action::ConflictBlocked {
                counts.conflicts += 1;
            }
            if outcome.error.is_some() {
                counts.errors += 1;
            }
            counts.bytes_written += outcome.byte_count;
            counts
        })
    }

    fn absorb(&mut self, other: &RunCounts) {
        self.added += other.added;
        self.modified += other.modified;
        self.removed += other.removed;
        self.unchanged += other.unchanged;
        self.conflicts += other.conflicts;
        self.errors += other.errors;
        self.bytes_written += other.bytes_written;
    }
}

/// Outcomes of folding one SOURCE into the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    /// 1-based SOURCE position.
    pub index: usize,
    pub outcomes: Vec<MergeOutcome>,
}

impl StageReport {
    pub fn counts(&self) -> RunCounts {
        RunCounts::from_outcomes(&self.outcomes)
    }
}

/// How a finished run went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Clean,
    CompletedWithErrors(usize),
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Clean => write!(f, "OK"),
            RunStatus::CompletedWithErrors(n) => write!(f, "COMPLETED WITH {} ERRORS", n),
        }
    }
}

/// Everything a finished run reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub mode: MergeMode,
    pub seed: SeedMode,
    pub stages: Vec<StageReport>,
}

impl RunSummary {
    pub fn counts(&self) -> RunCounts {
        let mut total = RunCounts::default();
        for stage in &self.stages {
            total.absorb(&stage.counts());
        }
        total
    }

    pub fn status(&self) -> RunStatus {
        match self.counts().errors {
            0 => RunStatus::Clean,
            n => RunStatus::CompletedWithErrors(n),
        }
    }

    /// Render the report text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "MERGE WIZARD REPORT");
        let _ = writeln!(out, "mode: {}", self.mode);
        let _ = writeln!(out, "seed: {}", self.seed);

        for stage in &self.stages {
            render_stage(&mut out, stage);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "STATUS: {}", self.status());
        out
    }
}

fn render_stage(out: &mut String, stage: &StageReport) {
    let counts = stage.counts();
    let _ = writeln!(out);
    let _ = writeln!(out, "== ORIGEM {} ==", stage.index);
    let _ = writeln!(out, "ADICIONADOS: {}", counts.added);
    let _ = writeln!(out, "MODIFICADOS: {}", counts.modified);
    let _ = writeln!(out, "REMOVIDOS: {}", counts.removed);
    let _ = writeln!(out, "INALTERADOS: {}", counts.unchanged);
    let _ = writeln!(out, "CONFLITOS: {}", counts.conflicts);
    let _ = writeln!(out, "ERROS: {}", counts.errors);

    let mut sorted: Vec<&MergeOutcome> = stage.outcomes.iter().collect();
    sorted.sort_by(|a, b| a.relative_path.as_bytes().cmp(b.relative_path.as_bytes()));

    let mut wrote_blank = false;
    let mut section = |out: &mut String, title: &str, lines: Vec<String>| {
        if lines.is_empty() {
            return;
        }
        if !wrote_blank {
            let _ = writeln!(out);
            wrote_blank = true;
        }
        let _ = writeln!(out, "[{}]", title);
        for line in lines {
            let _ = writeln!(out, "{}", line);
        }
    };

    let by_status = |status: Status| -> Vec<String> {
        sorted
            .iter()
            .filter(|o| o.status == status)
            .map(|o| format!("{} {}", status.code(), o.relative_path))
            .collect()
    };

    section(out, "ADICIONADOS", by_status(Status::Added));
    section(out, "MODIFICADOS", by_status(Status::Modified));
    section(out, "REMOVIDOS", by_status(Status::Removed));
    section(
        out,
        "CONFLITOS",
        sorted
            .iter()
            .filter(|o| o.action == Action::ConflictBlocked)
            .map(|o| format!("C {}", o.relative_path))
            .collect(),
    );
    section(
        out,
        "AVISOS",
        sorted
            .iter()
            .filter_map(|o| {
                o.warning
                    .as_ref()
                    .map(|w| format!("W {}: {}", o.relative_path, w))
            })
            .collect(),
    );
    section(
        out,
        "ERROS",
        sorted
            .iter()
            .filter_map(|o| {
                o.error
                    .as_ref()
                    .map(|e| format!("E {}: {}", o.relative_path, e))
            })
            .collect(),
    );
}

/// Render `summary` and write it to `destination`.
pub fn write_report(summary: &RunSummary, destination: &Path) -> Result<()> {
    filesystem::write_file(destination, summary.render().as_bytes())
        .map_err(|e| Error::write(destination, &e))
}

/// One `<CODE> <path>` line per changed record, sorted by path.
pub fn render_listing<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, Status)>,
{
    let mut entries: Vec<(&str, Status)> = entries
        .into_iter()
        .filter(|(_, status)| *status != Status::Unchanged)
        .collect();
    entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    let mut out = String::new();
    for (path, status) in entries {
        let _ = writeln!(out, "{} {}", status.code(), path);
    }
    out
}

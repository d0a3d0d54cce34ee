//! Content merge strategies
//!
//! This module decides how a single modified file is merged and produces the
//! bytes written to the output tree. Each strategy lives in its own
//! submodule:
//!
//! - Unified line diff (diff.rs)
//! - Line-addition merge (additions.rs)
//! - Conflict block (conflict.rs)
//!
//! Binary overwrite needs no submodule: it takes SOURCE verbatim.
//!
//! ## Selection
//!
//! [`select_strategy`] consults the [`StrategyTable`] by extension, case
//! insensitively, in this order:
//!
//! 1. binary extension -> [`Strategy::BinaryOverwrite`]
//! 2. text extension -> [`Strategy::LineDiff`] or [`Strategy::LineAdditionMerge`],
//!    depending on the run's [`MergeMode`]
//! 3. anything else -> [`Strategy::ConflictBlock`], unless either side
//!    contains a NUL byte near its start, in which case it is binary

pub mod additions;
pub mod conflict;
pub mod diff;

use std::fmt;

use crate::config::{FileKind, MergeMode, StrategyTable};

/// Bytes inspected when sniffing unrecognized files for binary content.
const SNIFF_LEN: usize = 8000;

/// Content merge algorithm for one modified file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    BinaryOverwrite,
    LineDiff,
    LineAdditionMerge,
    ConflictBlock,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::BinaryOverwrite => "binary-overwrite",
            Strategy::LineDiff => "line-diff",
            Strategy::LineAdditionMerge => "line-addition-merge",
            Strategy::ConflictBlock => "conflict-block",
        };
        f.write_str(name)
    }
}

/// What a strategy wants done with the output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Merged {
    /// Write these bytes.
    Write(Vec<u8>),
    /// Leave the output as it is; the file counts as unchanged.
    Untouched,
}

/// Pick the strategy for a modified file.
pub fn select_strategy(
    relative_path: &str,
    base: Option<&[u8]>,
    source: Option<&[u8]>,
    mode: MergeMode,
    table: &StrategyTable,
) -> Strategy {
    match table.rule_for(relative_path).map(|rule| rule.kind) {
        Some(FileKind::Binary) => Strategy::BinaryOverwrite,
        Some(FileKind::Text) => match mode {
            MergeMode::Diff => Strategy::LineDiff,
            MergeMode::Additions => Strategy::LineAdditionMerge,
        },
        None => {
            if base.is_some_and(looks_binary) || source.is_some_and(looks_binary) {
                Strategy::BinaryOverwrite
            } else {
                Strategy::ConflictBlock
            }
        }
    }
}

/// Apply `strategy` to the two versions of `relative_path`.
pub fn apply(
    strategy: Strategy,
    relative_path: &str,
    base: &[u8],
    source: &[u8],
    table: &StrategyTable,
) -> Merged {
    match strategy {
        Strategy::BinaryOverwrite => Merged::Write(source.to_vec()),
        Strategy::LineDiff => {
            let base = String::from_utf8_lossy(base);
            let source = String::from_utf8_lossy(source);
            Merged::Write(diff::unified_diff(&base, &source).into_bytes())
        }
        Strategy::LineAdditionMerge => {
            let base = String::from_utf8_lossy(base);
            let source = String::from_utf8_lossy(source);
            match additions::merge_additions(&base, &source, table.comment_for(relative_path)) {
                Some(merged) => Merged::Write(merged.into_bytes()),
                None => Merged::Untouched,
            }
        }
        Strategy::ConflictBlock => Merged::Write(conflict::conflict_block(base, source)),
    }
}

/// True when the leading bytes contain a NUL.
pub fn looks_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(SNIFF_LEN).any(|&b| b == 0)
}

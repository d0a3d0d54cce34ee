//! # Phase 2: Classification
//!
//! Labels every relative path seen in either snapshot as added, removed,
//! unchanged or modified.
//!
//! ## Process
//!
//! 1.  **Union**: The path keys of both snapshots are merged into one sorted
//!     set (byte-wise lexicographic order), so the output never depends on
//!     the host filesystem's directory-entry order.
//!
//! 2.  **Presence**: Paths present on only one side are added or removed.
//!
//! 3.  **Content**: Paths present on both sides are compared byte for byte.
//!     Timestamps and permission bits are never consulted. Comparisons run
//!     on the rayon pool; `collect` keeps the sorted order.
//!
//! A file that cannot be read is classified as modified and carries the read
//! error, so the executor merges it against empty content instead of aborting
//! the whole run.

use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use log::warn;
use rayon::prelude::*;

use crate::error::Error;
use crate::snapshot::TreeSnapshot;

/// Change status of one relative path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    Added,
    Removed,
    Modified,
    Unchanged,
}

impl Status {
    /// One-letter code used in reports.
    pub fn code(self) -> char {
        match self {
            Status::Added => 'A',
            Status::Removed => 'D',
            Status::Modified => 'M',
            Status::Unchanged => '=',
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Added => "added",
            Status::Removed => "removed",
            Status::Modified => "modified",
            Status::Unchanged => "unchanged",
        };
        f.write_str(label)
    }
}

/// Classification of one relative path.
///
/// `base` is absent exactly for [`Status::Added`] and `source` exactly for
/// [`Status::Removed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRecord {
    pub relative_path: String,
    pub status: Status,
    pub base: Option<PathBuf>,
    pub source: Option<PathBuf>,
    /// Set when the content comparison failed and the path degraded to modified.
    pub read_error: Option<String>,
}

/// Execute Phase 2: classify the union of both snapshots.
pub fn execute(base: &TreeSnapshot, source: &TreeSnapshot) -> Vec<ClassificationRecord> {
    let union: BTreeSet<&String> = base.paths().chain(source.paths()).collect();
    let union: Vec<&String> = union.into_iter().collect();

    union
        .par_iter()
        .map(|rel| classify_path(rel, base, source))
        .collect()
}

fn classify_path(rel: &str, base: &TreeSnapshot, source: &TreeSnapshot) -> ClassificationRecord {
    let base_entry = base.get(rel);
    let source_entry = source.get(rel);

    let (status, read_error) = match (base_entry, source_entry) {
        (None, Some(_)) => (Status::Added, None),
        (Some(_), None) => (Status::Removed, None),
        (Some(b), Some(s)) => match files_identical(&b.location, &s.location) {
            Ok(true) => (Status::Unchanged, None),
            Ok(false) => (Status::Modified, None),
            Err(e) => {
                warn!("{}; treating '{}' as modified", e, rel);
                (Status::Modified, Some(e.to_string()))
            }
        },
        (None, None) => unreachable!("path {} came from one of the snapshots", rel),
    };

    ClassificationRecord {
        relative_path: rel.to_string(),
        status,
        base: base_entry.map(|e| e.location.clone()),
        source: source_entry.map(|e| e.location.clone()),
        read_error,
    }
}

/// Stream both files and compare them byte for byte.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool, Error> {
    let meta_a = std::fs::metadata(a).map_err(|e| Error::read(a, &e))?;
    let meta_b = std::fs::metadata(b).map_err(|e| Error::read(b, &e))?;
    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }

    let mut reader_a = BufReader::new(File::open(a).map_err(|e| Error::read(a, &e))?);
    let mut reader_b = BufReader::new(File::open(b).map_err(|e| Error::read(b, &e))?);
    let mut buf_a = [0u8; 8192];
    let mut buf_b = [0u8; 8192];

    loop {
        let n = read_full(&mut reader_a, &mut buf_a).map_err(|e| Error::read(a, &e))?;
        let m = read_full(&mut reader_b, &mut buf_b).map_err(|e| Error::read(b, &e))?;
        if n != m || buf_a[..n] != buf_b[..m] {
            return Ok(false);
        }
        if n == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the reader allows; returns bytes read (0 at EOF).
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Per-status counts of a classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub unchanged: usize,
}

impl StatusCounts {
    pub fn from_records(records: &[ClassificationRecord]) -> Self {
        let mut counts = Self::default();
        for record in records {
            match record.status {
                Status::Added => counts.added += 1,
                Status::Removed => counts.removed += 1,
                Status::Modified => counts.modified += 1,
                Status::Unchanged => counts.unchanged += 1,
            }
        }
        counts
    }

    pub fn changed(&self) -> usize {
        self.added + self.removed + self.modified
    }
}

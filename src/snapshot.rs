//! # Path Collector
//!
//! Enumerates every file under a root into an immutable [`TreeSnapshot`]:
//! a mapping from relative path (POSIX style, `/` separated, case-sensitive)
//! to the file's absolute location and byte length.
//!
//! Version-control metadata (see [`defaults::VCS_DIRS`]) is always pruned.
//! Files whose relative path is not valid UTF-8 cannot be keyed without
//! changing their name, so they are left out of the map and listed in
//! [`TreeSnapshot::unsupported_paths`] instead.
//! Symbolic links are followed; `walkdir` reports link loops instead of
//! descending into them, and those entries are logged and skipped.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use glob::Pattern;
use log::{debug, warn};

use crate::defaults;
use crate::error::{Error, Result};

/// One collected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub location: PathBuf,
    pub len: u64,
}

/// Immutable relative-path -> file map for one root.
///
/// Iteration is in byte-wise lexicographic order of the relative paths.
#[derive(Debug, Clone, Default)]
pub struct TreeSnapshot {
    root: PathBuf,
    entries: BTreeMap<String, SnapshotEntry>,
    unsupported: Vec<PathBuf>,
}

impl TreeSnapshot {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&self, relative_path: &str) -> Option<&SnapshotEntry> {
        self.entries.get(relative_path)
    }

    pub fn contains(&self, relative_path: &str) -> bool {
        self.entries.contains_key(relative_path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SnapshotEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Relative paths skipped because they are not valid UTF-8, sorted.
    pub fn unsupported_paths(&self) -> &[PathBuf] {
        &self.unsupported
    }

    /// Total size of all collected files in bytes.
    pub fn total_bytes(&self) -> u64 {
        self.entries.values().map(|e| e.len).sum()
    }
}

/// Compile user ignore patterns.
pub fn compile_ignore(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).map_err(Error::Glob))
        .collect()
}

/// Collect all files under `root`.
///
/// Fails with [`Error::Access`] when `root` is missing or not a directory.
/// Unreadable subdirectories and link loops are logged and skipped.
pub fn collect(root: &Path, ignore: &[Pattern]) -> Result<TreeSnapshot> {
    let metadata = std::fs::metadata(root).map_err(|e| Error::access(root, e.to_string()))?;
    if !metadata.is_dir() {
        return Err(Error::access(root, "not a directory"));
    }

    let mut entries = BTreeMap::new();
    let mut unsupported = Vec::new();

    let walker = walkdir::WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            if defaults::VCS_DIRS.contains(&name.as_ref()) {
                return false;
            }
            if ignore.is_empty() {
                return true;
            }
            match relative_path(root, e.path()).as_deref().and_then(posix_key) {
                Some(rel) => !ignore.iter().any(|p| p.matches(&rel)),
                None => true,
            }
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                if let Some(ancestor) = e.loop_ancestor() {
                    warn!(
                        "Skipping symlink loop at {} (points back to {})",
                        e.path().map(|p| p.display().to_string()).unwrap_or_default(),
                        ancestor.display()
                    );
                } else {
                    warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                }
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(relative) = relative_path(root, entry.path()) else {
            warn!("Skipping path outside root: {}", entry.path().display());
            continue;
        };
        let Some(rel) = posix_key(&relative) else {
            warn!(
                "Skipping {}: file name is not valid UTF-8",
                entry.path().display()
            );
            unsupported.push(relative);
            continue;
        };

        let len = match entry.metadata() {
            Ok(m) => m.len(),
            Err(e) => {
                warn!("Cannot stat {}: {}", entry.path().display(), e);
                0
            }
        };

        entries.insert(
            rel,
            SnapshotEntry {
                location: entry.path().to_path_buf(),
                len,
            },
        );
    }

    unsupported.sort();
    debug!("Collected {} files under {}", entries.len(), root.display());

    Ok(TreeSnapshot {
        root: root.to_path_buf(),
        entries,
        unsupported,
    })
}

/// Collect two roots concurrently.
pub fn collect_pair(
    base: &Path,
    source: &Path,
    ignore: &[Pattern],
) -> Result<(TreeSnapshot, TreeSnapshot)> {
    let (base_snapshot, source_snapshot) =
        rayon::join(|| collect(base, ignore), || collect(source, ignore));
    Ok((base_snapshot?, source_snapshot?))
}

/// Path of `path` below `root`, keeping only normal components.
fn relative_path(root: &Path, path: &Path) -> Option<PathBuf> {
    let relative: PathBuf = path
        .strip_prefix(root)
        .ok()?
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();
    if relative.as_os_str().is_empty() {
        None
    } else {
        Some(relative)
    }
}

/// `/`-joined key of a relative path; `None` when a component is not UTF-8.
fn posix_key(relative: &Path) -> Option<String> {
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<&str>>>()?;
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_collect_nested_files_with_posix_keys() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.txt", "a");
        write(temp.path(), "src/lib/util.lua", "local x = 1");

        let snapshot = collect(temp.path(), &[]).unwrap();
        let paths: Vec<&String> = snapshot.paths().collect();
        assert_eq!(paths, vec!["a.txt", "src/lib/util.lua"]);
        assert_eq!(snapshot.get("src/lib/util.lua").unwrap().len, 11);
        assert_eq!(snapshot.total_bytes(), 12);
    }

    #[test]
    fn test_collect_skips_vcs_metadata() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".git/HEAD", "ref: refs/heads/main");
        write(temp.path(), "sub/.svn/entries", "x");
        write(temp.path(), "sub/keep.txt", "k");

        let snapshot = collect(temp.path(), &[]).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains("sub/keep.txt"));
    }

    #[test]
    fn test_collect_honors_ignore_patterns() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "keep.lua", "");
        write(temp.path(), "scratch.tmp", "");
        write(temp.path(), "build/out.lua", "");

        let ignore = compile_ignore(&["*.tmp".to_string(), "build".to_string()]).unwrap();
        let snapshot = collect(temp.path(), &ignore).unwrap();
        let paths: Vec<&String> = snapshot.paths().collect();
        assert_eq!(paths, vec!["keep.lua"]);
    }

    #[test]
    fn test_collect_missing_root_is_access_error() {
        let temp = TempDir::new().unwrap();
        let err = collect(&temp.path().join("nope"), &[]).unwrap_err();
        assert!(matches!(err, Error::Access { .. }));
    }

    #[test]
    fn test_collect_file_root_is_access_error() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "file.txt", "x");
        let err = collect(&temp.path().join("file.txt"), &[]).unwrap_err();
        assert!(matches!(err, Error::Access { .. }));
    }

    #[test]
    #[cfg(unix)]
    fn test_collect_follows_symlinks_and_survives_loops() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "real/data.txt", "d");
        std::os::unix::fs::symlink(temp.path().join("real"), temp.path().join("alias")).unwrap();
        std::os::unix::fs::symlink(temp.path(), temp.path().join("real/loop")).unwrap();

        let snapshot = collect(temp.path(), &[]).unwrap();
        assert!(snapshot.contains("real/data.txt"));
        assert!(snapshot.contains("alias/data.txt"));
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_collect_sets_aside_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        write(temp.path(), "ok.png", "x");
        let odd = OsStr::from_bytes(b"a\xff.png");
        fs::write(temp.path().join(odd), "y").unwrap();

        let snapshot = collect(temp.path(), &[]).unwrap();
        let paths: Vec<&String> = snapshot.paths().collect();
        assert_eq!(paths, vec!["ok.png"]);
        assert_eq!(snapshot.unsupported_paths(), &[PathBuf::from(odd)]);
    }

    #[test]
    fn test_collect_pair() {
        let base = TempDir::new().unwrap();
        let source = TempDir::new().unwrap();
        write(base.path(), "a.txt", "1");
        write(source.path(), "b.txt", "2");

        let (b, s) = collect_pair(base.path(), source.path(), &[]).unwrap();
        assert!(b.contains("a.txt"));
        assert!(s.contains("b.txt"));
    }
}

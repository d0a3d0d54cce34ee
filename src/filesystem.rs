//! Filesystem safety layer
//!
//! Destructive operations on trees that other processes (editors, indexers,
//! antivirus scanners, a still-running git) may hold open. Deletion is
//! retried with exponential backoff after clearing read-only bits; if the
//! tree still cannot be removed it is renamed aside with a timestamp suffix,
//! which frees its name just as well. Callers removing paths inside the output
//! tree pass a holding directory outside it, so nothing renamed aside is ever
//! collected again. Retries only ever touch the path being removed and never
//! hold a lock shared with other workers.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, warn};

use crate::config::RemovalPolicy;
use crate::error::{Error, Result};

/// Result of a safe removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// The path was deleted.
    Removed,
    /// Nothing existed at the path.
    Absent,
    /// Deletion kept failing; the path was renamed to `moved_to` instead.
    Deferred { moved_to: PathBuf },
}

/// Remove a file or directory tree, retrying and renaming aside on failure.
///
/// A deferred removal is a success: the caller may reuse the name. Only a
/// failure to both delete and rename is returned as an error.
pub fn remove_tree_safely(path: &Path, policy: &RemovalPolicy) -> Result<Removal> {
    remove_with_fallback(path, policy, None)
}

/// Like [`remove_tree_safely`], but a path that cannot be deleted is renamed
/// into `holding_dir` rather than beside itself.
pub fn remove_tree_safely_into(
    path: &Path,
    policy: &RemovalPolicy,
    holding_dir: &Path,
) -> Result<Removal> {
    remove_with_fallback(path, policy, Some(holding_dir))
}

fn remove_with_fallback(
    path: &Path,
    policy: &RemovalPolicy,
    holding_dir: Option<&Path>,
) -> Result<Removal> {
    let attempts = policy.attempts.max(1);
    let mut last_error = None;

    for attempt in 0..attempts {
        let metadata = match fs::symlink_metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(if attempt == 0 {
                    Removal::Absent
                } else {
                    Removal::Removed
                });
            }
            Err(e) => return Err(Error::write(path, &e)),
        };

        let result = if metadata.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };

        match result {
            Ok(()) => return Ok(Removal::Removed),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Removal::Removed),
            Err(e) => {
                debug!(
                    "Removal of {} failed (attempt {}/{}): {}",
                    path.display(),
                    attempt + 1,
                    attempts,
                    e
                );
                clear_readonly(path);
                last_error = Some(e);
                if attempt + 1 < attempts {
                    thread::sleep(backoff(policy.backoff_ms, attempt));
                }
            }
        }
    }

    let moved = match holding_dir {
        Some(dir) => move_aside_into(path, dir),
        None => move_aside(path),
    };
    match moved {
        Ok(moved_to) => {
            warn!(
                "Could not delete {} ({}); moved it to {}",
                path.display(),
                last_error.map(|e| e.to_string()).unwrap_or_default(),
                moved_to.display()
            );
            Ok(Removal::Deferred { moved_to })
        }
        Err(e) => Err(Error::Filesystem {
            message: format!(
                "Failed to remove '{}' and failed to move it aside: {}",
                path.display(),
                e
            ),
        }),
    }
}

/// Rename `path` to a sibling `<name>.stale-<unix seconds>[-n]`.
pub fn move_aside(path: &Path) -> io::Result<PathBuf> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"))?;
    move_aside_into(path, parent)
}

/// Rename `path` to `<dir>/<name>.stale-<unix seconds>[-n]`, creating `dir`.
pub fn move_aside_into(path: &Path, dir: &Path) -> io::Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?
        .to_string_lossy()
        .into_owned();
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    fs::create_dir_all(dir)?;
    let mut target = dir.join(format!("{}.stale-{}", name, stamp));
    let mut counter = 1;
    while fs::symlink_metadata(&target).is_ok() {
        target = dir.join(format!("{}.stale-{}-{}", name, stamp, counter));
        counter += 1;
    }

    fs::rename(path, &target)?;
    Ok(target)
}

/// Write `content` to `path`, creating parent directories.
///
/// A read-only destination is made writable and the write retried once.
pub fn write_file(path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    match fs::write(path, content) {
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied && path.exists() => {
            clear_readonly(path);
            fs::write(path, content)
        }
        other => other,
    }
}

/// Copy `from` to `to`, creating parent directories.
pub fn copy_file(from: &Path, to: &Path) -> io::Result<u64> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    if to.exists() {
        clear_readonly(to);
    }
    fs::copy(from, to)
}

/// Make `path` and everything below it writable by the owner. Best effort.
pub fn clear_readonly(path: &Path) {
    for entry in walkdir::WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
        if entry.path_is_symlink() {
            continue;
        }
        if let Err(e) = make_writable(entry.path(), entry.file_type().is_dir()) {
            debug!("Cannot clear read-only bit on {}: {}", entry.path().display(), e);
        }
    }
}

#[cfg(unix)]
fn make_writable(path: &Path, is_dir: bool) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    let wanted = if is_dir { 0o700 } else { 0o600 };
    if perms.mode() & wanted != wanted {
        perms.set_mode(perms.mode() | wanted);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn make_writable(path: &Path, _is_dir: bool) -> io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    if perms.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

fn backoff(base_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(1u64 << attempt.min(10)))
}

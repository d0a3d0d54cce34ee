//! Remembered "last run" options.
//!
//! The engine never reads or writes these; the CLI loads them before building
//! a [`crate::config::RunConfig`] (`--last`) and saves them after a run
//! (`--remember`). Stored as pretty-printed JSON at
//! [`crate::defaults::default_settings_path`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{MergeMode, SeedMode};
use crate::error::{Error, Result};
use crate::filesystem;

/// Options of the most recent remembered run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastRun {
    #[serde(default)]
    pub base: Option<PathBuf>,
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub mode: Option<MergeMode>,
    #[serde(default)]
    pub seed: Option<SeedMode>,
}

/// Load remembered options; `Ok(None)` when nothing was saved yet.
pub fn load(path: &Path) -> Result<Option<LastRun>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::read(path, &e)),
    };
    Ok(Some(serde_json::from_str(&content)?))
}

/// Save options, creating the settings directory if needed.
pub fn save(path: &Path, last: &LastRun) -> Result<()> {
    let mut json = serde_json::to_string_pretty(last)?;
    json.push('\n');
    filesystem::write_file(path, json.as_bytes()).map_err(|e| Error::write(path, &e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_is_none() {
        let temp = TempDir::new().unwrap();
        assert_eq!(load(&temp.path().join("none.json")).unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cfg/merge-wizard/last-run.json");
        let last = LastRun {
            base: Some(PathBuf::from("/work/base")),
            sources: vec![PathBuf::from("/work/fork")],
            output: Some(PathBuf::from("/work/merged")),
            mode: Some(MergeMode::Additions),
            seed: None,
        };

        save(&path, &last).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"mode\": \"additions\""));
        assert_eq!(load(&path).unwrap(), Some(last));
    }

    #[test]
    fn test_load_corrupt_file_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("last-run.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load(&path), Err(Error::Json(_))));
    }
}

//! # Run Configuration
//!
//! This module defines the immutable [`RunConfig`] that drives a merge run,
//! together with the [`StrategyTable`] consulted by the content strategy
//! selector and the optional YAML configuration file.
//!
//! ## Key Components
//!
//! - **`RunConfig`**: every input of a merge run. It is built once by the
//!   caller (the CLI or another collaborator) and passed by reference into the
//!   engine; the engine never mutates or persists it.
//!
//! - **`StrategyTable`**: a single `{extension -> rule}` table. Each rule says
//!   whether the extension is binary or text and which comment marker to use
//!   for banners. New file types are added to the table, not to the code.
//!
//! - **`ConfigFile`**: the on-disk YAML shape. Every field is optional so a
//!   file only needs to mention what it changes:
//!
//! ```yaml
//! mode: additions
//! seed: base
//! jobs: 4
//! ignore: ["*.tmp", "build/**"]
//! strategies:
//!   luau: { kind: text, comment: "--" }
//!   rbxl: { kind: binary }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};

/// Run-level choice between the two line-oriented text strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Write a unified diff of BASE vs SOURCE for modified text files.
    #[default]
    Diff,
    /// Append SOURCE lines that BASE does not already contain.
    Additions,
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeMode::Diff => write!(f, "diff"),
            MergeMode::Additions => write!(f, "additions"),
        }
    }
}

impl FromStr for MergeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "diff" => Ok(MergeMode::Diff),
            "additions" | "add" => Ok(MergeMode::Additions),
            other => Err(Error::ConfigParse {
                message: format!("unknown merge mode '{}'", other),
                hint: Some("Use 'diff' or 'additions'".to_string()),
            }),
        }
    }
}

/// How the output tree is populated before merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedMode {
    /// Copy BASE into the output first; removed paths are deleted from it.
    #[default]
    Base,
    /// Start from an empty output; only added and modified paths are written.
    Empty,
}

impl fmt::Display for SeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedMode::Base => write!(f, "base"),
            SeedMode::Empty => write!(f, "empty"),
        }
    }
}

impl FromStr for SeedMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(SeedMode::Base),
            "empty" => Ok(SeedMode::Empty),
            other => Err(Error::ConfigParse {
                message: format!("unknown seed mode '{}'", other),
                hint: Some("Use 'base' or 'empty'".to_string()),
            }),
        }
    }
}

/// Broad content class of an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Binary,
    Text,
}

/// Table entry for one extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRule {
    pub kind: FileKind,
    /// Line comment marker used by the addition banner. Defaults to `#`.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Extension-keyed table of content rules.
///
/// Keys are stored lowercase without the leading dot; lookups are
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyTable {
    rules: BTreeMap<String, ExtensionRule>,
}

impl StrategyTable {
    /// An empty table: every file falls through to the conflict block.
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Insert or replace the rule for an extension.
    pub fn insert(&mut self, extension: &str, rule: ExtensionRule) {
        let key = extension.trim_start_matches('.').to_ascii_lowercase();
        self.rules.insert(key, rule);
    }

    /// Look up the rule for a relative path by its extension.
    pub fn rule_for(&self, relative_path: &str) -> Option<&ExtensionRule> {
        let ext = extension_of(relative_path)?;
        self.rules.get(&ext)
    }

    /// Comment marker for a path, falling back to [`defaults::DEFAULT_COMMENT`].
    pub fn comment_for(&self, relative_path: &str) -> &str {
        self.rule_for(relative_path)
            .and_then(|rule| rule.comment.as_deref())
            .unwrap_or(defaults::DEFAULT_COMMENT)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for StrategyTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for ext in defaults::BINARY_EXTENSIONS {
            table.insert(
                ext,
                ExtensionRule {
                    kind: FileKind::Binary,
                    comment: None,
                },
            );
        }
        for (ext, comment) in defaults::TEXT_EXTENSIONS {
            table.insert(
                ext,
                ExtensionRule {
                    kind: FileKind::Text,
                    comment: Some((*comment).to_string()),
                },
            );
        }
        table
    }
}

/// Lowercased extension of the last path segment, if any.
///
/// Dotfiles such as `.gitignore` have no extension.
pub fn extension_of(relative_path: &str) -> Option<String> {
    let name = relative_path.rsplit('/').next().unwrap_or(relative_path);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Retry policy for the filesystem safety layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalPolicy {
    pub attempts: u32,
    pub backoff_ms: u64,
}

impl Default for RemovalPolicy {
    fn default() -> Self {
        Self {
            attempts: defaults::REMOVAL_ATTEMPTS,
            backoff_ms: defaults::REMOVAL_BACKOFF_MS,
        }
    }
}

/// Complete, immutable description of one merge run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub base_root: PathBuf,
    /// SOURCE trees, folded into the output in order.
    pub sources: Vec<PathBuf>,
    pub output_root: PathBuf,
    pub report_path: PathBuf,
    pub mode: MergeMode,
    pub seed: SeedMode,
    /// Worker count for per-file merging; 0 lets rayon decide.
    pub jobs: usize,
    /// Extra glob patterns excluded from collection (relative, `/`-separated).
    pub ignore: Vec<String>,
    pub strategies: StrategyTable,
    pub removal: RemovalPolicy,
}

impl RunConfig {
    /// Build a configuration with defaults for everything but the roots.
    pub fn new(base_root: PathBuf, sources: Vec<PathBuf>, output_root: PathBuf) -> Self {
        let report_path = defaults::default_report_path(&output_root);
        Self {
            base_root,
            sources,
            output_root,
            report_path,
            mode: MergeMode::default(),
            seed: SeedMode::default(),
            jobs: 0,
            ignore: Vec::new(),
            strategies: StrategyTable::default(),
            removal: RemovalPolicy::default(),
        }
    }

    pub fn with_mode(mut self, mode: MergeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: SeedMode) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_report_path(mut self, report_path: PathBuf) -> Self {
        self.report_path = report_path;
        self
    }

    /// Layer a parsed configuration file onto this configuration.
    pub fn with_file(mut self, file: &ConfigFile) -> Self {
        if let Some(mode) = file.mode {
            self.mode = mode;
        }
        if let Some(seed) = file.seed {
            self.seed = seed;
        }
        if let Some(jobs) = file.jobs {
            self.jobs = jobs;
        }
        if let Some(removal) = file.removal {
            self.removal = removal;
        }
        self.ignore.extend(file.ignore.iter().cloned());
        for (ext, rule) in &file.strategies {
            self.strategies.insert(ext, rule.clone());
        }
        self
    }
}

/// On-disk shape of `merge-wizard.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub mode: Option<MergeMode>,
    #[serde(default)]
    pub seed: Option<SeedMode>,
    #[serde(default)]
    pub jobs: Option<usize>,
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub removal: Option<RemovalPolicy>,
    #[serde(default)]
    pub strategies: BTreeMap<String, ExtensionRule>,
}

/// Parse a YAML configuration string.
pub fn parse(yaml: &str) -> Result<ConfigFile> {
    if yaml.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    let file: ConfigFile = serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: Some(
            "Valid keys are mode, seed, jobs, ignore, removal and strategies".to_string(),
        ),
    })?;
    for pattern in &file.ignore {
        glob::Pattern::new(pattern)?;
    }
    Ok(file)
}

/// Read and parse a YAML configuration file.
pub fn from_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigParse {
        message: format!("cannot read '{}': {}", path.display(), e),
        hint: None,
    })?;
    parse(&content)
}

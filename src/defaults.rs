//! Default values for merge-wizard.
//!
//! This module centralizes the well-known names and built-in tables shared by
//! the engine and the CLI, so that every caller agrees on them.

use std::path::{Path, PathBuf};

/// Suffix of the report file written next to the output directory.
///
/// For an output directory `merged/`, the report lands in
/// `merged.merge_report.txt` inside the same parent directory.
pub const REPORT_SUFFIX: &str = ".merge_report.txt";

/// Suffix of the directory beside the output that receives output files
/// whose deletion had to be deferred.
pub const STALE_SUFFIX: &str = ".stale";

/// Directory names that are never collected, seeded or merged.
///
/// Merging version-control bookkeeping corrupts downstream git operations, so
/// this set is mandatory and cannot be turned off by configuration.
pub const VCS_DIRS: &[&str] = &[".git", ".svn", ".hg", ".bzr", "_darcs", "CVS"];

/// Default run configuration file name looked up in the current directory.
pub const CONFIG_FILE: &str = "merge-wizard.yaml";

/// Environment variable overriding the location of the remembered settings.
pub const SETTINGS_ENV: &str = "MERGE_WIZARD_SETTINGS";

/// Number of deletion attempts before a tree is renamed aside.
pub const REMOVAL_ATTEMPTS: u32 = 5;

/// Initial sleep between deletion attempts, doubled after each failure.
pub const REMOVAL_BACKOFF_MS: u64 = 100;

/// Extensions that are always overwritten with the SOURCE bytes.
pub const BINARY_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "tga", "tif", "tiff", "webp", "psd", "dds",
    // audio
    "wav", "mp3", "ogg", "flac", "aac", "m4a", // 3D models
    "fbx", "obj", "blend", "gltf", "glb", "3ds", "dae", "stl", // proprietary binaries
    "rbxm", "rbxl", "rbxmx", "unitypackage", "uasset", "umap", "pak", "dat", "bin", "exe", "dll",
    "so", "dylib", "zip", "7z", "rar", "gz", "pdf", "ttf", "otf", "woff", "woff2",
];

/// Recognized text extensions and the line comment marker used for banners.
///
/// Only formats with a line comment belong here. JSON, CSS and markup files
/// have none, so they fall through to a conflict block.
pub const TEXT_EXTENSIONS: &[(&str, &str)] = &[
    ("lua", "--"),
    ("luau", "--"),
    ("sql", "--"),
    ("hs", "--"),
    ("py", "#"),
    ("sh", "#"),
    ("bash", "#"),
    ("rb", "#"),
    ("pl", "#"),
    ("r", "#"),
    ("ps1", "#"),
    ("yml", "#"),
    ("yaml", "#"),
    ("toml", "#"),
    ("txt", "#"),
    ("md", "#"),
    ("rs", "//"),
    ("js", "//"),
    ("jsx", "//"),
    ("ts", "//"),
    ("tsx", "//"),
    ("c", "//"),
    ("h", "//"),
    ("cpp", "//"),
    ("hpp", "//"),
    ("cs", "//"),
    ("java", "//"),
    ("kt", "//"),
    ("go", "//"),
    ("swift", "//"),
    ("php", "//"),
    ("ini", ";"),
    ("bat", "REM"),
    ("vim", "\""),
];

/// Comment marker used when an extension has no marker of its own.
pub const DEFAULT_COMMENT: &str = "#";

/// Returns the report location for an output directory.
///
/// Falls back to `merge_report.txt` in the current directory when the output
/// path has no usable file name (e.g. `/`).
pub fn default_report_path(output_root: &Path) -> PathBuf {
    match output_root.file_name() {
        Some(name) => {
            let mut file_name = name.to_os_string();
            file_name.push(REPORT_SUFFIX);
            output_root.with_file_name(file_name)
        }
        None => PathBuf::from("merge_report.txt"),
    }
}

/// Returns the holding directory for deferred deletions of output files.
///
/// Like the report, it sits beside the output so it is never collected as
/// part of the output tree.
pub fn stale_dir(output_root: &Path) -> PathBuf {
    match output_root.file_name() {
        Some(name) => {
            let mut file_name = name.to_os_string();
            file_name.push(STALE_SUFFIX);
            output_root.with_file_name(file_name)
        }
        None => PathBuf::from("merge-wizard.stale"),
    }
}

/// Returns the default location of the remembered "last run" settings.
///
/// Uses the platform configuration directory:
/// - Linux: `~/.config/merge-wizard/last-run.json`
/// - macOS: `~/Library/Application Support/merge-wizard/last-run.json`
/// - Windows: `{FOLDERID_RoamingAppData}\merge-wizard\last-run.json`
///
/// The [`SETTINGS_ENV`] environment variable takes precedence.
pub fn default_settings_path() -> PathBuf {
    if let Some(path) = std::env::var_os(SETTINGS_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".merge-wizard"))
        .join("merge-wizard")
        .join("last-run.json")
}

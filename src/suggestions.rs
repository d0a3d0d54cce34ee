//! # Error Suggestions
//!
//! Helpers that turn common CLI mistakes into errors that say what went
//! wrong AND how to fix it.

use std::path::Path;

/// No BASE/SOURCE given and nothing remembered.
pub fn missing_roots() -> anyhow::Error {
    anyhow::anyhow!(
        "BASE and SOURCE directories are required\n\n\
         hint: merge-wizard merge <BASE> <SOURCE>... --output <DIR>\n\
         hint: Use --last to reuse the options saved by a previous --remember run"
    )
}

/// `--last` was given but no settings file exists.
pub fn nothing_remembered(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "No remembered options found at {path}\n\n\
         hint: Run a merge with --remember first\n\
         hint: Set MERGE_WIZARD_SETTINGS to point at another settings file",
        path = path.display()
    )
}

/// The output directory exists and the user did not allow replacing it.
pub fn output_exists(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Output directory already exists: {path}\n\n\
         hint: Pass --force to replace it\n\
         hint: Choose a different directory with --output",
        path = path.display()
    )
}

/// An input root could not be used.
pub fn root_not_found(label: &str, path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "{label} directory not found: {path}\n\n\
         hint: Clone or check out the repository first; merge-wizard only reads local trees",
        path = path.display()
    )
}

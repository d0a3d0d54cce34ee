//! Unified line diff strategy.
//!
//! The output replaces the file's content with a unified diff from BASE to
//! SOURCE, so the merged tree records exactly what changed without picking a
//! side.

use similar::TextDiff;

/// Lines of unchanged context kept around each hunk.
pub const DIFF_CONTEXT: usize = 3;

/// Header label of the BASE side.
pub const BASE_LABEL: &str = "BASE";

/// Header label of the SOURCE side.
pub const SOURCE_LABEL: &str = "NOVO";

/// Render a unified diff of `base` against `source`.
///
/// Identical inputs produce an empty string.
pub fn unified_diff(base: &str, source: &str) -> String {
    let diff = TextDiff::from_lines(base, source);
    let mut unified = diff.unified_diff();
    unified
        .context_radius(DIFF_CONTEXT)
        .header(BASE_LABEL, SOURCE_LABEL);
    unified.to_string()
}

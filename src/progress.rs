//! Progress line rendering.
//!
//! [`render`] is a pure function of `(current, total, label)`; callers decide
//! where, and whether, to display its output.

/// Width of the textual bar.
const BAR_WIDTH: usize = 20;

/// Render one progress line, e.g. `[ 3/12]  25% [#####---------------] src/a.lua`.
pub fn render(current: usize, total: usize, label: &str) -> String {
    let current = current.min(total);
    let (percent, filled) = if total == 0 {
        (100, BAR_WIDTH)
    } else {
        (current * 100 / total, current * BAR_WIDTH / total)
    };
    let width = total.to_string().len();

    format!(
        "[{current:>width$}/{total}] {percent:>3}% [{}{}] {label}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
    )
}

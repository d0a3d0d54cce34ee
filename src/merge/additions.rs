//! Line-addition merge strategy.
//!
//! Keeps BASE intact and appends the SOURCE lines it does not already
//! contain, under a commented banner. A trimmed SOURCE line counts as present
//! when it occurs anywhere in BASE, even inside a longer line. Blank lines are
//! never appended and a line repeated in SOURCE is appended at most once.

use std::collections::HashSet;

/// Tag written inside the banner of every appended block.
pub const ADD_TAG: &str = "[MERGE-WIZARD ADD]";

const RULE: &str = "==================================================";

/// Merge `source` into `base` by appending novel lines.
///
/// Returns `None` when SOURCE has no line BASE lacks, in which case the file
/// is left untouched.
pub fn merge_additions(base: &str, source: &str, comment: &str) -> Option<String> {
    let mut appended: HashSet<&str> = HashSet::new();

    let novel: Vec<&str> = source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !base.contains(*line))
        .filter(|line| appended.insert(*line))
        .collect();

    if novel.is_empty() {
        return None;
    }

    let mut merged = String::with_capacity(base.len() + novel.len() * 32 + 160);
    merged.push_str(base);
    if !merged.is_empty() && !merged.ends_with('\n') {
        merged.push('\n');
    }
    merged.push('\n');
    merged.push_str(&format!("{} {}\n", comment, RULE));
    merged.push_str(&format!("{} {}\n", comment, ADD_TAG));
    merged.push_str(&format!("{} {}\n", comment, RULE));
    for line in novel {
        merged.push_str(line);
        merged.push('\n');
    }
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_single_new_line_with_banner() {
        let merged = merge_additions("local x = 1", "local x = 1\nlocal y = 2", "--").unwrap();
        assert!(merged.starts_with("local x = 1\n"));
        assert!(merged.contains("-- [MERGE-WIZARD ADD]\n"));
        assert!(merged.ends_with("local y = 2\n"));
        assert_eq!(merged.matches("local x = 1").count(), 1);
        assert_eq!(merged.matches(ADD_TAG).count(), 1);
    }

    #[test]
    fn test_repeated_source_lines_appended_once() {
        let merged = merge_additions("a\n", "b\nb\n  b  \nc\n", "#").unwrap();
        let appended: Vec<&str> = merged
            .lines()
            .skip_while(|l| !l.contains(ADD_TAG))
            .skip(2)
            .collect();
        assert_eq!(appended, vec!["b", "c"]);
    }

    #[test]
    fn test_trimmed_match_counts_as_present() {
        assert_eq!(merge_additions("    return x\n", "return x\n", "--"), None);
    }

    #[test]
    fn test_line_inside_longer_base_line_counts_as_present() {
        assert_eq!(
            merge_additions("local x = 1 -- keep\n", "local x = 1\n", "--"),
            None
        );
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        assert_eq!(merge_additions("a\n", "\n   \na\n", "#"), None);
    }

    #[test]
    fn test_empty_base_gets_banner_and_lines() {
        let merged = merge_additions("", "x = 1\n", "#").unwrap();
        assert!(merged.starts_with("\n# ====="));
        assert!(merged.ends_with("x = 1\n"));
    }

    #[test]
    fn test_rerun_on_same_inputs_is_stable() {
        let first = merge_additions("a\n", "a\nb\n", "//");
        let second = merge_additions("a\n", "a\nb\n", "//");
        assert_eq!(first, second);
    }
}

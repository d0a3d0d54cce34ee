//! Property-based tests for classification and the content strategies.
//!
//! These tests use proptest to generate random trees and file contents and
//! verify that invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use std::collections::{BTreeMap, BTreeSet};
    use std::fs;
    use std::path::Path;

    use proptest::prelude::*;
    use tempfile::TempDir;

    use crate::merge::additions::{merge_additions, ADD_TAG};
    use crate::merge::conflict::conflict_block;
    use crate::merge::looks_binary;
    use crate::phases::classify::{self, Status};
    use crate::snapshot;

    /// Small path alphabet so BASE and SOURCE overlap often.
    fn tree() -> impl Strategy<Value = BTreeMap<String, String>> {
        prop::collection::btree_map("(a|b|c)(/(x|y))?\\.(txt|lua)", "[a-c]{0,3}", 0..8)
    }

    fn materialize(root: &Path, files: &BTreeMap<String, String>) {
        fs::create_dir_all(root).unwrap();
        for (rel, content) in files {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    fn classify_trees(
        base: &BTreeMap<String, String>,
        source: &BTreeMap<String, String>,
    ) -> Vec<classify::ClassificationRecord> {
        let temp = TempDir::new().unwrap();
        let (base_root, source_root) = (temp.path().join("base"), temp.path().join("source"));
        materialize(&base_root, base);
        materialize(&source_root, source);
        let (base, source) = snapshot::collect_pair(&base_root, &source_root, &[]).unwrap();
        classify::execute(&base, &source)
    }

    // ============================================================================
    // classification property tests
    // ============================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        /// Property: every path of BASE or SOURCE gets exactly one record whose
        /// status matches where the path exists and whether contents differ
        #[test]
        fn classification_partitions_the_union(base in tree(), source in tree()) {
            let records = classify_trees(&base, &source);
            let union: BTreeSet<&String> = base.keys().chain(source.keys()).collect();
            let seen: Vec<&String> = records.iter().map(|r| &r.relative_path).collect();

            prop_assert_eq!(seen.len(), union.len());
            prop_assert!(seen.iter().copied().eq(union.iter().copied()), "records are sorted and unique");

            for record in &records {
                let expected = match (base.get(&record.relative_path), source.get(&record.relative_path)) {
                    (None, Some(_)) => Status::Added,
                    (Some(_), None) => Status::Removed,
                    (Some(b), Some(s)) if b == s => Status::Unchanged,
                    (Some(_), Some(_)) => Status::Modified,
                    (None, None) => unreachable!(),
                };
                prop_assert_eq!(record.status, expected, "{}", record.relative_path);
            }
        }

        /// Property: classifying the same trees twice gives the same records
        #[test]
        fn classification_is_deterministic(base in tree(), source in tree()) {
            let first: Vec<(String, Status)> = classify_trees(&base, &source)
                .into_iter()
                .map(|r| (r.relative_path, r.status))
                .collect();
            let second: Vec<(String, Status)> = classify_trees(&base, &source)
                .into_iter()
                .map(|r| (r.relative_path, r.status))
                .collect();
            prop_assert_eq!(first, second);
        }
    }

    // ============================================================================
    // line addition property tests
    // ============================================================================

    proptest! {
        /// Property: BASE is kept as a prefix and no appended line occurs
        /// anywhere in BASE or twice in the appended block
        #[test]
        fn additions_never_duplicate_lines(
            base in prop::collection::vec("[a-d ]{0,4}", 0..10),
            source in prop::collection::vec("[a-d ]{0,4}", 0..10),
        ) {
            let base = base.join("\n");
            let source = source.join("\n");

            if let Some(merged) = merge_additions(&base, &source, "--") {
                prop_assert!(merged.starts_with(&base));

                let appended: Vec<&str> = merged
                    .lines()
                    .skip_while(|line| !line.contains(ADD_TAG))
                    .skip(2)
                    .collect();
                prop_assert!(!appended.is_empty());

                let mut unique = BTreeSet::new();
                for line in appended {
                    prop_assert!(!base.contains(line), "'{}' already in BASE", line);
                    prop_assert!(unique.insert(line), "'{}' appended twice", line);
                }
            }
        }

        /// Property: merging the same SOURCE into an already merged file changes nothing
        #[test]
        fn additions_are_idempotent(
            base in prop::collection::vec("[a-d]{1,3}", 0..8),
            source in prop::collection::vec("[a-d]{1,3}", 0..8),
        ) {
            let base = base.join("\n");
            let source = source.join("\n");

            let once = merge_additions(&base, &source, "#").unwrap_or_else(|| base.clone());
            prop_assert_eq!(merge_additions(&once, &source, "#"), None);
        }
    }

    // ============================================================================
    // binary sniffing and conflict block property tests
    // ============================================================================

    proptest! {
        /// Property: a NUL byte near the start always marks content as binary
        #[test]
        fn nul_byte_marks_binary(
            mut bytes in prop::collection::vec(1u8..=255, 1..512),
            at in any::<prop::sample::Index>(),
        ) {
            let i = at.index(bytes.len());
            bytes[i] = 0;
            prop_assert!(looks_binary(&bytes));
        }

        /// Property: a conflict block keeps both sides in BASE-then-SOURCE order
        #[test]
        fn conflict_block_keeps_both_sides(base in "[a-z\n]{0,40}", source in "[A-Z\n]{0,40}") {
            let block = String::from_utf8(conflict_block(base.as_bytes(), source.as_bytes())).unwrap();
            let base_at = block.find(base.as_str()).unwrap();
            let source_at = block.rfind(source.as_str()).unwrap();
            prop_assert!(base_at <= source_at);
        }
    }
}

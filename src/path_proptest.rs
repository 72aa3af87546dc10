//! Property-based tests for naming helpers and the conflict engine.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use std::collections::HashSet;
    use std::fs;

    use crate::change::Change;
    use crate::conflict::{detect_conflicts, new_target, DetectOptions};
    use crate::path::{numbered_suffix, sanitize_key, split_extension, with_file_name, file_name};
    use crate::platform::Platform;
    use proptest::prelude::*;
    use tempfile::TempDir;

    // ============================================================================
    // path helper property tests
    // ============================================================================

    proptest! {
        /// Property: stem and extension always reassemble the input
        #[test]
        fn split_extension_reassembles(name in "[a-zA-Z0-9 ._-]{0,30}") {
            let (stem, ext) = split_extension(&name);
            prop_assert_eq!(format!("{}{}", stem, ext), name.as_str());
            prop_assert!(ext.is_empty() || ext.starts_with('.'));
        }

        /// Property: a counter written by new_target is read back by numbered_suffix
        #[test]
        fn numbered_suffix_reads_counter(stem in "[a-z]{1,10}", n in 2u64..100_000) {
            let numbered = format!("{} ({})", stem, n);
            let (prefix, parsed) = numbered_suffix(&numbered).unwrap();
            prop_assert_eq!(parsed, n);
            prop_assert_eq!(prefix, format!("{} ", stem));
        }

        /// Property: replacing the file name keeps the directory part
        #[test]
        fn with_file_name_keeps_directory(
            dir in "[a-z]{1,8}(/[a-z]{1,8}){0,3}",
            old in "[a-z]{1,8}",
            new in "[a-z]{1,8}",
        ) {
            let target = format!("{}/{}", dir, old);
            let replaced = with_file_name(&target, &new, Platform::Unix);
            prop_assert_eq!(file_name(&replaced, Platform::Unix), new.as_str());
            prop_assert_eq!(replaced, format!("{}/{}", dir, new));
        }

        /// Property: sanitized keys never contain separators
        #[test]
        fn sanitize_key_has_no_separators(path in "(/[a-zA-Z0-9 ]{1,10}){1,6}") {
            let key = sanitize_key(std::path::Path::new(&path), Platform::Unix);
            prop_assert!(!key.contains('/'));
        }
    }

    // ============================================================================
    // platform policy property tests
    // ============================================================================

    proptest! {
        /// Property: truncated names fit the limit and keep short extensions
        #[test]
        fn truncate_name_fits_limit(stem in "[a-zé]{200,400}", ext in "\\.[a-z]{1,5}") {
            for platform in [Platform::Unix, Platform::Windows] {
                let name = format!("{}{}", stem, ext);
                let truncated = platform.truncate_name(&name);
                prop_assert!(platform.name_length(&truncated) <= platform.max_length());
                prop_assert!(truncated.ends_with(&ext));
            }
        }

        /// Property: stripping forbidden characters leaves none behind
        #[test]
        fn strip_forbidden_is_complete(target in "[a-z<>:\"|?*]{0,20}") {
            for platform in [Platform::Windows, Platform::MacOs, Platform::Unix] {
                let stripped = platform.strip_forbidden(&target);
                prop_assert!(platform.forbidden_chars(&stripped).is_empty());
            }
        }

        /// Property: stripping trailing periods leaves none behind
        #[test]
        fn strip_trailing_periods_is_complete(target in "[a-z.]{1,10}(/[a-z.]{1,10}){0,3}") {
            let stripped = Platform::Windows.strip_trailing_periods(&target);
            prop_assert!(!Platform::Windows.has_trailing_period(&stripped));
        }
    }

    // ============================================================================
    // conflict engine property tests
    // ============================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Property: new_target never returns an existing or claimed path
        #[test]
        fn new_target_is_free(existing in prop::collection::vec(2u64..8, 0..6)) {
            let temp_dir = TempDir::new().unwrap();
            fs::write(temp_dir.path().join("a.txt"), "").unwrap();
            for n in &existing {
                fs::write(temp_dir.path().join(format!("a ({}).txt", n)), "").unwrap();
            }
            let change = Change::new(temp_dir.path(), "x.txt", false).with_target("a.txt");

            let target = new_target(&change, Platform::Unix, |_| false).unwrap();
            prop_assert!(!temp_dir.path().join(&target).exists());
        }

        /// Property: with auto-fix, every settled target is unique and free
        #[test]
        fn fixed_targets_are_unique(targets in prop::collection::vec("[abc]( \\([2-4]\\))?", 1..8)) {
            let temp_dir = TempDir::new().unwrap();
            let dir = temp_dir.path();
            let mut changes = Vec::new();
            for (i, target) in targets.iter().enumerate() {
                let source = format!("src{}", i);
                fs::write(dir.join(&source), "").unwrap();
                changes.push(Change::new(dir, source, false).with_target(target.clone()));
            }
            let options = DetectOptions {
                fix_conflicts: true,
                allow_overwrites: false,
                platform: Platform::Unix,
            };

            let detection = detect_conflicts(changes, &options).unwrap();
            let mut seen = HashSet::new();
            for change in &detection.changes {
                prop_assert!(seen.insert(change.target_path()), "duplicate target {}", change.target);
                prop_assert!(!change.target_path().exists());
            }
        }
    }
}

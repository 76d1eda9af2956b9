//! Property-based tests for path normalization and dependency resolution.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::dependencies::{resolve, DependencySpec};
    use crate::path::normalize;
    use proptest::prelude::*;

    // ============================================================================
    // normalize property tests
    // ============================================================================

    proptest! {
        /// Property: normalizing twice is the same as normalizing once
        #[test]
        fn normalize_is_idempotent(input in "[a-z./]{1,24}") {
            if let Ok(first) = normalize(&input) {
                let second = normalize(&first).unwrap();
                prop_assert_eq!(first, second);
            }
        }

        /// Property: normalized paths never start with a separator or contain empty segments
        #[test]
        fn normalize_produces_clean_relative_paths(input in "[a-z/]{1,24}") {
            if let Ok(result) = normalize(&input) {
                prop_assert!(!result.starts_with('/'));
                prop_assert!(!result.ends_with('/'));
                prop_assert!(!result.contains("//"));
            }
        }

        /// Property: leading slash does not change the key
        #[test]
        fn normalize_ignores_leading_slash(input in "[a-z]{1,8}(/[a-z]{1,8}){0,3}") {
            prop_assert_eq!(normalize(&input).unwrap(), normalize(&format!("/{}", input)).unwrap());
        }
    }

    // ============================================================================
    // resolve property tests
    // ============================================================================

    fn spec_list() -> impl Strategy<Value = Vec<DependencySpec>> {
        prop::collection::vec(("[a-e]", "[0-9]\\.[0-9]"), 0..8).prop_map(|pairs| {
            pairs
                .into_iter()
                .map(|(name, version)| DependencySpec::new(name, version))
                .collect()
        })
    }

    proptest! {
        /// Property: every override name ends up with the last override version
        #[test]
        fn resolve_overrides_win(base in spec_list(), overrides in spec_list()) {
            let resolved = resolve(&base, &overrides);
            for dep in &overrides {
                let last = overrides.iter().rev().find(|d| d.name == dep.name).unwrap();
                let found = resolved.iter().find(|d| d.name == dep.name).unwrap();
                prop_assert_eq!(&found.version, &last.version);
            }
        }

        /// Property: names in the output are unique
        #[test]
        fn resolve_names_are_unique(base in spec_list(), overrides in spec_list()) {
            let resolved = resolve(&base, &overrides);
            let mut names: Vec<_> = resolved.iter().map(|d| d.name.clone()).collect();
            let count = names.len();
            names.sort();
            names.dedup();
            prop_assert_eq!(names.len(), count);
        }

        /// Property: names keep the position where they first appeared
        #[test]
        fn resolve_keeps_first_seen_order(base in spec_list(), overrides in spec_list()) {
            let resolved = resolve(&base, &overrides);
            let mut expected = Vec::new();
            for dep in base.iter().chain(overrides.iter()) {
                if !expected.contains(&dep.name) {
                    expected.push(dep.name.clone());
                }
            }
            let names: Vec<_> = resolved.into_iter().map(|d| d.name).collect();
            prop_assert_eq!(names, expected);
        }

        /// Property: resolution is a pure function of its inputs
        #[test]
        fn resolve_is_deterministic(base in spec_list(), overrides in spec_list()) {
            prop_assert_eq!(resolve(&base, &overrides), resolve(&base, &overrides));
        }
    }
}

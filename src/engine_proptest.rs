//! Property-based tests for defaults resolution, commit grouping, and version
//! bumps.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::conventional::{ConventionalCommit, LIBRARY_IDS, PIPER_ORIGIN_REV_ID};
    use crate::defaults::{resolve_library, tidy_library};
    use crate::manifest::{Api, Defaults, Library, RustDefault, RustPackageDependency};
    use crate::notes::group_by_id_and_subject;
    use crate::version::bump_version;
    use chrono::{TimeZone, Utc};
    use indexmap::IndexMap;
    use proptest::prelude::*;

    fn defaults() -> Defaults {
        Defaults {
            output: "src/generated".to_string(),
            release_level: "preview".to_string(),
            transport: "grpc+rest".to_string(),
            rust: Some(RustDefault {
                package_dependencies: vec![RustPackageDependency {
                    name: "wkt".to_string(),
                    package: "google-cloud-wkt".to_string(),
                    ..Default::default()
                }],
                disabled_rustdoc_warnings: vec!["broken_intra_doc_links".to_string()],
                generate_setter_samples: Some(true),
            }),
            ..Default::default()
        }
    }

    fn library_strategy() -> impl Strategy<Value = Library> {
        (
            "[a-z]{1,6}(-[a-z0-9]{1,6}){0,3}",
            proptest::option::of("[a-z]{1,6}(/[a-z0-9]{1,6}){0,3}"),
            proptest::option::of("src/[a-z]{1,8}"),
            proptest::option::of(prop_oneof![Just("stable"), Just("preview")]),
        )
            .prop_map(|(name, api, output, level)| {
                let mut library = Library::new(name);
                if let Some(path) = api {
                    library.apis.push(Api::new(path));
                }
                library.output = output.unwrap_or_default();
                library.release_level = level.unwrap_or_default().to_string();
                library
            })
    }

    fn language_strategy() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just("rust"), Just("go"), Just("python"), Just("dart"), Just("other")]
    }

    // ============================================================================
    // defaults resolution property tests
    // ============================================================================

    proptest! {
        /// Property: resolving an already resolved record changes nothing
        #[test]
        fn resolve_is_idempotent(language in language_strategy(), library in library_strategy()) {
            let defaults = defaults();
            let once = resolve_library(language, library, &defaults).unwrap();
            let twice = resolve_library(language, once.clone(), &defaults).unwrap();
            prop_assert_eq!(once, twice);
        }

        /// Property: tidying loses nothing that resolution cannot restore
        #[test]
        fn resolve_after_tidy_is_stable(language in language_strategy(), library in library_strategy()) {
            let defaults = defaults();
            let resolved = resolve_library(language, library, &defaults).unwrap();
            let tidied = tidy_library(language, resolved.clone(), &defaults);
            prop_assert_eq!(resolve_library(language, tidied, &defaults).unwrap(), resolved);
        }

        /// Property: tidy is idempotent
        #[test]
        fn tidy_is_idempotent(language in language_strategy(), library in library_strategy()) {
            let defaults = defaults();
            let once = tidy_library(language, library, &defaults);
            let twice = tidy_library(language, once.clone(), &defaults);
            prop_assert_eq!(once, twice);
        }
    }

    // ============================================================================
    // grouping property tests
    // ============================================================================

    fn commit_strategy() -> impl Strategy<Value = ConventionalCommit> {
        (
            prop_oneof![Just("libA"), Just("libB"), Just("libC")],
            proptest::option::of(prop_oneof![Just("100"), Just("200")]),
            prop_oneof![Just("add field"), Just("fix docs")],
        )
            .prop_map(|(library, piper, subject)| {
                let mut footers = IndexMap::new();
                if let Some(piper) = piper {
                    footers.insert(PIPER_ORIGIN_REV_ID.to_string(), piper.to_string());
                }
                ConventionalCommit {
                    commit_type: "feat".to_string(),
                    scope: String::new(),
                    subject: subject.to_string(),
                    body: String::new(),
                    breaking: false,
                    library_id: library.to_string(),
                    footers,
                    commit_hash: format!("{}-{}", library, subject),
                    when: Utc.timestamp_opt(0, 0).unwrap(),
                    bulk: false,
                }
            })
    }

    /// Order-free view of a grouping result.
    fn canonical(commits: Vec<ConventionalCommit>) -> Vec<(Option<String>, String, Vec<String>)> {
        let mut view: Vec<_> = commits
            .into_iter()
            .map(|c| {
                let mut ids: Vec<String> = c.footers[LIBRARY_IDS]
                    .split(',')
                    .map(str::to_string)
                    .collect();
                ids.sort();
                (c.piper_id().map(str::to_string), c.subject, ids)
            })
            .collect();
        view.sort();
        view
    }

    proptest! {
        /// Property: grouping is invariant to input order, compared as a set
        #[test]
        fn grouping_is_order_invariant(
            (commits, shuffled) in prop::collection::vec(commit_strategy(), 0..16)
                .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
        ) {
            prop_assert_eq!(
                canonical(group_by_id_and_subject(commits)),
                canonical(group_by_id_and_subject(shuffled))
            );
        }

        /// Property: each (piper id, subject) key collapses to one record
        #[test]
        fn grouping_collapses_each_key_once(commits in prop::collection::vec(commit_strategy(), 0..16)) {
            let grouped = group_by_id_and_subject(commits);
            let keyed: Vec<_> = grouped
                .iter()
                .filter_map(|c| c.piper_id().map(|p| (p.to_string(), c.subject.clone())))
                .collect();
            let mut unique = keyed.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(keyed.len(), unique.len());
            for commit in &grouped {
                let ids: Vec<&str> = commit.footers[LIBRARY_IDS].split(',').collect();
                let mut deduped = ids.clone();
                deduped.sort();
                deduped.dedup();
                prop_assert_eq!(ids.len(), deduped.len());
            }
        }
    }

    // ============================================================================
    // version bump property tests
    // ============================================================================

    proptest! {
        /// Property: a release version bumps the minor and resets the patch
        #[test]
        fn bump_release_version(major in 0u64..1000, minor in 0u64..1000, patch in 0u64..1000) {
            let bumped = bump_version(&format!("{}.{}.{}", major, minor, patch)).unwrap();
            prop_assert_eq!(bumped, format!("{}.{}.0", major, minor + 1));
        }

        /// Property: a numbered prerelease increments and keeps its width
        #[test]
        fn bump_prerelease_keeps_width(n in 0u32..100_000, width in 1usize..6) {
            let current = format!("1.2.0-beta.{:0width$}", n, width = width);
            let expected = format!("1.2.0-beta.{:0width$}", n + 1, width = width);
            prop_assert_eq!(bump_version(&current).unwrap(), expected);
        }

        /// Property: a prerelease without trailing digits cannot be bumped
        #[test]
        fn bump_prerelease_without_digits_fails(pre in "[a-z]{1,8}") {
            let current = format!("1.2.0-{}", pre);
            prop_assert!(bump_version(&current).is_err());
        }
    }
}

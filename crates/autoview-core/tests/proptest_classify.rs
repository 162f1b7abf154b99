#![forbid(unsafe_code)]

//! Property tests for [`RuleSet::classify`].
//!
//! Validates:
//! - Exclusion patterns override inclusion patterns, files, and folders.
//! - Folder containment is segment-aware at every depth.
//! - Classification ignores insertion order.
//! - Snapshot reload preserves every verdict.

use autoview_core::{Mode, RuleSet, RuleSetSnapshot, Verdict};
use proptest::prelude::*;

// ============================================================================
// Strategy helpers
// ============================================================================

fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,8}"
}

fn path(max_depth: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment(), 1..=max_depth)
}

fn join(segments: &[String]) -> String {
    segments.join("/")
}

// ============================================================================
// Invariant 1: blacklist precedence
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn exclusion_always_wins(segments in path(5), as_file in any::<bool>(), include_all in any::<bool>()) {
        let p = join(&segments);
        let mut rules = RuleSet::default();
        if as_file {
            rules.add_file(p.clone());
        } else {
            rules.add_folder(segments[0].clone());
        }
        if include_all {
            rules.add_include_pattern(".*");
        }
        rules.add_exclude_pattern(format!("^{}", regex_lite::escape(&segments[0])));

        prop_assert_eq!(rules.classify(&p), Verdict::Unmanaged);
    }
}

// ============================================================================
// Invariant 2: folder containment is segment-aware
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn any_ancestor_folder_manages_path(segments in path(6), depth in 1usize..6) {
        let depth = depth.min(segments.len());
        let folder = join(&segments[..depth]);
        let mut rules = RuleSet::default();
        rules.add_folder(folder);
        prop_assert_eq!(rules.classify(&join(&segments)), Verdict::Managed);
    }

    #[test]
    fn string_prefix_without_separator_never_matches(folder in segment(), suffix in segment(), rest in path(3)) {
        let mut rules = RuleSet::default();
        rules.add_folder(folder.clone());
        let mut segments = vec![format!("{folder}{suffix}")];
        segments.extend(rest);
        prop_assert_eq!(rules.classify(&join(&segments)), Verdict::Unmanaged);
    }
}

// ============================================================================
// Invariant 3: order independence and reload fidelity
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn insertion_order_does_not_matter(
        folders in prop::collection::vec(path(3), 0..6),
        probes in prop::collection::vec(path(4), 1..10),
    ) {
        let mut forward = RuleSet::default();
        let mut backward = RuleSet::default();
        for f in &folders {
            forward.add_folder(join(f));
        }
        for f in folders.iter().rev() {
            backward.add_folder(join(f));
        }
        for probe in &probes {
            let p = join(probe);
            prop_assert_eq!(forward.classify(&p), backward.classify(&p));
        }
    }

    #[test]
    fn snapshot_reload_preserves_verdicts(
        files in prop::collection::vec(path(3), 0..5),
        folders in prop::collection::vec(path(2), 0..5),
        probes in prop::collection::vec(path(4), 1..10),
    ) {
        let mut rules = RuleSet::new(Mode::Preview);
        for f in &files {
            rules.add_file(join(f));
        }
        for f in &folders {
            rules.add_folder(join(f));
        }
        rules.add_exclude_pattern("^zz");

        let json = serde_json::to_string(&rules.snapshot()).unwrap();
        let reloaded: RuleSetSnapshot = serde_json::from_str(&json).unwrap();
        let reloaded = reloaded.into_rule_set(Mode::Source);

        prop_assert_eq!(reloaded.default_mode(), Mode::Preview);
        for probe in files.iter().chain(probes.iter()) {
            let p = join(probe);
            prop_assert_eq!(rules.classify(&p), reloaded.classify(&p));
        }
    }
}

#[test]
fn escaped_exclusion_matches_literal_folder_only() {
    let mut rules = RuleSet::new(Mode::Source);
    rules.add_folder("Notes (old)");
    rules.add_folder("Notes old");
    rules.add_exclude_pattern(format!("^{}/", regex_lite::escape("Notes (old)")));
    assert_eq!(rules.classify("Notes (old)/a.md"), Verdict::Unmanaged);
    assert_eq!(rules.classify("Notes old/a.md"), Verdict::Managed);
}

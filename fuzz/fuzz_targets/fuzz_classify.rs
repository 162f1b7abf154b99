#![no_main]

use arbitrary::Arbitrary;
use autoview_core::{Mode, RuleSet, RuleSetSnapshot, Verdict};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    files: Vec<String>,
    folders: Vec<String>,
    include: Vec<String>,
    exclude: Vec<String>,
    paths: Vec<String>,
}

fuzz_target!(|input: Input| {
    let mut rules = RuleSet::new(Mode::Source);
    for f in &input.files {
        rules.add_file(f.as_str());
    }
    for f in &input.folders {
        rules.add_folder(f.as_str());
    }
    for p in &input.include {
        rules.add_include_pattern(p.as_str());
    }
    for p in &input.exclude {
        rules.add_exclude_pattern(p.as_str());
    }

    let reloaded = RuleSetSnapshot::from(&rules).into_rule_set(Mode::Preview);

    for path in &input.paths {
        let verdict = rules.classify(path);
        if rules.exclude_patterns().any(|p| regex_matches(p, path)) {
            assert_eq!(verdict, Verdict::Unmanaged, "exclusion must win for {path:?}");
        }
        assert_eq!(verdict, reloaded.classify(path), "snapshot changed verdict for {path:?}");
        assert_eq!(verdict, rules.explain(path).verdict);
    }
});

fn regex_matches(pattern: &str, path: &str) -> bool {
    let mut probe = RuleSet::new(Mode::Source);
    probe.add_include_pattern(pattern);
    probe.classify(path) == Verdict::Managed
}

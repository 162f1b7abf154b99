//! Persisted rule-set shape.
//!
//! ```json
//! {
//!   "files": ["a.md"],
//!   "folders": ["Docs"],
//!   "includeRules": ["\\.secret\\.md$"],
//!   "excludeRules": ["^Private/"],
//!   "defaultMode": "source"
//! }
//! ```
//!
//! Arrays are unordered sets on reload; they are written sorted so saved
//! files diff cleanly. Missing keys fall back to empty collections, and a
//! missing `defaultMode` falls back to the caller-supplied default.

use serde::{Deserialize, Serialize};

use crate::mode::Mode;
use crate::rules::RuleSet;

/// Serializable form of a [`RuleSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuleSetSnapshot {
    pub files: Vec<String>,
    pub folders: Vec<String>,
    pub include_rules: Vec<String>,
    pub exclude_rules: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_mode: Option<Mode>,
}

impl RuleSetSnapshot {
    /// Rebuild a rule set. Duplicate entries collapse; invalid patterns are
    /// kept and logged by [`RuleSet`].
    #[must_use]
    pub fn into_rule_set(self, fallback_mode: Mode) -> RuleSet {
        let mut rules = RuleSet::new(self.default_mode.unwrap_or(fallback_mode));
        for file in self.files {
            rules.add_file(file);
        }
        for folder in self.folders {
            rules.add_folder(folder);
        }
        for pattern in self.include_rules {
            rules.add_include_pattern(pattern);
        }
        for pattern in self.exclude_rules {
            rules.add_exclude_pattern(pattern);
        }
        rules
    }
}

impl From<&RuleSet> for RuleSetSnapshot {
    fn from(rules: &RuleSet) -> Self {
        Self {
            files: rules.files().map(str::to_owned).collect(),
            folders: rules.folders().map(str::to_owned).collect(),
            include_rules: rules.include_patterns().map(str::to_owned).collect(),
            exclude_rules: rules.exclude_patterns().map(str::to_owned).collect(),
            default_mode: Some(rules.default_mode()),
        }
    }
}

impl RuleSet {
    /// Capture the persisted shape of this rule set.
    #[must_use]
    pub fn snapshot(&self) -> RuleSetSnapshot {
        RuleSetSnapshot::from(self)
    }
}

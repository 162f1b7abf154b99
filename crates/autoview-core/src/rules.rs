//! User rule set and path classification.
//!
//! A [`RuleSet`] holds four unordered collections (explicit files, folders,
//! inclusion patterns, exclusion patterns) plus the configured default mode.
//!
//! # Decision order
//!
//! First match wins, in this order:
//!
//! 1. any exclusion pattern matches: **unmanaged** (absolute priority)
//! 2. any inclusion pattern matches: managed
//! 3. exact file entry: managed
//! 4. the path or one of its `/`-separated ancestors is a folder entry: managed
//! 5. otherwise unmanaged
//!
//! Patterns that fail to compile are kept (so they can be listed and removed)
//! but never match.
//!
//! # Usage
//!
//! ```
//! use autoview_core::{RuleSet, Verdict};
//!
//! let mut rules = RuleSet::default();
//! rules.add_folder("Notes");
//! assert_eq!(rules.classify("Notes/x/a.md"), Verdict::Managed);
//! assert_eq!(rules.classify("NotesArchive/a.md"), Verdict::Unmanaged);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use regex_lite::Regex;
use tracing::warn;

use crate::event::{RuleEdit, SettingsEvent};
use crate::mode::Mode;

/// Outcome of classifying a document path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Managed,
    Unmanaged,
}

impl Verdict {
    #[must_use]
    pub const fn is_managed(self) -> bool {
        matches!(self, Self::Managed)
    }
}

/// Which rule decided a classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchReason {
    Excluded { pattern: String },
    Included { pattern: String },
    File,
    Folder { folder: String },
    NoRule,
}

/// A verdict together with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub verdict: Verdict,
    pub reason: MatchReason,
}

/// Whether a picked vault entry is a file or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Folder,
}

impl EntryKind {
    /// Guess the entry kind from its path: a last segment with an extension
    /// (`name.ext`) is a file, anything else is a folder.
    #[must_use]
    pub fn infer(path: &str) -> Self {
        let last = path.rsplit('/').next().unwrap_or(path);
        match last.rfind('.') {
            Some(dot) if dot > 0 && dot + 1 < last.len() => Self::File,
            _ => Self::Folder,
        }
    }
}

/// Pattern source text plus its compiled form (`None` if it failed to compile).
type PatternTable = BTreeMap<String, Option<Regex>>;

/// The user-configured rules that decide which documents are managed.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    files: BTreeSet<String>,
    folders: BTreeSet<String>,
    include: PatternTable,
    exclude: PatternTable,
    default_mode: Mode,
}

impl RuleSet {
    /// Empty rule set with the given default mode.
    #[must_use]
    pub fn new(default_mode: Mode) -> Self {
        Self {
            default_mode,
            ..Self::default()
        }
    }

    // ---- Classification ----

    /// Classify a document path.
    #[must_use]
    pub fn classify(&self, path: &str) -> Verdict {
        self.explain(path).verdict
    }

    /// Classify a document path and report the deciding rule.
    #[must_use]
    pub fn explain(&self, path: &str) -> Classification {
        if let Some(pattern) = first_match(&self.exclude, path) {
            return Classification {
                verdict: Verdict::Unmanaged,
                reason: MatchReason::Excluded {
                    pattern: pattern.to_owned(),
                },
            };
        }
        if let Some(pattern) = first_match(&self.include, path) {
            return Classification {
                verdict: Verdict::Managed,
                reason: MatchReason::Included {
                    pattern: pattern.to_owned(),
                },
            };
        }
        if self.files.contains(path) {
            return Classification {
                verdict: Verdict::Managed,
                reason: MatchReason::File,
            };
        }
        if let Some(folder) = self.containing_folder(path) {
            return Classification {
                verdict: Verdict::Managed,
                reason: MatchReason::Folder {
                    folder: folder.to_owned(),
                },
            };
        }
        Classification {
            verdict: Verdict::Unmanaged,
            reason: MatchReason::NoRule,
        }
    }

    /// `true` if `path` is an explicit file entry.
    #[must_use]
    pub fn has_file(&self, path: &str) -> bool {
        self.files.contains(path)
    }

    /// `true` if `path` equals a folder entry or lies anywhere beneath one.
    #[must_use]
    pub fn has_folder(&self, path: &str) -> bool {
        self.containing_folder(path).is_some()
    }

    /// Deepest folder entry that is `path` itself or one of its ancestors.
    ///
    /// Walks the segment prefixes from the full path down to the first
    /// segment, so `"Notes"` never matches `"NotesArchive/x"`.
    fn containing_folder(&self, path: &str) -> Option<&str> {
        if self.folders.is_empty() {
            return None;
        }
        let mut prefix = path;
        loop {
            if let Some(hit) = self.folders.get(prefix) {
                return Some(hit.as_str());
            }
            let cut = prefix.rfind('/')?;
            prefix = &prefix[..cut];
        }
    }

    // ---- Mutation ----

    /// Apply one edit. Returns the event to publish, or `None` when the edit
    /// did not change anything (duplicate insert, absent removal, same mode).
    pub fn apply(&mut self, edit: RuleEdit) -> Option<SettingsEvent> {
        let event = edit.event();
        let changed = match edit {
            RuleEdit::AddFile(path) => self.files.insert(path),
            RuleEdit::RemoveFile(path) => self.files.remove(&path),
            RuleEdit::AddFolder(path) => self.folders.insert(path),
            RuleEdit::RemoveFolder(path) => self.folders.remove(&path),
            RuleEdit::AddIncludeRule(pattern) => insert_pattern(&mut self.include, pattern),
            RuleEdit::RemoveIncludeRule(pattern) => self.include.remove(&pattern).is_some(),
            RuleEdit::AddExcludeRule(pattern) => insert_pattern(&mut self.exclude, pattern),
            RuleEdit::RemoveExcludeRule(pattern) => self.exclude.remove(&pattern).is_some(),
            RuleEdit::SetDefaultMode(mode) => {
                let changed = self.default_mode != mode;
                self.default_mode = mode;
                changed
            }
        };
        changed.then_some(event)
    }

    pub fn add_file(&mut self, path: impl Into<String>) -> bool {
        self.apply(RuleEdit::AddFile(path.into())).is_some()
    }

    pub fn remove_file(&mut self, path: &str) -> bool {
        self.files.remove(path)
    }

    pub fn add_folder(&mut self, path: impl Into<String>) -> bool {
        self.apply(RuleEdit::AddFolder(path.into())).is_some()
    }

    /// Remove a folder entry. Only the exact stored string is removed; an
    /// ancestor of a stored folder does not count.
    pub fn remove_folder(&mut self, path: &str) -> bool {
        self.folders.remove(path)
    }

    pub fn add_include_pattern(&mut self, pattern: impl Into<String>) -> bool {
        self.apply(RuleEdit::AddIncludeRule(pattern.into())).is_some()
    }

    pub fn remove_include_pattern(&mut self, pattern: &str) -> bool {
        self.include.remove(pattern).is_some()
    }

    pub fn add_exclude_pattern(&mut self, pattern: impl Into<String>) -> bool {
        self.apply(RuleEdit::AddExcludeRule(pattern.into())).is_some()
    }

    pub fn remove_exclude_pattern(&mut self, pattern: &str) -> bool {
        self.exclude.remove(pattern).is_some()
    }

    pub fn set_default_mode(&mut self, mode: Mode) -> bool {
        self.apply(RuleEdit::SetDefaultMode(mode)).is_some()
    }

    // ---- Accessors ----

    #[must_use]
    pub fn default_mode(&self) -> Mode {
        self.default_mode
    }

    /// Explicit files in sorted order.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    /// Folder entries in sorted order.
    pub fn folders(&self) -> impl Iterator<Item = &str> {
        self.folders.iter().map(String::as_str)
    }

    /// Inclusion pattern sources in sorted order.
    pub fn include_patterns(&self) -> impl Iterator<Item = &str> {
        self.include.keys().map(String::as_str)
    }

    /// Exclusion pattern sources in sorted order.
    pub fn exclude_patterns(&self) -> impl Iterator<Item = &str> {
        self.exclude.keys().map(String::as_str)
    }

    /// Pattern sources (inclusion and exclusion) that failed to compile.
    pub fn invalid_patterns(&self) -> impl Iterator<Item = &str> {
        self.include
            .iter()
            .chain(self.exclude.iter())
            .filter(|(_, compiled)| compiled.is_none())
            .map(|(source, _)| source.as_str())
    }

    /// `true` when no file, folder, or pattern is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
            && self.folders.is_empty()
            && self.include.is_empty()
            && self.exclude.is_empty()
    }
}

fn insert_pattern(table: &mut PatternTable, pattern: String) -> bool {
    if table.contains_key(&pattern) {
        return false;
    }
    let compiled = compile_pattern(&pattern);
    table.insert(pattern, compiled);
    true
}

fn compile_pattern(source: &str) -> Option<Regex> {
    match Regex::new(source) {
        Ok(regex) => Some(regex),
        Err(err) => {
            warn!(pattern = source, error = %err, "invalid rule pattern; it will never match");
            None
        }
    }
}

fn first_match<'a>(table: &'a PatternTable, path: &str) -> Option<&'a str> {
    table.iter().find_map(|(source, compiled)| {
        compiled
            .as_ref()
            .filter(|regex| regex.is_match(path))
            .map(|_| source.as_str())
    })
}

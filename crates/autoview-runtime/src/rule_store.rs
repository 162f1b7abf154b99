//! Rule set plus its mutation API.
//!
//! Every mutation goes through [`RuleStore::apply`]: the edit is applied to
//! the in-memory [`RuleSet`], and if it changed anything exactly one
//! [`SettingsEvent`] is dispatched on the [`SettingsBus`] (which also
//! persists). Idempotent no-ops publish nothing and save nothing.
//!
//! Mutation results:
//!
//! | Result     | Meaning                                               |
//! |------------|-------------------------------------------------------|
//! | `Ok(true)` | changed, published, saved                             |
//! | `Ok(false)`| nothing to do                                         |
//! | `Err(_)`   | changed and published, but the save failed            |

use autoview_core::{
    Classification, EntryKind, Mode, RuleEdit, RuleSet, SettingsEvent, Verdict,
};
use tracing::warn;

use crate::settings_bus::{SettingsBus, SettingsSubscription};
use crate::storage::{StorageBackend, StorageError, StorageResult};

/// Process-wide rule set with publish-on-change semantics.
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: RuleSet,
    bus: SettingsBus,
}

impl RuleStore {
    /// Store over an existing rule set with a bus of the caller's choosing.
    #[must_use]
    pub fn new(rules: RuleSet, bus: SettingsBus) -> Self {
        Self { rules, bus }
    }

    /// Empty, unpersisted store.
    #[must_use]
    pub fn in_memory(default_mode: Mode) -> Self {
        Self::new(RuleSet::new(default_mode), SettingsBus::new())
    }

    /// Load the rule set from `storage` and keep saving to it.
    ///
    /// A load failure is logged and the store starts empty with
    /// `fallback_mode`; the backend is still used for subsequent saves.
    /// Stored data that fails to parse is quarantined first so the next save
    /// cannot overwrite it.
    pub fn load(mut storage: Box<dyn StorageBackend>, fallback_mode: Mode) -> Self {
        let rules = match storage.load() {
            Ok(Some(snapshot)) => snapshot.into_rule_set(fallback_mode),
            Ok(None) => RuleSet::new(fallback_mode),
            Err(err) => {
                warn!(error = %err, "failed to load rule set; starting empty");
                if matches!(err, StorageError::Json(_)) {
                    match storage.quarantine() {
                        Ok(Some(moved)) => {
                            warn!(path = %moved.display(), "unreadable rule set kept aside");
                        }
                        Ok(None) => {}
                        Err(err) => warn!(error = %err, "failed to quarantine rule set"),
                    }
                }
                RuleSet::new(fallback_mode)
            }
        };
        Self::new(rules, SettingsBus::with_storage(storage))
    }

    // ---- Queries ----

    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    #[must_use]
    pub fn classify(&self, path: &str) -> Verdict {
        self.rules.classify(path)
    }

    #[must_use]
    pub fn explain(&self, path: &str) -> Classification {
        self.rules.explain(path)
    }

    #[must_use]
    pub fn default_mode(&self) -> Mode {
        self.rules.default_mode()
    }

    // ---- Subscriptions ----

    pub fn subscribe(&mut self, callback: impl Fn(&SettingsEvent) + 'static) -> SettingsSubscription {
        self.bus.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, subscription: SettingsSubscription) -> bool {
        self.bus.unsubscribe(subscription)
    }

    #[must_use]
    pub fn bus(&self) -> &SettingsBus {
        &self.bus
    }

    // ---- Mutation ----

    /// Apply one edit and publish it if it changed the rule set.
    pub fn apply(&mut self, edit: RuleEdit) -> StorageResult<bool> {
        let Some(event) = self.rules.apply(edit) else {
            return Ok(false);
        };
        self.bus.dispatch(&event, &self.rules)?;
        Ok(true)
    }

    pub fn add_file(&mut self, path: impl Into<String>) -> StorageResult<bool> {
        self.apply(RuleEdit::AddFile(path.into()))
    }

    pub fn remove_file(&mut self, path: impl Into<String>) -> StorageResult<bool> {
        self.apply(RuleEdit::RemoveFile(path.into()))
    }

    pub fn add_folder(&mut self, path: impl Into<String>) -> StorageResult<bool> {
        self.apply(RuleEdit::AddFolder(path.into()))
    }

    /// Remove a folder entry by its exact stored string.
    pub fn remove_folder(&mut self, path: impl Into<String>) -> StorageResult<bool> {
        self.apply(RuleEdit::RemoveFolder(path.into()))
    }

    pub fn add_include_rule(&mut self, pattern: impl Into<String>) -> StorageResult<bool> {
        self.apply(RuleEdit::AddIncludeRule(pattern.into()))
    }

    pub fn remove_include_rule(&mut self, pattern: impl Into<String>) -> StorageResult<bool> {
        self.apply(RuleEdit::RemoveIncludeRule(pattern.into()))
    }

    pub fn add_exclude_rule(&mut self, pattern: impl Into<String>) -> StorageResult<bool> {
        self.apply(RuleEdit::AddExcludeRule(pattern.into()))
    }

    pub fn remove_exclude_rule(&mut self, pattern: impl Into<String>) -> StorageResult<bool> {
        self.apply(RuleEdit::RemoveExcludeRule(pattern.into()))
    }

    pub fn set_default_mode(&mut self, mode: Mode) -> StorageResult<bool> {
        self.apply(RuleEdit::SetDefaultMode(mode))
    }

    /// Add a picked vault entry as a file or folder rule.
    pub fn append_path(&mut self, path: impl Into<String>, kind: EntryKind) -> StorageResult<bool> {
        match kind {
            EntryKind::File => self.add_file(path),
            EntryKind::Folder => self.add_folder(path),
        }
    }

    /// Add `path` to the explicit files if absent, remove it otherwise.
    /// Returns whether the file is listed afterwards.
    pub fn toggle_file(&mut self, path: &str) -> StorageResult<bool> {
        if self.rules.has_file(path) {
            self.remove_file(path).map(|_| false)
        } else {
            self.add_file(path).map(|_| true)
        }
    }
}

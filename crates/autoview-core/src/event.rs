//! Rule edits and the events they publish.
//!
//! Every successful edit of a [`RuleSet`](crate::RuleSet) produces exactly one
//! [`SettingsEvent`]. The serialized event shape is what settings UIs consume:
//!
//! ```json
//! { "value": "Docs", "kind": "folder", "operation": "append" }
//! ```

use serde::{Deserialize, Serialize};

use crate::mode::Mode;

/// Which rule collection an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    /// Explicit file path.
    File,
    /// Folder path (matches at any depth below it).
    Folder,
    /// Inclusion pattern.
    Rule,
    /// Exclusion pattern.
    BlackRule,
    /// Configured default mode.
    InitState,
}

/// What happened to the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOperation {
    Append,
    Remove,
    Update,
}

/// Notification describing one applied rule edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsEvent {
    pub value: String,
    pub kind: RuleKind,
    pub operation: RuleOperation,
}

impl SettingsEvent {
    #[must_use]
    pub fn new(kind: RuleKind, operation: RuleOperation, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind,
            operation,
        }
    }
}

/// A single mutation of the rule set.
///
/// Serialized as `{"edit": "add_folder", "value": "Docs"}` so scenario files
/// and settings front-ends can carry edits as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "edit", content = "value", rename_all = "snake_case")]
pub enum RuleEdit {
    AddFile(String),
    RemoveFile(String),
    AddFolder(String),
    RemoveFolder(String),
    AddIncludeRule(String),
    RemoveIncludeRule(String),
    AddExcludeRule(String),
    RemoveExcludeRule(String),
    SetDefaultMode(Mode),
}

impl RuleEdit {
    /// The event this edit publishes when it changes the rule set.
    #[must_use]
    pub fn event(&self) -> SettingsEvent {
        let (kind, operation, value) = match self {
            Self::AddFile(v) => (RuleKind::File, RuleOperation::Append, v.as_str()),
            Self::RemoveFile(v) => (RuleKind::File, RuleOperation::Remove, v.as_str()),
            Self::AddFolder(v) => (RuleKind::Folder, RuleOperation::Append, v.as_str()),
            Self::RemoveFolder(v) => (RuleKind::Folder, RuleOperation::Remove, v.as_str()),
            Self::AddIncludeRule(v) => (RuleKind::Rule, RuleOperation::Append, v.as_str()),
            Self::RemoveIncludeRule(v) => (RuleKind::Rule, RuleOperation::Remove, v.as_str()),
            Self::AddExcludeRule(v) => (RuleKind::BlackRule, RuleOperation::Append, v.as_str()),
            Self::RemoveExcludeRule(v) => {
                (RuleKind::BlackRule, RuleOperation::Remove, v.as_str())
            }
            Self::SetDefaultMode(mode) => {
                (RuleKind::InitState, RuleOperation::Update, mode.as_str())
            }
        };
        SettingsEvent::new(kind, operation, value)
    }
}

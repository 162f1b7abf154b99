#![forbid(unsafe_code)]
#![doc = "Host traits for autoview: the boundary between the control loop and the editor application."]
#![doc = ""]
#![doc = "The host owns panes and editors. autoview only ever sees a pane through a"]
#![doc = "[`PaneId`] and an editor through two calls: read the mode name, toggle it."]

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier the host issues for a pane.
///
/// `0` is reserved/invalid so IDs are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct PaneId(u64);

impl PaneId {
    /// Lowest valid pane ID.
    pub const MIN: Self = Self(1);

    /// Create a new pane ID, rejecting 0.
    pub fn new(raw: u64) -> Result<Self, PaneIdError> {
        if raw == 0 {
            return Err(PaneIdError::Zero);
        }
        Ok(Self(raw))
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Return the next ID, or an error on overflow.
    pub fn checked_next(self) -> Result<Self, PaneIdError> {
        let Some(next) = self.0.checked_add(1) else {
            return Err(PaneIdError::Overflow { current: self.0 });
        };
        Self::new(next)
    }
}

impl Default for PaneId {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pane#{}", self.0)
    }
}

impl TryFrom<u64> for PaneId {
    type Error = PaneIdError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<PaneId> for u64 {
    fn from(id: PaneId) -> Self {
        id.0
    }
}

/// Errors from constructing a [`PaneId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneIdError {
    /// `0` is not a valid pane ID.
    Zero,
    /// Incrementing the ID would overflow.
    Overflow { current: u64 },
}

impl fmt::Display for PaneIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => write!(f, "pane id must be non-zero"),
            Self::Overflow { current } => write!(f, "pane id overflow after {current}"),
        }
    }
}

impl std::error::Error for PaneIdError {}

/// Workspace half of the host: which pane and which document are active.
pub trait HostWorkspace {
    /// Path of the document shown in the active pane, or `None` when no
    /// document is open.
    fn active_document_path(&self) -> Option<&str>;

    /// The active pane, or `None` when the active view is not a
    /// document-editing pane.
    fn active_pane(&self) -> Option<PaneId>;

    /// Whether the host still holds a pane with this ID.
    ///
    /// autoview never keeps a pane alive; state for panes that stop
    /// existing is discarded.
    fn pane_exists(&self, pane: PaneId) -> bool;
}

/// Editor half of the host: read and flip the active editor's mode.
pub trait HostEditor {
    /// Raw mode name of the active editor (`"source"`, `"preview"`, or
    /// anything else), or `None` when no editor is active.
    fn editor_mode(&self) -> Option<&str>;

    /// Flip the active editor between its two managed modes.
    ///
    /// Behavior is undefined by contract when the editor is in any other
    /// mode; callers must check [`HostEditor::editor_mode`] first.
    fn toggle_mode(&mut self);
}

/// A complete host: workspace plus editor.
pub trait Host: HostWorkspace + HostEditor {}

impl<T: HostWorkspace + HostEditor + ?Sized> Host for T {}

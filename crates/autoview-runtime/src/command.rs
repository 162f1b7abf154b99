//! Commands a host can bind to buttons, palettes, or key chords.

use std::fmt;

/// Registered commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Add the active document to the explicit file list, or remove it.
    ToggleActiveFile,
}

impl Command {
    pub const ALL: [Self; 1] = [Self::ToggleActiveFile];

    /// Stable identifier for host registration.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::ToggleActiveFile => "append-or-remove-to-switch-list",
        }
    }

    /// Human-readable title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::ToggleActiveFile => "Append or remove to auto switch list",
        }
    }

    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

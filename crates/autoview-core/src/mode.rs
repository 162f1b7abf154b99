//! Presentation modes and the tri-state probe result.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the two presentation modes autoview manages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Raw markup editing.
    #[default]
    Source,
    /// Rendered reading view.
    Preview,
}

impl Mode {
    /// Both managed modes, in declaration order.
    pub const ALL: [Self; 2] = [Self::Source, Self::Preview];

    /// Host-facing name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Preview => "preview",
        }
    }

    /// Parse a host-reported mode name. Anything other than the two managed
    /// names yields `None`.
    #[must_use]
    pub fn from_host_str(raw: &str) -> Option<Self> {
        match raw {
            "source" => Some(Self::Source),
            "preview" => Some(Self::Preview),
            _ => None,
        }
    }

    /// The mode a single host toggle flips into.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Source => Self::Preview,
            Self::Preview => Self::Source,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`Mode`] from user-supplied text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mode {0:?} (expected \"source\" or \"preview\")")]
pub struct ParseModeError(pub String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_host_str(s.trim()).ok_or_else(|| ParseModeError(s.to_owned()))
    }
}

/// Result of reading a pane's mode.
///
/// `Indeterminate` covers "no editing pane is active" and "the host reported
/// a mode outside the managed pair". It is never stored as a remembered mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeProbe {
    Known(Mode),
    Indeterminate,
}

impl ModeProbe {
    /// Classify a raw host mode string.
    #[must_use]
    pub fn from_host_str(raw: &str) -> Self {
        Mode::from_host_str(raw).into()
    }

    /// The managed mode, if any.
    #[must_use]
    pub const fn known(self) -> Option<Mode> {
        match self {
            Self::Known(mode) => Some(mode),
            Self::Indeterminate => None,
        }
    }

    #[must_use]
    pub const fn is_indeterminate(self) -> bool {
        matches!(self, Self::Indeterminate)
    }
}

impl From<Mode> for ModeProbe {
    fn from(mode: Mode) -> Self {
        Self::Known(mode)
    }
}

impl From<Option<Mode>> for ModeProbe {
    fn from(mode: Option<Mode>) -> Self {
        mode.map_or(Self::Indeterminate, Self::Known)
    }
}

impl fmt::Display for ModeProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(mode) => fmt::Display::fmt(mode, f),
            Self::Indeterminate => f.write_str("indeterminate"),
        }
    }
}

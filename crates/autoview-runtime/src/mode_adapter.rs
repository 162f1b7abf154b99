//! Narrow adapter over the host editor: read the mode, force a mode.
//!
//! The adapter never toggles a pane whose mode it cannot read, and issues at
//! most one host toggle per call. The mode is only readable while a
//! document-editing pane is active.

use autoview_backend::Host;
use autoview_core::{Mode, ModeProbe};
use tracing::{debug, info};

/// Read the active editor's mode without borrowing it mutably.
///
/// `Indeterminate` when the host reports no active document pane, even if
/// its editor half answers.
#[must_use]
pub fn read_mode<H: Host + ?Sized>(host: &H) -> ModeProbe {
    if host.active_pane().is_none() {
        return ModeProbe::Indeterminate;
    }
    host.editor_mode()
        .map_or(ModeProbe::Indeterminate, ModeProbe::from_host_str)
}

/// What [`ModeAdapter::force_mode`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceOutcome {
    /// Already in the target mode; no host call.
    Unchanged,
    /// One host toggle was issued.
    Toggled,
    /// Current mode is indeterminate; nothing was attempted.
    Rejected,
}

/// Borrowed view of a host editor exposing exactly two operations.
pub struct ModeAdapter<'a, H: Host + ?Sized> {
    host: &'a mut H,
}

impl<'a, H: Host + ?Sized> ModeAdapter<'a, H> {
    pub fn new(host: &'a mut H) -> Self {
        Self { host }
    }

    /// Current mode of the active editor.
    #[must_use]
    pub fn current_mode(&self) -> ModeProbe {
        read_mode(&*self.host)
    }

    /// Put the active editor into `target`.
    pub fn force_mode(&mut self, target: Mode) -> ForceOutcome {
        match self.current_mode() {
            ModeProbe::Indeterminate => {
                debug!(target_mode = %target, "force_mode rejected: indeterminate editor mode");
                ForceOutcome::Rejected
            }
            ModeProbe::Known(current) if current == target => ForceOutcome::Unchanged,
            ModeProbe::Known(current) => {
                self.host.toggle_mode();
                info!(from = %current, to = %target, "editor mode toggled");
                ForceOutcome::Toggled
            }
        }
    }
}

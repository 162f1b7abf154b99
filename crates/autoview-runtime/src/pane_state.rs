//! Per-pane remembered mode and lock flag.
//!
//! # Design
//!
//! State records live in an arena keyed by the host-issued [`PaneId`]. The
//! store never keeps a pane alive: records are dropped through
//! [`PaneStateStore::release`] when the host disposes of a pane, and
//! [`PaneStateStore::retain_live`] sweeps records for panes the host no longer
//! reports. Every public operation resolves "the active pane" through the
//! host first and is a no-op when there is none.
//!
//! # Invariants
//!
//! 1. `remembered` is never written while `locked == true`.
//! 2. `remembered` never holds an indeterminate mode (the type cannot).
//! 3. A pane must be observed (record created) before it can be locked.
//!
//! # Inheritance
//!
//! A brand-new pane whose own mode cannot be read copies the remembered mode
//! of the last active pane (freshly split panes start out showing whatever
//! their sibling showed), falling back to the configured default mode.

use std::collections::BTreeMap;

use autoview_backend::{Host, HostWorkspace, PaneId};
use autoview_core::{Mode, ModeProbe};
use tracing::{debug, trace};

use crate::mode_adapter::read_mode;

/// Record kept for one live pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaneState {
    remembered: Option<Mode>,
    locked: bool,
}

impl PaneState {
    /// Mode to restore when management ends (`None` = unknown).
    #[must_use]
    pub const fn remembered(&self) -> Option<Mode> {
        self.remembered
    }

    /// Whether the pane is currently held in the managed mode.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }
}

/// Arena of [`PaneState`] records plus the last-active pane scalar.
#[derive(Debug, Clone, Default)]
pub struct PaneStateStore {
    states: BTreeMap<PaneId, PaneState>,
    last_active: Option<PaneId>,
}

impl PaneStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the active pane's current mode unless the pane is locked.
    ///
    /// On first observation the record is seeded from, in order:
    /// `override_initial`, the pane's own readable mode, the last active
    /// pane's remembered mode, `default_mode`.
    pub fn record_if_unlocked<H: Host + ?Sized>(
        &mut self,
        host: &H,
        override_initial: Option<Mode>,
        default_mode: Mode,
    ) {
        let Some(pane) = host.active_pane() else {
            return;
        };
        let current = read_mode(host).known();

        match self.states.get_mut(&pane) {
            None => {
                let seed = override_initial
                    .or(current)
                    .or_else(|| self.last_active_remembered(host))
                    .unwrap_or(default_mode);
                debug!(%pane, seed = %seed, "pane observed");
                self.states.insert(
                    pane,
                    PaneState {
                        remembered: Some(seed),
                        locked: false,
                    },
                );
            }
            Some(state) if state.locked => {
                trace!(%pane, "pane locked; remembered mode kept");
            }
            Some(state) => {
                state.remembered = current;
                trace!(%pane, remembered = ?current, "remembered mode updated");
            }
        }
        self.last_active = Some(pane);
    }

    /// Lock the active pane. Returns the previous lock value, or `None` when
    /// there is no active pane or it has never been observed.
    pub fn lock<H: HostWorkspace + ?Sized>(&mut self, host: &H) -> Option<bool> {
        let state = self.active_state_mut(host)?;
        Some(std::mem::replace(&mut state.locked, true))
    }

    /// Unlock the active pane if it has a record.
    pub fn unlock<H: HostWorkspace + ?Sized>(&mut self, host: &H) {
        if let Some(state) = self.active_state_mut(host) {
            state.locked = false;
        }
    }

    /// Whether the active pane is locked (`false` without a record).
    #[must_use]
    pub fn is_locked<H: HostWorkspace + ?Sized>(&self, host: &H) -> bool {
        self.active_state(host).is_some_and(|s| s.locked)
    }

    /// Remembered mode of the active pane, or `Indeterminate` when there is
    /// no record or the mode was never determinable.
    #[must_use]
    pub fn remembered_mode<H: HostWorkspace + ?Sized>(&self, host: &H) -> ModeProbe {
        self.active_state(host).and_then(|s| s.remembered).into()
    }

    // ---- Pane lifecycle ----

    /// Drop the record for a disposed pane. Returns whether one existed.
    pub fn release(&mut self, pane: PaneId) -> bool {
        if self.last_active == Some(pane) {
            self.last_active = None;
        }
        self.states.remove(&pane).is_some()
    }

    /// Drop records for every pane the host no longer holds. Returns the
    /// number of records removed.
    pub fn retain_live<H: HostWorkspace + ?Sized>(&mut self, host: &H) -> usize {
        let before = self.states.len();
        self.states.retain(|pane, _| host.pane_exists(*pane));
        if self.last_active.is_some_and(|pane| !host.pane_exists(pane)) {
            self.last_active = None;
        }
        let removed = before - self.states.len();
        if removed > 0 {
            debug!(removed, "swept state of discarded panes");
        }
        removed
    }

    // ---- Inspection ----

    /// Record for a specific pane.
    #[must_use]
    pub fn state(&self, pane: PaneId) -> Option<&PaneState> {
        self.states.get(&pane)
    }

    /// Pane most recently observed by [`Self::record_if_unlocked`].
    #[must_use]
    pub const fn last_active(&self) -> Option<PaneId> {
        self.last_active
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn active_state<H: HostWorkspace + ?Sized>(&self, host: &H) -> Option<&PaneState> {
        host.active_pane().and_then(|pane| self.states.get(&pane))
    }

    fn active_state_mut<H: HostWorkspace + ?Sized>(&mut self, host: &H) -> Option<&mut PaneState> {
        host.active_pane().and_then(|pane| self.states.get_mut(&pane))
    }

    fn last_active_remembered<H: HostWorkspace + ?Sized>(&self, host: &H) -> Option<Mode> {
        self.last_active
            .filter(|pane| host.pane_exists(*pane))
            .and_then(|pane| self.states.get(&pane))
            .and_then(|state| state.remembered)
    }
}

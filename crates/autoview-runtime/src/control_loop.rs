//! Activation control loop.
//!
//! [`ControlLoop::on_activate`] runs synchronously once per host
//! active-pane-changed event and moves the active pane between two states:
//!
//! ```text
//!                 managed path, readable mode
//!   Unmanaged  ─────────────────────────────────▶  Managed-Locked
//!      ▲   │                                            │   │
//!      │   └─ unmanaged path: track user's mode         │   └─ managed path: hold preview
//!      └────────────────────────────────────────────────┘
//!        unmanaged path: unlock, restore remembered mode
//! ```
//!
//! Classification is recomputed on every activation, so rule edits take
//! effect on the next event without any cache invalidation.

use autoview_backend::{Host, PaneId};
use autoview_core::{Mode, ModeProbe, Verdict};
use tracing::{debug, debug_span};

use crate::command::Command;
use crate::mode_adapter::{ForceOutcome, ModeAdapter, read_mode};
use crate::pane_state::PaneStateStore;
use crate::rule_store::RuleStore;
use crate::storage::StorageResult;

/// What one activation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No document is open; nothing happened.
    NoDocument,
    /// Managed path but the editor mode is unreadable or no document pane
    /// is active; nothing happened.
    Indeterminate,
    /// Pane entered managed mode.
    Locked,
    /// Pane was already managed and stays in preview.
    Held,
    /// Pane left managed mode; `restored` is the remembered mode it is now
    /// in, or `None` when the remembered mode was unknown or the editor
    /// could not be read.
    Released { restored: Option<Mode> },
    /// Unmanaged pane; its current mode was recorded.
    Tracked,
}

/// Orchestrates [`RuleStore`], [`PaneStateStore`], and the mode adapter.
#[derive(Debug, Default)]
pub struct ControlLoop {
    rules: RuleStore,
    panes: PaneStateStore,
}

impl ControlLoop {
    #[must_use]
    pub fn new(rules: RuleStore) -> Self {
        Self {
            rules,
            panes: PaneStateStore::new(),
        }
    }

    #[must_use]
    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    /// Mutable access for settings front-ends. Edits never touch pane state;
    /// they take effect on the next activation.
    pub fn rules_mut(&mut self) -> &mut RuleStore {
        &mut self.rules
    }

    #[must_use]
    pub fn panes(&self) -> &PaneStateStore {
        &self.panes
    }

    /// Handle one active-pane-changed event.
    pub fn on_activate<H: Host + ?Sized>(&mut self, host: &mut H) -> Transition {
        self.panes.retain_live(&*host);
        let Some(path) = host.active_document_path().map(str::to_owned) else {
            return Transition::NoDocument;
        };
        let pane = host.active_pane();
        let _span = debug_span!(
            "autoview.activate",
            path = %path,
            pane = pane.map(PaneId::get)
        )
        .entered();

        let verdict = self.rules.classify(&path);
        let transition = match verdict {
            Verdict::Managed => self.enter_managed(host),
            Verdict::Unmanaged if self.panes.is_locked(&*host) => self.release(host),
            Verdict::Unmanaged => {
                self.panes
                    .record_if_unlocked(&*host, None, self.rules.default_mode());
                Transition::Tracked
            }
        };
        debug!(?verdict, ?transition, "activation handled");
        transition
    }

    /// Drop state for a pane the host has disposed of.
    pub fn on_pane_closed(&mut self, pane: PaneId) -> bool {
        let released = self.panes.release(pane);
        debug!(%pane, released, "pane closed");
        released
    }

    /// Run a registered command against the active pane.
    pub fn run_command<H: Host + ?Sized>(
        &mut self,
        command: Command,
        host: &mut H,
    ) -> StorageResult<Option<Transition>> {
        match command {
            Command::ToggleActiveFile => self.toggle_active_file(host),
        }
    }

    /// Add the active document to the explicit file list, or remove it if
    /// already listed, then re-run activation so the pane reflects it.
    ///
    /// Activation runs even when persisting the edit fails; the save error
    /// is returned afterwards.
    pub fn toggle_active_file<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> StorageResult<Option<Transition>> {
        let Some(path) = host.active_document_path().map(str::to_owned) else {
            return Ok(None);
        };
        let saved = self.rules.toggle_file(&path);
        let transition = self.on_activate(host);
        saved.map(|_| Some(transition))
    }

    fn enter_managed<H: Host + ?Sized>(&mut self, host: &mut H) -> Transition {
        if read_mode(&*host).is_indeterminate() {
            return Transition::Indeterminate;
        }
        self.panes
            .record_if_unlocked(&*host, None, self.rules.default_mode());
        let was_locked = self.panes.lock(&*host);
        if was_locked.is_none() {
            return Transition::Indeterminate;
        }
        ModeAdapter::new(&mut *host).force_mode(Mode::Preview);
        if was_locked == Some(true) {
            Transition::Held
        } else {
            Transition::Locked
        }
    }

    fn release<H: Host + ?Sized>(&mut self, host: &mut H) -> Transition {
        self.panes.unlock(&*host);
        let restored = match self.panes.remembered_mode(&*host) {
            ModeProbe::Known(mode) => match ModeAdapter::new(&mut *host).force_mode(mode) {
                ForceOutcome::Toggled | ForceOutcome::Unchanged => Some(mode),
                ForceOutcome::Rejected => None,
            },
            ModeProbe::Indeterminate => None,
        };
        Transition::Released { restored }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_host::TestHost;
    use autoview_core::RuleEdit;

    fn pane(raw: u64) -> PaneId {
        PaneId::new(raw).unwrap()
    }

    fn with_folder(folder: &str) -> ControlLoop {
        let mut rules = RuleStore::in_memory(Mode::Source);
        rules.add_folder(folder).unwrap();
        ControlLoop::new(rules)
    }

    // ---- Entering and leaving ----

    #[test]
    fn managed_path_locks_and_forces_preview() {
        let mut host = TestHost::single(Some("Docs/readme.md"), "source");
        let mut cl = with_folder("Docs");
        assert_eq!(cl.on_activate(&mut host), Transition::Locked);
        assert_eq!(host.mode(1), Some("preview"));
        let state = cl.panes().state(pane(1)).unwrap();
        assert!(state.is_locked());
        assert_eq!(state.remembered(), Some(Mode::Source));
    }

    #[test]
    fn leaving_managed_path_restores_mode() {
        let mut host = TestHost::single(Some("Docs/readme.md"), "source");
        let mut cl = with_folder("Docs");
        cl.on_activate(&mut host);
        host.open("other.md");
        assert_eq!(
            cl.on_activate(&mut host),
            Transition::Released {
                restored: Some(Mode::Source)
            }
        );
        assert_eq!(host.mode(1), Some("source"));
        assert_eq!(host.toggles(1), 2);
        assert!(!cl.panes().state(pane(1)).unwrap().is_locked());
    }

    #[test]
    fn staying_managed_holds_without_toggling() {
        let mut host = TestHost::single(Some("Docs/a.md"), "source");
        let mut cl = with_folder("Docs");
        cl.on_activate(&mut host);
        host.open("Docs/b.md");
        assert_eq!(cl.on_activate(&mut host), Transition::Held);
        assert_eq!(host.toggles(1), 1);
    }

    #[test]
    fn manual_toggle_while_locked_is_reverted_on_next_activation() {
        let mut host = TestHost::single(Some("Docs/a.md"), "source");
        let mut cl = with_folder("Docs");
        cl.on_activate(&mut host);
        host.set_mode(1, "source");
        assert_eq!(cl.on_activate(&mut host), Transition::Held);
        assert_eq!(host.mode(1), Some("preview"));
        assert_eq!(
            cl.panes().state(pane(1)).unwrap().remembered(),
            Some(Mode::Source)
        );
    }

    // ---- No-op branches ----

    #[test]
    fn no_document_is_a_noop() {
        let mut host = TestHost::single(None, "source");
        let mut cl = with_folder("Docs");
        assert_eq!(cl.on_activate(&mut host), Transition::NoDocument);
        assert!(cl.panes().is_empty());
    }

    #[test]
    fn indeterminate_mode_on_managed_path_is_left_alone() {
        let mut host = TestHost::single(Some("Docs/a.md"), "canvas");
        let mut cl = with_folder("Docs");
        assert_eq!(cl.on_activate(&mut host), Transition::Indeterminate);
        assert!(cl.panes().is_empty());
        assert_eq!(host.toggles(1), 0);
    }

    #[test]
    fn unmanaged_path_only_tracks() {
        let mut host = TestHost::single(Some("a.md"), "preview");
        let mut cl = ControlLoop::new(RuleStore::in_memory(Mode::Source));
        assert_eq!(cl.on_activate(&mut host), Transition::Tracked);
        assert_eq!(host.toggles(1), 0);
        assert_eq!(
            cl.panes().state(pane(1)).unwrap().remembered(),
            Some(Mode::Preview)
        );
    }

    #[test]
    fn release_into_unreadable_editor_does_not_toggle() {
        let mut host = TestHost::single(Some("Docs/a.md"), "source");
        let mut cl = with_folder("Docs");
        cl.on_activate(&mut host);
        host.set_mode(1, "loading");
        host.open("other.md");
        assert_eq!(
            cl.on_activate(&mut host),
            Transition::Released { restored: None }
        );
        assert!(!cl.panes().state(pane(1)).unwrap().is_locked());
        assert_eq!(host.toggles(1), 1);
        assert_eq!(host.mode(1), Some("loading"));
    }

    #[test]
    fn editor_without_document_pane_is_never_forced() {
        let mut host = TestHost::single(Some("Docs/a.md"), "source");
        host.detach_editor();
        let mut cl = with_folder("Docs");
        assert_eq!(cl.on_activate(&mut host), Transition::Indeterminate);
        assert_eq!(host.mode(1), Some("source"));
        assert_eq!(host.toggles(1), 0);
        assert!(cl.panes().is_empty());

        host.open("other.md");
        assert_eq!(cl.on_activate(&mut host), Transition::Tracked);
        assert_eq!(host.toggles(1), 0);
    }

    // ---- Rule edits and pane churn ----

    #[test]
    fn rule_edit_takes_effect_on_next_activation() {
        let mut host = TestHost::single(Some("note.secret.md"), "source");
        let mut cl = ControlLoop::new(RuleStore::in_memory(Mode::Source));
        assert_eq!(cl.on_activate(&mut host), Transition::Tracked);
        cl.rules_mut()
            .apply(RuleEdit::AddIncludeRule("\\.secret\\.md$".into()))
            .unwrap();
        assert_eq!(cl.on_activate(&mut host), Transition::Locked);
    }

    #[test]
    fn closed_panes_are_forgotten() {
        let mut host = TestHost::single(Some("Docs/a.md"), "source");
        host.add_pane(2, Some("b.md"), "source");
        let mut cl = with_folder("Docs");
        cl.on_activate(&mut host);
        assert!(cl.on_pane_closed(pane(1)));
        assert!(!cl.on_pane_closed(pane(1)));

        host.remove_pane(1);
        host.focus(2);
        cl.on_activate(&mut host);
        assert!(cl.panes().state(pane(1)).is_none());
        assert!(cl.panes().state(pane(2)).is_some());
    }

    #[test]
    fn activation_sweeps_panes_the_host_dropped() {
        let mut host = TestHost::single(Some("a.md"), "source");
        host.add_pane(2, Some("b.md"), "source");
        let mut cl = ControlLoop::new(RuleStore::in_memory(Mode::Source));
        cl.on_activate(&mut host);
        host.remove_pane(1);
        host.focus(2);
        cl.on_activate(&mut host);
        assert_eq!(cl.panes().len(), 1);
    }

    #[test]
    fn non_document_view_is_never_recorded() {
        let mut host = TestHost::empty();
        host.add_other_view(5);
        host.focus(5);
        let mut cl = with_folder("Docs");
        assert_eq!(cl.on_activate(&mut host), Transition::NoDocument);
        assert!(cl.panes().is_empty());
    }

    // ---- Commands ----

    #[test]
    fn toggle_active_file_manages_then_releases() {
        let mut host = TestHost::single(Some("a.md"), "source");
        let mut cl = ControlLoop::new(RuleStore::in_memory(Mode::Source));
        cl.on_activate(&mut host);

        let t = cl.run_command(Command::ToggleActiveFile, &mut host).unwrap();
        assert_eq!(t, Some(Transition::Locked));
        assert_eq!(host.mode(1), Some("preview"));

        let t = cl.toggle_active_file(&mut host).unwrap();
        assert_eq!(
            t,
            Some(Transition::Released {
                restored: Some(Mode::Source)
            })
        );
        assert_eq!(host.mode(1), Some("source"));
    }

    #[test]
    fn toggle_without_document_does_nothing() {
        let mut host = TestHost::empty();
        let mut cl = ControlLoop::new(RuleStore::in_memory(Mode::Source));
        assert_eq!(cl.toggle_active_file(&mut host).unwrap(), None);
        assert!(cl.rules().rules().is_empty());
    }
}

//! Minimal in-crate host for unit tests.

use std::collections::BTreeMap;

use autoview_backend::{HostEditor, HostWorkspace, PaneId};

#[derive(Debug, Default)]
struct Pane {
    path: Option<String>,
    /// `None` for non-document views.
    mode: Option<String>,
    /// Editor readable but not reported as a document pane.
    detached: bool,
    toggles: u32,
}

#[derive(Debug, Default)]
pub(crate) struct TestHost {
    panes: BTreeMap<u64, Pane>,
    active: Option<u64>,
}

impl TestHost {
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn single(path: Option<&str>, mode: &str) -> Self {
        let mut host = Self::default();
        host.add_pane(1, path, mode);
        host.focus(1);
        host
    }

    pub(crate) fn add_pane(&mut self, id: u64, path: Option<&str>, mode: &str) {
        self.panes.insert(
            id,
            Pane {
                path: path.map(str::to_owned),
                mode: Some(mode.to_owned()),
                ..Pane::default()
            },
        );
    }

    pub(crate) fn add_other_view(&mut self, id: u64) {
        self.panes.insert(id, Pane::default());
    }

    pub(crate) fn focus(&mut self, id: u64) {
        self.active = Some(id);
    }

    /// Keep the active pane's editor readable but stop reporting it as the
    /// active document pane.
    pub(crate) fn detach_editor(&mut self) {
        if let Some(pane) = self.active.and_then(|id| self.panes.get_mut(&id)) {
            pane.detached = true;
        }
    }

    pub(crate) fn remove_pane(&mut self, id: u64) {
        self.panes.remove(&id);
        if self.active == Some(id) {
            self.active = None;
        }
    }

    pub(crate) fn open(&mut self, path: &str) {
        if let Some(pane) = self.active.and_then(|id| self.panes.get_mut(&id)) {
            pane.path = Some(path.to_owned());
        }
    }

    pub(crate) fn set_mode(&mut self, id: u64, mode: &str) {
        if let Some(pane) = self.panes.get_mut(&id) {
            pane.mode = Some(mode.to_owned());
        }
    }

    pub(crate) fn mode(&self, id: u64) -> Option<&str> {
        self.panes.get(&id).and_then(|p| p.mode.as_deref())
    }

    pub(crate) fn toggles(&self, id: u64) -> u32 {
        self.panes.get(&id).map_or(0, |p| p.toggles)
    }

    fn active(&self) -> Option<&Pane> {
        self.active.and_then(|id| self.panes.get(&id))
    }
}

impl HostWorkspace for TestHost {
    fn active_document_path(&self) -> Option<&str> {
        self.active().and_then(|p| p.path.as_deref())
    }

    fn active_pane(&self) -> Option<PaneId> {
        let id = self.active?;
        let pane = self.panes.get(&id)?;
        pane.mode.as_ref()?;
        if pane.detached {
            return None;
        }
        PaneId::new(id).ok()
    }

    fn pane_exists(&self, pane: PaneId) -> bool {
        self.panes.contains_key(&pane.get())
    }
}

impl HostEditor for TestHost {
    fn editor_mode(&self) -> Option<&str> {
        self.active().and_then(|p| p.mode.as_deref())
    }

    fn toggle_mode(&mut self) {
        let Some(pane) = self.active.and_then(|id| self.panes.get_mut(&id)) else {
            return;
        };
        pane.toggles += 1;
        let next = match pane.mode.as_deref() {
            Some("source") => Some("preview"),
            Some("preview") => Some("source"),
            _ => None,
        };
        if let Some(next) = next {
            pane.mode = Some(next.to_owned());
        }
    }
}

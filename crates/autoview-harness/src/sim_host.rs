//! Deterministic in-memory host.
//!
//! [`SimHost`] models the slice of an editor application autoview talks to:
//! an arena of panes, one of them focused, each either an editor (showing a
//! document in some mode) or another kind of view. Every host toggle is
//! counted per pane so tests can assert how often the control loop flipped
//! an editor.

use std::collections::BTreeMap;

use autoview_backend::{HostEditor, HostWorkspace, PaneId, PaneIdError};

/// Mode a freshly split editor reports until it settles.
pub const SPLIT_INITIAL_MODE: &str = "loading";

/// What a simulated pane displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimView {
    /// Document editor in the given raw mode.
    Editor { mode: String },
    /// Non-editor view such as a graph or file list.
    Other { kind: String },
}

/// One simulated pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimPane {
    pub document: Option<String>,
    pub view: SimView,
    pub toggles: u32,
}

impl SimPane {
    /// Raw editor mode, or `None` for non-editor views.
    #[must_use]
    pub fn mode(&self) -> Option<&str> {
        match &self.view {
            SimView::Editor { mode } => Some(mode),
            SimView::Other { .. } => None,
        }
    }
}

/// Simulated workspace plus editor.
#[derive(Debug, Clone)]
pub struct SimHost {
    panes: BTreeMap<PaneId, SimPane>,
    next_id: PaneId,
    active: Option<PaneId>,
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHost {
    #[must_use]
    pub fn new() -> Self {
        Self {
            panes: BTreeMap::new(),
            next_id: PaneId::MIN,
            active: None,
        }
    }

    fn allocate(&mut self, pane: SimPane) -> Result<PaneId, PaneIdError> {
        let id = self.next_id;
        self.next_id = id.checked_next()?;
        self.panes.insert(id, pane);
        self.active = Some(id);
        Ok(id)
    }

    /// Open a new editor pane and focus it.
    pub fn open_pane(&mut self, document: Option<&str>, mode: &str) -> Result<PaneId, PaneIdError> {
        self.allocate(SimPane {
            document: document.map(str::to_owned),
            view: SimView::Editor {
                mode: mode.to_owned(),
            },
            toggles: 0,
        })
    }

    /// Split the focused pane: the new pane shows the same document in
    /// [`SPLIT_INITIAL_MODE`] and takes focus. `None` without a focused pane.
    pub fn split_active(&mut self) -> Result<Option<PaneId>, PaneIdError> {
        let Some(document) = self.active_sim_pane().map(|p| p.document.clone()) else {
            return Ok(None);
        };
        let id = self.allocate(SimPane {
            document,
            view: SimView::Editor {
                mode: SPLIT_INITIAL_MODE.to_owned(),
            },
            toggles: 0,
        })?;
        Ok(Some(id))
    }

    /// Dispose of a pane. Focus is lost if it was focused.
    pub fn close_pane(&mut self, pane: PaneId) -> bool {
        if self.active == Some(pane) {
            self.active = None;
        }
        self.panes.remove(&pane).is_some()
    }

    pub fn focus(&mut self, pane: PaneId) -> bool {
        if !self.panes.contains_key(&pane) {
            return false;
        }
        self.active = Some(pane);
        true
    }

    /// Show `path` in the focused pane.
    pub fn open_document(&mut self, path: &str) -> bool {
        match self.active_sim_pane_mut() {
            Some(pane) => {
                pane.document = Some(path.to_owned());
                true
            }
            None => false,
        }
    }

    /// User-driven mode change; not counted as a host toggle.
    pub fn set_mode(&mut self, pane: PaneId, mode: &str) -> bool {
        match self.panes.get_mut(&pane) {
            Some(p) => {
                p.view = SimView::Editor {
                    mode: mode.to_owned(),
                };
                true
            }
            None => false,
        }
    }

    /// Turn a pane into a non-editor view.
    pub fn set_view_kind(&mut self, pane: PaneId, kind: &str) -> bool {
        match self.panes.get_mut(&pane) {
            Some(p) => {
                p.view = SimView::Other {
                    kind: kind.to_owned(),
                };
                true
            }
            None => false,
        }
    }

    // ---- Inspection ----

    #[must_use]
    pub fn active(&self) -> Option<PaneId> {
        self.active
    }

    #[must_use]
    pub fn pane(&self, pane: PaneId) -> Option<&SimPane> {
        self.panes.get(&pane)
    }

    #[must_use]
    pub fn mode(&self, pane: PaneId) -> Option<&str> {
        self.panes.get(&pane).and_then(SimPane::mode)
    }

    #[must_use]
    pub fn toggles(&self, pane: PaneId) -> u32 {
        self.panes.get(&pane).map_or(0, |p| p.toggles)
    }

    pub fn pane_ids(&self) -> impl Iterator<Item = PaneId> + '_ {
        self.panes.keys().copied()
    }

    /// The `n`th live pane in id order. Returns an owned id, so callers can
    /// mutate the host right after.
    #[must_use]
    pub fn nth_pane(&self, n: usize) -> Option<PaneId> {
        self.panes.keys().nth(n).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.panes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.panes.is_empty()
    }

    fn active_sim_pane(&self) -> Option<&SimPane> {
        self.active.and_then(|id| self.panes.get(&id))
    }

    fn active_sim_pane_mut(&mut self) -> Option<&mut SimPane> {
        self.active.and_then(|id| self.panes.get_mut(&id))
    }
}

impl HostWorkspace for SimHost {
    fn active_document_path(&self) -> Option<&str> {
        let pane = self.active_sim_pane()?;
        pane.mode()?;
        pane.document.as_deref()
    }

    fn active_pane(&self) -> Option<PaneId> {
        let id = self.active?;
        self.panes.get(&id)?.mode()?;
        Some(id)
    }

    fn pane_exists(&self, pane: PaneId) -> bool {
        self.panes.contains_key(&pane)
    }
}

impl HostEditor for SimHost {
    fn editor_mode(&self) -> Option<&str> {
        self.active_sim_pane().and_then(SimPane::mode)
    }

    fn toggle_mode(&mut self) {
        let Some(pane) = self.active_sim_pane_mut() else {
            return;
        };
        pane.toggles += 1;
        if let SimView::Editor { mode } = &mut pane.view {
            let next = match mode.as_str() {
                "source" => "preview",
                "preview" => "source",
                _ => return,
            };
            *mode = next.to_owned();
        }
    }
}

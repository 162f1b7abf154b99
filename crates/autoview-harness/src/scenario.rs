//! JSON scenario replay.
//!
//! A [`Scenario`] is a starting rule set plus a list of [`Step`]s. Steps that
//! correspond to a host focus change (`open_pane`, `split`, `focus`, `open`,
//! `activate`) fire [`ControlLoop::on_activate`] afterwards, the same way a
//! real host forwards active-pane-changed events. Rule edits and user mode
//! changes do not; they are observed on the next activation.
//!
//! ```json
//! {
//!   "name": "folder lock",
//!   "rules": { "folders": ["Docs"] },
//!   "steps": [
//!     { "step": "open_pane", "path": "Docs/readme.md", "mode": "source" },
//!     { "step": "expect", "mode": "preview", "locked": true, "toggles": 1 },
//!     { "step": "open", "path": "notes.md" },
//!     { "step": "expect", "mode": "source", "locked": false }
//!   ]
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use autoview_backend::{PaneId, PaneIdError};
use autoview_core::{Mode, RuleEdit, RuleKind, RuleSetSnapshot};
use autoview_runtime::{Command, ControlLoop, RuleStore, SettingsBus, StorageError, Transition};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::sim_host::SimHost;

/// Exit code for a failed expectation.
pub const EXIT_EXPECTATION_FAILED: i32 = 1;
/// Exit code for an unreadable or invalid scenario.
pub const EXIT_INVALID_SCENARIO: i32 = 2;

fn default_open_mode() -> String {
    Mode::Source.as_str().to_owned()
}

/// One scripted action or assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Open and focus a new editor pane.
    OpenPane {
        #[serde(default)]
        path: Option<String>,
        #[serde(default = "default_open_mode")]
        mode: String,
    },
    /// Split the focused pane.
    Split,
    Focus { pane: PaneId },
    Close { pane: PaneId },
    /// Show a document in the focused pane.
    Open { path: String },
    /// User changes an editor's mode (focused pane when `pane` is absent).
    SetMode {
        #[serde(default)]
        pane: Option<PaneId>,
        mode: String,
    },
    /// Turn a pane into a non-editor view.
    SetViewKind {
        #[serde(default)]
        pane: Option<PaneId>,
        kind: String,
    },
    AddRule { kind: RuleKind, value: String },
    RemoveRule { kind: RuleKind, value: String },
    SetDefaultMode { mode: Mode },
    /// Run the toggle-active-file command.
    ToggleActiveFile,
    /// Fire an activation without changing the host.
    Activate,
    /// Assert on a pane (focused pane when `pane` is absent).
    Expect {
        #[serde(default)]
        pane: Option<PaneId>,
        #[serde(default)]
        mode: Option<String>,
        #[serde(default)]
        locked: Option<bool>,
        #[serde(default)]
        remembered: Option<Mode>,
        #[serde(default)]
        toggles: Option<u32>,
    },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenPane { path, mode } => {
                write!(f, "open_pane {} ({mode})", path.as_deref().unwrap_or("<empty>"))
            }
            Self::Split => f.write_str("split"),
            Self::Focus { pane } => write!(f, "focus {pane}"),
            Self::Close { pane } => write!(f, "close {pane}"),
            Self::Open { path } => write!(f, "open {path}"),
            Self::SetMode { pane, mode } => write!(f, "set_mode {} {mode}", PaneLabel(*pane)),
            Self::SetViewKind { pane, kind } => {
                write!(f, "set_view_kind {} {kind}", PaneLabel(*pane))
            }
            Self::AddRule { kind, value } => write!(f, "add_rule {kind:?} {value}"),
            Self::RemoveRule { kind, value } => write!(f, "remove_rule {kind:?} {value}"),
            Self::SetDefaultMode { mode } => write!(f, "set_default_mode {mode}"),
            Self::ToggleActiveFile => f.write_str("toggle_active_file"),
            Self::Activate => f.write_str("activate"),
            Self::Expect { pane, .. } => write!(f, "expect {}", PaneLabel(*pane)),
        }
    }
}

struct PaneLabel(Option<PaneId>);

impl fmt::Display for PaneLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(pane) => write!(f, "{pane}"),
            None => f.write_str("<active>"),
        }
    }
}

/// A replayable script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: Option<String>,
    /// Default mode when `rules` does not carry one.
    pub default_mode: Mode,
    pub rules: RuleSetSnapshot,
    pub steps: Vec<Step>,
}

/// Errors from loading or replaying a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("step {step}: {reason}")]
    InvalidStep { step: usize, reason: String },
    #[error("step {step}: expectation failed: {detail}")]
    ExpectationFailed { step: usize, detail: String },
    #[error(transparent)]
    PaneId(#[from] PaneIdError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ScenarioError {
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ExpectationFailed { .. } => EXIT_EXPECTATION_FAILED,
            _ => EXIT_INVALID_SCENARIO,
        }
    }
}

impl Scenario {
    pub fn from_json_str(s: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Replay every step, stopping at the first error.
    pub fn run(&self) -> Result<ScenarioReport, ScenarioError> {
        let mut runner = ScenarioRunner::new(self);
        let mut report = ScenarioReport {
            name: self.name.clone(),
            steps: Vec::with_capacity(self.steps.len()),
        };
        for (index, step) in self.steps.iter().enumerate() {
            report.steps.push(runner.step(index, step)?);
        }
        Ok(report)
    }
}

/// Result of one replayed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub index: usize,
    pub description: String,
    /// Activation fired by the step, if any.
    pub transition: Option<Transition>,
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>3}] {}", self.index, self.description)?;
        if let Some(transition) = self.transition {
            write!(f, " -> {transition:?}")?;
        }
        Ok(())
    }
}

/// Outcome of a full replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub name: Option<String>,
    pub steps: Vec<StepOutcome>,
}

/// Host plus control loop, advanced one step at a time.
#[derive(Debug)]
pub struct ScenarioRunner {
    host: SimHost,
    control: ControlLoop,
}

impl ScenarioRunner {
    #[must_use]
    pub fn new(scenario: &Scenario) -> Self {
        let rules = scenario.rules.clone().into_rule_set(scenario.default_mode);
        Self {
            host: SimHost::new(),
            control: ControlLoop::new(RuleStore::new(rules, SettingsBus::new())),
        }
    }

    #[must_use]
    pub fn host(&self) -> &SimHost {
        &self.host
    }

    #[must_use]
    pub fn control(&self) -> &ControlLoop {
        &self.control
    }

    /// Apply `step` (the `index`th of its scenario).
    pub fn step(&mut self, index: usize, step: &Step) -> Result<StepOutcome, ScenarioError> {
        let transition = match step {
            Step::OpenPane { path, mode } => {
                self.host.open_pane(path.as_deref(), mode)?;
                Some(self.activate())
            }
            Step::Split => {
                if self.host.split_active()?.is_none() {
                    return Err(invalid(index, "split needs a focused pane"));
                }
                Some(self.activate())
            }
            Step::Focus { pane } => {
                if !self.host.focus(*pane) {
                    return Err(invalid(index, format!("unknown {pane}")));
                }
                Some(self.activate())
            }
            Step::Close { pane } => {
                if !self.host.close_pane(*pane) {
                    return Err(invalid(index, format!("unknown {pane}")));
                }
                self.control.on_pane_closed(*pane);
                None
            }
            Step::Open { path } => {
                if !self.host.open_document(path) {
                    return Err(invalid(index, "open needs a focused pane"));
                }
                Some(self.activate())
            }
            Step::SetMode { pane, mode } => {
                let pane = self.resolve(index, *pane)?;
                self.host.set_mode(pane, mode);
                None
            }
            Step::SetViewKind { pane, kind } => {
                let pane = self.resolve(index, *pane)?;
                self.host.set_view_kind(pane, kind);
                None
            }
            Step::AddRule { kind, value } => {
                let edit = rule_edit(index, *kind, value, true)?;
                self.control.rules_mut().apply(edit)?;
                None
            }
            Step::RemoveRule { kind, value } => {
                let edit = rule_edit(index, *kind, value, false)?;
                self.control.rules_mut().apply(edit)?;
                None
            }
            Step::SetDefaultMode { mode } => {
                self.control.rules_mut().set_default_mode(*mode)?;
                None
            }
            Step::ToggleActiveFile => self
                .control
                .run_command(Command::ToggleActiveFile, &mut self.host)?,
            Step::Activate => Some(self.activate()),
            Step::Expect {
                pane,
                mode,
                locked,
                remembered,
                toggles,
            } => {
                let pane = self.resolve(index, *pane)?;
                self.check(index, pane, mode.as_deref(), *locked, *remembered, *toggles)?;
                None
            }
        };
        let outcome = StepOutcome {
            index,
            description: step.to_string(),
            transition,
        };
        debug!(step = index, transition = ?transition, "scenario step applied");
        Ok(outcome)
    }

    fn activate(&mut self) -> Transition {
        self.control.on_activate(&mut self.host)
    }

    fn resolve(&self, index: usize, pane: Option<PaneId>) -> Result<PaneId, ScenarioError> {
        let pane = pane
            .or(self.host.active())
            .ok_or_else(|| invalid(index, "no pane given and none focused"))?;
        if self.host.pane(pane).is_none() {
            return Err(invalid(index, format!("unknown {pane}")));
        }
        Ok(pane)
    }

    fn check(
        &self,
        index: usize,
        pane: PaneId,
        mode: Option<&str>,
        locked: Option<bool>,
        remembered: Option<Mode>,
        toggles: Option<u32>,
    ) -> Result<(), ScenarioError> {
        let mut failures = Vec::new();
        let state = self.control.panes().state(pane);

        if let Some(expected) = mode {
            let actual = self.host.mode(pane);
            if actual != Some(expected) {
                failures.push(format!("mode: expected {expected}, got {actual:?}"));
            }
        }
        if let Some(expected) = locked {
            let actual = state.is_some_and(|s| s.is_locked());
            if actual != expected {
                failures.push(format!("locked: expected {expected}, got {actual}"));
            }
        }
        if let Some(expected) = remembered {
            let actual = state.and_then(|s| s.remembered());
            if actual != Some(expected) {
                failures.push(format!("remembered: expected {expected}, got {actual:?}"));
            }
        }
        if let Some(expected) = toggles {
            let actual = self.host.toggles(pane);
            if actual != expected {
                failures.push(format!("toggles: expected {expected}, got {actual}"));
            }
        }

        if failures.is_empty() {
            info!(step = index, %pane, "expectation met");
            Ok(())
        } else {
            Err(ScenarioError::ExpectationFailed {
                step: index,
                detail: format!("{pane}: {}", failures.join("; ")),
            })
        }
    }
}

fn invalid(step: usize, reason: impl Into<String>) -> ScenarioError {
    ScenarioError::InvalidStep {
        step,
        reason: reason.into(),
    }
}

fn rule_edit(step: usize, kind: RuleKind, value: &str, add: bool) -> Result<RuleEdit, ScenarioError> {
    let value = value.to_owned();
    let edit = match (kind, add) {
        (RuleKind::File, true) => RuleEdit::AddFile(value),
        (RuleKind::File, false) => RuleEdit::RemoveFile(value),
        (RuleKind::Folder, true) => RuleEdit::AddFolder(value),
        (RuleKind::Folder, false) => RuleEdit::RemoveFolder(value),
        (RuleKind::Rule, true) => RuleEdit::AddIncludeRule(value),
        (RuleKind::Rule, false) => RuleEdit::RemoveIncludeRule(value),
        (RuleKind::BlackRule, true) => RuleEdit::AddExcludeRule(value),
        (RuleKind::BlackRule, false) => RuleEdit::RemoveExcludeRule(value),
        (RuleKind::InitState, _) => {
            return Err(invalid(step, "use set_default_mode for the default mode"));
        }
    };
    Ok(edit)
}

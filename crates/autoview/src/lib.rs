#![forbid(unsafe_code)]

//! autoview public facade crate.
//!
//! Re-exports the types a host integration needs and offers a prelude plus
//! a one-call constructor for a configured [`ControlLoop`].
//!
//! ```rust,ignore
//! use autoview::prelude::*;
//!
//! let config = AutoviewConfig::from_toml_file("autoview.toml")?;
//! autoview::init_logging(&config)?;
//! let mut control = autoview::control_loop(config)?;
//! // on every active-pane-changed event:
//! control.on_activate(&mut host);
//! ```

use thiserror::Error;

// --- Core re-exports -------------------------------------------------------

pub use autoview_core::{
    Classification, EntryKind, MatchReason, Mode, ModeProbe, ParseModeError, RuleEdit, RuleKind,
    RuleOperation, RuleSet, RuleSetSnapshot, SettingsEvent, Verdict,
};

// --- Backend re-exports ----------------------------------------------------

pub use autoview_backend::{Host, HostEditor, HostWorkspace, PaneId, PaneIdError};

// --- Runtime re-exports ----------------------------------------------------

pub use autoview_runtime::{
    AutoviewConfig, Command, ConfigError, ControlLoop, FileStorage, ForceOutcome, LoggingConfig,
    MemoryStorage, ModeAdapter, PaneState, PaneStateStore, RuleStore, RulesConfig, SettingsBus,
    SettingsSubscription, StorageBackend, StorageConfig, StorageError, SubscriptionId, Transition,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for autoview integrations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[cfg(feature = "logging")]
    #[error(transparent)]
    Logging(#[from] autoview_runtime::LoggingError),
}

/// Standard result type for autoview APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Entry points ----------------------------------------------------------

/// Validate `config` and build a control loop over the configured storage.
pub fn control_loop(config: AutoviewConfig) -> Result<ControlLoop> {
    let config = config.validated()?;
    Ok(ControlLoop::new(config.open_rule_store()))
}

/// Install the global log subscriber described by `config.logging`.
#[cfg(feature = "logging")]
pub fn init_logging(config: &AutoviewConfig) -> Result<()> {
    autoview_runtime::logging::init(&config.logging)?;
    Ok(())
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AutoviewConfig, Command, ControlLoop, Error, Host, HostEditor, HostWorkspace, Mode,
        PaneId, Result, RuleStore, SettingsEvent, Transition, Verdict,
    };

    pub use crate::{backend, core, runtime};
}

pub use autoview_backend as backend;
pub use autoview_core as core;
pub use autoview_runtime as runtime;

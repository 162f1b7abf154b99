#![forbid(unsafe_code)]

//! Activation control loop for autoview.
//!
//! A host forwards each active-pane-changed event to
//! [`ControlLoop::on_activate`]. The loop classifies the active document with
//! the [`RuleStore`], keeps per-pane memory in the [`PaneStateStore`], and
//! flips the editor through the [`ModeAdapter`] when the pane enters or
//! leaves a managed path.
//!
//! Rule edits go through [`RuleStore`], which persists them via a
//! [`StorageBackend`] and announces them on the [`SettingsBus`].

pub mod command;
pub mod config;
pub mod control_loop;
#[cfg(feature = "logging")]
pub mod logging;
pub mod mode_adapter;
pub mod pane_state;
pub mod rule_store;
pub mod settings_bus;
pub mod storage;

#[cfg(test)]
mod test_host;

pub use command::Command;
pub use config::{AutoviewConfig, ConfigError, LoggingConfig, RulesConfig, StorageConfig};
pub use control_loop::{ControlLoop, Transition};
#[cfg(feature = "logging")]
pub use logging::LoggingError;
pub use mode_adapter::{ForceOutcome, ModeAdapter, read_mode};
pub use pane_state::{PaneState, PaneStateStore};
pub use rule_store::RuleStore;
pub use settings_bus::{SettingsBus, SettingsSubscription, SubscriptionId};
pub use storage::{FileStorage, MemoryStorage, StorageBackend, StorageError, StorageResult};

//! Startup configuration loaded from TOML or JSON.
//!
//! ```toml
//! # autoview.toml
//! [storage]
//! path = "autoview-rules.json"
//!
//! [logging]
//! filter = "autoview_runtime=debug,info"
//! json = false
//!
//! [rules]
//! default_mode = "preview"
//! ```
//!
//! Every field has a default, so an empty document yields
//! [`AutoviewConfig::default`]: no persistence, `info` logging, source mode.

use std::path::{Path, PathBuf};

use autoview_core::Mode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rule_store::RuleStore;
use crate::storage::{FileStorage, MemoryStorage, StorageBackend};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoviewConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub rules: RulesConfig,
}

/// Where the rule set is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file for the rule set. `None` keeps rules in memory only.
    pub path: Option<PathBuf>,
}

/// Subscriber settings for [`crate::logging::init`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `AUTOVIEW_LOG` overrides this.
    pub filter: String,
    /// Emit JSON lines instead of the human-readable format.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            json: false,
        }
    }
}

/// Initial rule settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Default mode when no persisted rule set carries one.
    pub default_mode: Mode,
}

/// Errors that can occur when loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl AutoviewConfig {
    /// Parse from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Check for invalid settings. Returns every problem found; empty means
    /// valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.logging.filter.trim().is_empty() {
            errors.push("logging.filter must not be empty".to_owned());
        }
        if self
            .storage
            .path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            errors.push("storage.path must not be empty when set".to_owned());
        }
        errors
    }

    /// [`Self::validate`] as a `Result`.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Storage backend described by `[storage]`.
    #[must_use]
    pub fn open_storage(&self) -> Box<dyn StorageBackend> {
        match &self.storage.path {
            Some(path) => Box::new(FileStorage::new(path)),
            None => Box::new(MemoryStorage::new()),
        }
    }

    /// Rule store loaded from the configured storage.
    #[must_use]
    pub fn open_rule_store(&self) -> RuleStore {
        RuleStore::load(self.open_storage(), self.rules.default_mode)
    }
}

//! Global `tracing` subscriber installation.
//!
//! Libraries in this workspace only emit through `tracing` macros; a host
//! binary calls [`init`] once at startup. The `AUTOVIEW_LOG` environment
//! variable, when set and non-empty, replaces [`LoggingConfig::filter`].

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Environment variable overriding the configured filter directives.
pub const LOG_ENV_VAR: &str = "AUTOVIEW_LOG";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter {directives:?}: {source}")]
    Filter {
        directives: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInstalled(String),
}

/// Directives in effect: a non-empty override wins over the configured value.
#[must_use]
pub fn effective_directives<'a>(env_override: Option<&'a str>, configured: &'a str) -> &'a str {
    match env_override.map(str::trim) {
        Some(directives) if !directives.is_empty() => directives,
        _ => configured,
    }
}

/// Parse filter directives into an [`EnvFilter`].
pub fn build_filter(directives: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directives).map_err(|source| LoggingError::Filter {
        directives: directives.to_owned(),
        source,
    })
}

/// Install the global fmt subscriber described by `config`.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let env_override = std::env::var(LOG_ENV_VAR).ok();
    let directives = effective_directives(env_override.as_deref(), &config.filter);
    let filter = build_filter(directives)?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| LoggingError::AlreadyInstalled(e.to_string()))?;
    tracing::debug!(directives, json = config.json, "logging initialised");
    Ok(())
}

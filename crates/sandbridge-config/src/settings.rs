//! Runtime settings for the bridge, sourced from the environment.

use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::defaults::{
    CONTEXT_ISOLATION_VAR, LOG_FILTER_VAR, LOG_FORMAT_VAR, default_context_isolation,
    default_log_filter, default_log_format,
};
use crate::logging::{LogFormat, LogFormatParseError};

/// Errors raised when an environment override holds an unusable value.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The log format override was not a recognised format.
    #[error("{var} must be 'json' or 'compact', got '{value}'")]
    LogFormat {
        /// Variable that carried the value.
        var: &'static str,
        /// Rejected value.
        value: String,
        /// Underlying parse failure.
        #[source]
        source: LogFormatParseError,
    },

    /// The context isolation override was not a boolean.
    #[error("{var} must be a boolean (true/false/1/0), got '{value}'")]
    ContextIsolation {
        /// Variable that carried the value.
        var: &'static str,
        /// Rejected value.
        value: String,
    },
}

/// Bridge settings resolved once at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSettings {
    log_filter: String,
    log_format: LogFormat,
    context_isolation: bool,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter().to_owned(),
            log_format: default_log_format(),
            context_isolation: default_context_isolation(),
        }
    }
}

impl BridgeSettings {
    /// Reads overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] when an override is present but invalid.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads overrides through `lookup`, which maps a variable name to its
    /// value when set.
    ///
    /// Unset variables keep their defaults; empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] when an override is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut settings = Self::default();

        if let Some(filter) = fetch(LOG_FILTER_VAR) {
            settings.log_filter = filter;
        }

        if let Some(value) = fetch(LOG_FORMAT_VAR) {
            settings.log_format =
                LogFormat::from_str(value.trim()).map_err(|source| SettingsError::LogFormat {
                    var: LOG_FORMAT_VAR,
                    value: value.clone(),
                    source,
                })?;
        }

        if let Some(value) = fetch(CONTEXT_ISOLATION_VAR) {
            settings.context_isolation =
                parse_flag(&value).ok_or_else(|| SettingsError::ContextIsolation {
                    var: CONTEXT_ISOLATION_VAR,
                    value: value.clone(),
                })?;
        }

        Ok(settings)
    }

    /// Returns a copy with context isolation forced to `enabled`.
    #[must_use]
    pub const fn with_context_isolation(mut self, enabled: bool) -> Self {
        self.context_isolation = enabled;
        self
    }

    /// Tracing filter expression.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Output format for telemetry.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Whether the surface must be published through the isolation bridge.
    #[must_use]
    pub const fn context_isolation(&self) -> bool {
        self.context_isolation
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

//! Startup and runtime configuration for the sandbridge preload bridge.
//!
//! Two sources feed the bridge before any sandboxed code runs:
//!
//! - [`StartupArgs`] carries the one-time window configuration channel taken
//!   from the renderer's argument list. Its absence is a boot error.
//! - [`BridgeSettings`] carries telemetry and publication settings taken from
//!   `SANDBRIDGE_*` environment variables.
//!
//! The protocol constants both sides agree on (channel namespace, fixed
//! channel names, the global entry point) live in [`defaults`].

pub mod defaults;
mod logging;
mod settings;
mod startup;

pub use defaults::{
    CHANNEL_PREFIX, CWD_OVERRIDE_VAR, GLOBAL_ENTRY_POINT, NEUTRAL_ZOOM_LEVEL, SHELL_ENV_CHANNEL,
    WINDOW_CONFIG_ARG, default_log_filter, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use settings::{BridgeSettings, SettingsError};
pub use startup::{StartupArgs, StartupError};

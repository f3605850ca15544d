//! Protocol constants shared by the bridge and its host.

/// Reserved namespace every bridged channel name must start with.
pub const CHANNEL_PREFIX: &str = "vscode:";

/// Startup switch carrying the one-time window configuration channel.
pub const WINDOW_CONFIG_ARG: &str = "vscode-window-config";

/// Fixed controller channel answering with the resolved OS shell environment.
pub const SHELL_ENV_CHANNEL: &str = "vscode:fetchShellEnv";

/// Environment variable that short-circuits working directory derivation.
pub const CWD_OVERRIDE_VAR: &str = "VSCODE_CWD";

/// Name of the single global entry point the surface is published under.
pub const GLOBAL_ENTRY_POINT: &str = "vscode";

/// Zoom level applied when the window configuration omits one.
pub const NEUTRAL_ZOOM_LEVEL: f64 = 0.0;

/// Default log filter expression for bridge telemetry.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Environment variable overriding the log filter.
pub const LOG_FILTER_VAR: &str = "SANDBRIDGE_LOG";

/// Environment variable overriding the log format.
pub const LOG_FORMAT_VAR: &str = "SANDBRIDGE_LOG_FORMAT";

/// Environment variable toggling context isolation.
pub const CONTEXT_ISOLATION_VAR: &str = "SANDBRIDGE_CONTEXT_ISOLATION";

/// Default log filter expression used by the bridge.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the bridge.
#[must_use]
pub const fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

/// Context isolation is on unless the host explicitly turns it off.
#[must_use]
pub const fn default_context_isolation() -> bool {
    true
}

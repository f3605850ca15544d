//! Domain errors raised by the bridge.
//!
//! [`BridgeError`] is `Clone` because one-shot tasks cache their outcome and
//! replay it to every awaiter. Host failures are therefore carried as owned
//! [`HostError`] values rather than boxed trait objects.

use thiserror::Error;

use sandbridge_config::StartupError;

/// Failure reported by the host runtime or the controller behind it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HostError {
    message: String,
}

impl HostError {
    /// Wraps a host-supplied failure description.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the host-supplied description.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Which one-shot resolution a controller failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The initial window configuration fetch.
    WindowConfiguration,
    /// The OS shell environment fetch.
    ShellEnvironment,
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WindowConfiguration => f.write_str("window configuration"),
            Self::ShellEnvironment => f.write_str("shell environment"),
        }
    }
}

/// Errors raised by bridge operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// A channel name fell outside the reserved namespace.
    #[error("unsupported IPC channel '{channel}'")]
    UnsupportedChannel {
        /// Offending channel name, verbatim.
        channel: String,
    },

    /// A required startup argument was missing.
    #[error("bridge cannot boot: {0}")]
    Startup(#[from] StartupError),

    /// The controller rejected a resolution request.
    #[error("unable to fetch {resolution}: {source}")]
    Resolution {
        /// Resolution that failed.
        resolution: Resolution,
        /// Rejection reported by the controller.
        #[source]
        source: HostError,
    },

    /// The controller answered with a payload of the wrong shape.
    #[error("malformed {resolution} payload: {message}")]
    MalformedPayload {
        /// Resolution whose payload was rejected.
        resolution: Resolution,
        /// Decoder diagnostic.
        message: String,
    },

    /// A request passed validation but the transport rejected it.
    #[error("IPC invoke on '{channel}' failed: {source}")]
    Invoke {
        /// Channel the request was sent on.
        channel: String,
        /// Rejection reported by the host.
        #[source]
        source: HostError,
    },

    /// Publishing the capability surface into the sandboxed context failed.
    #[error("failed to publish '{entry_point}' into the sandboxed context: {source}")]
    Publication {
        /// Global name the surface was meant to appear under.
        entry_point: String,
        /// Failure reported by the isolation mechanism.
        #[source]
        source: HostError,
    },

    /// The local executor refused a background task.
    #[error("failed to start background {resolution} task: {message}")]
    Spawn {
        /// Task that could not be started.
        resolution: Resolution,
        /// Executor diagnostic.
        message: String,
    },
}

impl BridgeError {
    /// Returns true for namespace validation failures.
    #[must_use]
    pub const fn is_unsupported_channel(&self) -> bool {
        matches!(self, Self::UnsupportedChannel { .. })
    }
}

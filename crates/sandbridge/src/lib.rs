//! Preload bridge between a sandboxed renderer and its privileged controller.
//!
//! The `sandbridge` crate runs inside a capability-restricted context and
//! publishes a small, validated [`CapabilitySurface`] to untrusted
//! application code. The surface is the only route from that code to the
//! controller process:
//!
//! - Every message channel must live in the `vscode:` namespace; see
//!   [`validate_channel`].
//! - The window configuration is fetched exactly once at load and its side
//!   effects (environment merge, zoom level) are applied before anyone can
//!   observe it.
//! - The shell environment is merged once from three sources.
//! - Message ports cross the isolation boundary only through a
//!   nonce-authenticated handoff.
//!
//! All bridge logic runs on one cooperative thread. Background work is
//! handed to a [`futures::task::LocalSpawn`] executor supplied by the host;
//! host capabilities are injected through the traits in [`host`].
//!
//! ```rust,ignore
//! let loaded = sandbridge::load_bridge(
//!     StartupArgs::parse(std::env::args()),
//!     &BridgeSettings::from_env()?,
//!     &host_services,
//!     Publishers { bridge: &context_bridge, scope: &global_scope },
//!     &spawner,
//!     &(Rc::new(StructuredLifecycleReporter::new()) as Rc<dyn LifecycleReporter>),
//! )?;
//! assert!(loaded.installation().is_published());
//! ```

mod channel;
mod configuration;
mod environment;
mod error;
pub mod host;
mod install;
mod loader;
mod port;
mod reporter;
mod shell_env;
pub mod surface;
mod task;
pub mod telemetry;

pub use channel::{ChannelName, validate_channel};
pub use configuration::{ConfigurationResolver, ConfigurationTask, WindowConfiguration};
pub use environment::LiveEnvironment;
pub use error::{BridgeError, HostError, Resolution};
pub use install::{Installation, PublishStrategy, install};
pub use loader::{LoadedBridge, Publishers, load_bridge};
pub use port::PortHandoff;
pub use reporter::{LifecycleReporter, StructuredLifecycleReporter};
pub use shell_env::{ShellEnvResolver, ShellEnvTask, merge_environments};
pub use surface::CapabilitySurface;
pub use task::OneShot;

#[cfg(test)]
mod tests;

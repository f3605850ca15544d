//! Interfaces the embedding runtime provides to the bridge.
//!
//! Everything privileged sits behind one of these traits: the IPC transport
//! to the controller, the renderer's web frame, file path resolution, process
//! metadata, window message delivery and the two publication mechanisms. The
//! bridge holds them as `Rc<dyn Trait>` because all bridge logic runs on one
//! cooperative thread.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::environment::LiveEnvironment;
use crate::error::HostError;
use crate::surface::CapabilitySurface;

/// String to string environment mapping.
pub type EnvMap = BTreeMap<String, String>;

/// Future returned by asynchronous host operations.
pub type HostFuture<T> = LocalBoxFuture<'static, Result<T, HostError>>;

/// Callback registered for messages on an IPC channel.
///
/// Listener identity is pointer identity: [`IpcTransport::remove_listener`]
/// removes the registration made with the same `Rc`.
pub type Listener = Rc<dyn Fn(&IpcEvent, &[Value])>;

/// Callback registered for host process lifecycle events.
pub type ProcessCallback = Rc<dyn Fn(&[Value])>;

/// Opaque handle to a transferable message port owned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessagePort {
    id: u64,
}

impl MessagePort {
    /// Wraps a host-assigned port identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self { id }
    }

    /// Host-assigned identifier.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }
}

/// Opaque handle to a file object living inside the sandboxed context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileHandle {
    id: u64,
}

impl FileHandle {
    /// Wraps a host-assigned file identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self { id }
    }

    /// Host-assigned identifier.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }
}

/// Metadata accompanying a message delivered on an IPC channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpcEvent {
    ports: Vec<MessagePort>,
}

impl IpcEvent {
    /// An event carrying no transferable ports.
    #[must_use]
    pub const fn new() -> Self {
        Self { ports: Vec::new() }
    }

    /// An event carrying the given ports.
    #[must_use]
    pub const fn with_ports(ports: Vec<MessagePort>) -> Self {
        Self { ports }
    }

    /// Transferable ports attached to the message.
    #[must_use]
    pub fn ports(&self) -> &[MessagePort] {
        &self.ports
    }
}

/// Memory usage of the sandboxed process, in kilobytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryInfo {
    /// Memory not shared with other processes.
    pub private: u64,
    /// Resident set size.
    pub resident_set: u64,
    /// Memory shared with other processes.
    pub shared: u64,
}

/// Message transport to the controller process.
pub trait IpcTransport {
    /// Sends a one-way message.
    fn send(&self, channel: &str, args: &[Value]);

    /// Sends a request and resolves with the controller's single reply.
    fn invoke(&self, channel: &str, args: &[Value]) -> HostFuture<Value>;

    /// Registers `listener` for every message on `channel`.
    fn on(&self, channel: &str, listener: Listener);

    /// Registers `listener` for the next message on `channel` only.
    fn once(&self, channel: &str, listener: Listener);

    /// Removes a registration made with the same `Rc`.
    fn remove_listener(&self, channel: &str, listener: &Listener);
}

/// Rendering frame of the sandboxed window.
pub trait WebFrame {
    /// Applies a zoom level; `0.0` is the neutral level.
    fn set_zoom_level(&self, level: f64);
}

/// File helpers provided by the host.
pub trait WebUtils {
    /// Absolute host filesystem path backing `file`.
    fn path_for_file(&self, file: &FileHandle) -> String;
}

/// Read-only process metadata and lifecycle hooks.
pub trait ProcessHost {
    /// Operating system identifier such as `linux`, `darwin` or `win32`.
    fn platform(&self) -> String;

    /// CPU architecture identifier.
    fn arch(&self) -> String;

    /// Component versions keyed by component name.
    fn versions(&self) -> BTreeMap<String, String>;

    /// Absolute path of the running executable.
    fn exec_path(&self) -> String;

    /// Current memory usage.
    fn memory_info(&self) -> HostFuture<MemoryInfo>;

    /// Registers `callback` for a lifecycle event such as `loaded`.
    fn on(&self, event_type: &str, callback: ProcessCallback);
}

/// Message delivery into the sandboxed context's own window.
pub trait WindowMessenger {
    /// Posts `message` to the window, transferring `ports` with it.
    fn post_message(&self, message: Value, target_origin: &str, ports: Vec<MessagePort>);
}

/// One-way publication bridge used when context isolation is active.
pub trait ContextBridge {
    /// Exposes `surface` under `key` in the isolated main world.
    ///
    /// # Errors
    ///
    /// Returns a [`HostError`] when the isolation mechanism refuses the
    /// value.
    fn expose_in_main_world(
        &self,
        key: &str,
        surface: Rc<CapabilitySurface>,
    ) -> Result<(), HostError>;
}

/// Shared global namespace used when context isolation is off.
pub trait GlobalScope {
    /// Binds `surface` to the global `key`.
    fn bind(&self, key: &str, surface: Rc<CapabilitySurface>);
}

/// Host collaborators the bridge closes over.
#[derive(Clone)]
pub struct HostServices {
    /// Controller transport.
    pub ipc: Rc<dyn IpcTransport>,
    /// Rendering frame.
    pub web_frame: Rc<dyn WebFrame>,
    /// File path helpers.
    pub web_utils: Rc<dyn WebUtils>,
    /// Process metadata.
    pub process: Rc<dyn ProcessHost>,
    /// Window message delivery.
    pub messenger: Rc<dyn WindowMessenger>,
    /// Live environment of the sandboxed process.
    pub environment: LiveEnvironment,
}

impl fmt::Debug for HostServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostServices")
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

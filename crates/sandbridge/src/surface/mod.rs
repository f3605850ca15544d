//! The capability surface published into the sandboxed context.
//!
//! The surface is built once and never changes afterwards: fields are
//! private, there are no setters, and it is shared through `Rc`. Every
//! capability is reached through an explicit method call. Nothing is exposed
//! as a property whose read has side effects, because isolation mechanisms
//! may read properties on their own (for example while serialising the
//! object for diagnostics).

mod ipc;
mod process;

use std::fmt;
use std::rc::Rc;

use futures::future::{LocalBoxFuture, Shared};
use serde_json::Value;

pub use self::ipc::{IpcMessagePortApi, IpcRendererApi};
pub use self::process::{PROCESS_TYPE, ProcessApi};

use crate::configuration::{ConfigurationTask, WindowConfiguration};
use crate::error::BridgeError;
use crate::host::{FileHandle, HostServices, WebFrame, WebUtils};
use crate::port::PortHandoff;
use crate::shell_env::ShellEnvTask;

/// Window chrome control.
pub struct WebFrameApi {
    frame: Rc<dyn WebFrame>,
}

impl WebFrameApi {
    /// Applies `level` when it is a finite number; anything else is ignored.
    ///
    /// `NaN` and the infinities count as non-numeric: they have no JSON
    /// representation and convert to `null`.
    ///
    /// ```ignore
    /// surface.web_frame().set_zoom_level(2);      // applied
    /// surface.web_frame().set_zoom_level("2");    // ignored
    /// surface.web_frame().set_zoom_level(serde_json::Value::Null); // ignored
    /// surface.web_frame().set_zoom_level(f64::NAN);  // ignored
    /// ```
    pub fn set_zoom_level(&self, level: impl Into<Value>) {
        if let Some(zoom) = level.into().as_f64() {
            self.frame.set_zoom_level(zoom);
        }
    }
}

/// File path resolution.
pub struct WebUtilsApi {
    utils: Rc<dyn WebUtils>,
}

impl WebUtilsApi {
    /// Absolute host path backing `file`.
    #[must_use]
    pub fn path_for_file(&self, file: &FileHandle) -> String {
        self.utils.path_for_file(file)
    }
}

/// Access to the window configuration.
pub struct ContextApi {
    configuration: ConfigurationTask,
}

impl ContextApi {
    /// The resolved configuration, or `None` while resolution is still in
    /// flight. `None` means "not ready yet", not failure.
    #[must_use]
    pub fn configuration(&self) -> Option<Rc<WindowConfiguration>> {
        self.configuration.peek_ok()
    }

    /// Future resolving to the configuration once it is available.
    pub fn resolve_configuration(
        &self,
    ) -> Shared<LocalBoxFuture<'static, Result<Rc<WindowConfiguration>, BridgeError>>> {
        self.configuration.result()
    }
}

/// Every operation the sandboxed application may reach.
pub struct CapabilitySurface {
    ipc_renderer: IpcRendererApi,
    ipc_message_port: IpcMessagePortApi,
    web_frame: WebFrameApi,
    web_utils: WebUtilsApi,
    process: ProcessApi,
    context: ContextApi,
}

impl CapabilitySurface {
    /// Assembles the surface over `host` and the two background tasks.
    #[must_use]
    pub fn build(
        host: &HostServices,
        configuration: ConfigurationTask,
        shell_env: ShellEnvTask,
    ) -> Rc<Self> {
        Rc::new(Self {
            ipc_renderer: IpcRendererApi::new(Rc::clone(&host.ipc)),
            ipc_message_port: IpcMessagePortApi::new(PortHandoff::new(
                Rc::clone(&host.ipc),
                Rc::clone(&host.messenger),
            )),
            web_frame: WebFrameApi {
                frame: Rc::clone(&host.web_frame),
            },
            web_utils: WebUtilsApi {
                utils: Rc::clone(&host.web_utils),
            },
            process: ProcessApi::new(
                Rc::clone(&host.process),
                host.environment.clone(),
                shell_env,
            ),
            context: ContextApi { configuration },
        })
    }

    /// Messaging.
    #[must_use]
    pub const fn ipc_renderer(&self) -> &IpcRendererApi {
        &self.ipc_renderer
    }

    /// Message port handoff.
    #[must_use]
    pub const fn ipc_message_port(&self) -> &IpcMessagePortApi {
        &self.ipc_message_port
    }

    /// Window chrome control.
    #[must_use]
    pub const fn web_frame(&self) -> &WebFrameApi {
        &self.web_frame
    }

    /// File path resolution.
    #[must_use]
    pub const fn web_utils(&self) -> &WebUtilsApi {
        &self.web_utils
    }

    /// Process metadata.
    #[must_use]
    pub const fn process(&self) -> &ProcessApi {
        &self.process
    }

    /// Window configuration access.
    #[must_use]
    pub const fn context(&self) -> &ContextApi {
        &self.context
    }
}

impl fmt::Debug for CapabilitySurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilitySurface")
            .field("configuration", &self.context.configuration)
            .finish_non_exhaustive()
    }
}

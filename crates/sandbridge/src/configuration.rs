//! One-shot resolution of the window configuration.
//!
//! The controller assigns each sandboxed window a one-time channel and
//! answers exactly one request on it with the window's configuration. The
//! resolver requests it once at load, applies its side effects (environment
//! merge, zoom level) before resolving, and caches the record for the life of
//! the context.

use std::rc::Rc;

use futures::task::LocalSpawn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use sandbridge_config::{NEUTRAL_ZOOM_LEVEL, StartupArgs, StartupError};

use crate::channel::validate_channel;
use crate::environment::LiveEnvironment;
use crate::error::{BridgeError, Resolution};
use crate::host::{EnvMap, IpcTransport, WebFrame};
use crate::task::OneShot;

/// Tracing target for configuration resolution.
const CONFIGURATION_TARGET: &str = "sandbridge::configuration";

/// Configuration record delivered once per sandboxed window.
///
/// Only the fields the bridge acts on are typed; everything else the
/// controller sends is preserved in [`WindowConfiguration::extra`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    zoom_level: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    user_env: EnvMap,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl WindowConfiguration {
    /// Builds a configuration with the two fields the bridge consumes.
    #[must_use]
    pub fn new(zoom_level: Option<f64>, user_env: EnvMap) -> Self {
        Self {
            zoom_level,
            user_env,
            extra: Map::new(),
        }
    }

    /// Decodes the controller's reply.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MalformedPayload`] when `value` is not an
    /// object of the expected shape.
    pub fn from_value(value: Value) -> Result<Self, BridgeError> {
        serde_json::from_value(value).map_err(|error| BridgeError::MalformedPayload {
            resolution: Resolution::WindowConfiguration,
            message: error.to_string(),
        })
    }

    /// Requested zoom level, if any.
    #[must_use]
    pub const fn zoom_level(&self) -> Option<f64> {
        self.zoom_level
    }

    /// Zoom level to apply: the requested one or the neutral level.
    #[must_use]
    pub fn effective_zoom_level(&self) -> f64 {
        self.zoom_level.unwrap_or(NEUTRAL_ZOOM_LEVEL)
    }

    /// Environment variables the user configured for this window.
    #[must_use]
    pub const fn user_env(&self) -> &EnvMap {
        &self.user_env
    }

    /// Fields the bridge passes through untouched.
    #[must_use]
    pub const fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// Reads an explicit `null` as an empty mapping.
fn null_as_empty<'de, D>(deserializer: D) -> Result<EnvMap, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<EnvMap>::deserialize(deserializer)?.unwrap_or_default())
}

/// Shared handle to the configuration task.
pub type ConfigurationTask = OneShot<Rc<WindowConfiguration>>;

/// Collaborators the configuration resolver touches.
#[derive(Clone)]
pub struct ConfigurationResolver {
    ipc: Rc<dyn IpcTransport>,
    web_frame: Rc<dyn WebFrame>,
    environment: LiveEnvironment,
}

impl ConfigurationResolver {
    /// Creates a resolver over the given host collaborators.
    #[must_use]
    pub fn new(
        ipc: Rc<dyn IpcTransport>,
        web_frame: Rc<dyn WebFrame>,
        environment: LiveEnvironment,
    ) -> Self {
        Self {
            ipc,
            web_frame,
            environment,
        }
    }

    /// Starts resolution as a background task on `spawner`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Spawn`] when the executor refuses the task.
    pub fn start<S>(
        self,
        startup: Result<StartupArgs, StartupError>,
        spawner: &S,
    ) -> Result<ConfigurationTask, BridgeError>
    where
        S: LocalSpawn + ?Sized,
    {
        OneShot::start(
            Resolution::WindowConfiguration,
            self.resolve(startup),
            spawner,
        )
    }

    /// Performs the single request/response round trip and applies the
    /// configuration's side effects.
    ///
    /// Startup failures surface here so that every awaiter of the task
    /// observes the same boot error.
    ///
    /// # Errors
    ///
    /// Returns the startup error, a channel validation error, the wrapped
    /// controller rejection, or a malformed payload error.
    pub async fn resolve(
        self,
        startup: Result<StartupArgs, StartupError>,
    ) -> Result<Rc<WindowConfiguration>, BridgeError> {
        let outcome = self.fetch(startup).await;
        if let Err(error) = &outcome {
            warn!(
                target: CONFIGURATION_TARGET,
                error = %error,
                "window configuration unavailable"
            );
        }
        outcome
    }

    async fn fetch(
        self,
        startup: Result<StartupArgs, StartupError>,
    ) -> Result<Rc<WindowConfiguration>, BridgeError> {
        let args = startup?;
        let channel = args.window_config_channel();
        validate_channel(channel)?;

        debug!(target: CONFIGURATION_TARGET, channel, "requesting window configuration");
        let reply = self
            .ipc
            .invoke(channel, &[])
            .await
            .map_err(|source| BridgeError::Resolution {
                resolution: Resolution::WindowConfiguration,
                source,
            })?;
        let configuration = WindowConfiguration::from_value(reply)?;

        self.environment.merge(configuration.user_env());
        let zoom = configuration.effective_zoom_level();
        self.web_frame.set_zoom_level(zoom);

        debug!(
            target: CONFIGURATION_TARGET,
            zoom,
            user_env = configuration.user_env().len(),
            "window configuration applied"
        );
        Ok(Rc::new(configuration))
    }
}

//! One-shot resolution of the merged shell environment.
//!
//! Three sources are merged, later ones winning on conflict: the process's
//! own environment, the OS shell environment resolved by the controller, and
//! the window configuration's `userEnv`.

use std::rc::Rc;

use futures::future::try_join;
use futures::task::LocalSpawn;
use serde_json::Value;
use tracing::{debug, warn};

use sandbridge_config::SHELL_ENV_CHANNEL;

use crate::channel::validate_channel;
use crate::configuration::ConfigurationTask;
use crate::environment::LiveEnvironment;
use crate::error::{BridgeError, Resolution};
use crate::host::{EnvMap, IpcTransport};
use crate::task::OneShot;

/// Tracing target for shell environment resolution.
const SHELL_ENV_TARGET: &str = "sandbridge::shell_env";

/// Shared handle to the shell environment task.
pub type ShellEnvTask = OneShot<EnvMap>;

/// Layers `shell` and then `user` over `base`.
#[must_use]
pub fn merge_environments(base: EnvMap, shell: EnvMap, user: EnvMap) -> EnvMap {
    let mut merged = base;
    merged.extend(shell);
    merged.extend(user);
    merged
}

/// Collaborators the shell environment resolver touches.
#[derive(Clone)]
pub struct ShellEnvResolver {
    ipc: Rc<dyn IpcTransport>,
    environment: LiveEnvironment,
    configuration: ConfigurationTask,
}

impl ShellEnvResolver {
    /// Creates a resolver that waits on `configuration` for `userEnv`.
    #[must_use]
    pub fn new(
        ipc: Rc<dyn IpcTransport>,
        environment: LiveEnvironment,
        configuration: ConfigurationTask,
    ) -> Self {
        Self {
            ipc,
            environment,
            configuration,
        }
    }

    /// Starts resolution as a background task on `spawner`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Spawn`] when the executor refuses the task.
    pub fn start<S>(self, spawner: &S) -> Result<ShellEnvTask, BridgeError>
    where
        S: LocalSpawn + ?Sized,
    {
        OneShot::start(Resolution::ShellEnvironment, self.resolve(), spawner)
    }

    /// Fetches the shell environment and the user environment concurrently
    /// and merges them over the process environment.
    ///
    /// # Errors
    ///
    /// A failed configuration task is propagated unchanged; a controller
    /// rejection of the shell fetch is wrapped as
    /// [`BridgeError::Resolution`].
    pub async fn resolve(self) -> Result<EnvMap, BridgeError> {
        let user_env = async {
            self.configuration
                .result()
                .await
                .map(|configuration| configuration.user_env().clone())
        };
        let shell_env = self.fetch_shell_env();

        match try_join(user_env, shell_env).await {
            Ok((user, shell)) => {
                let merged = merge_environments(self.environment.snapshot(), shell, user);
                debug!(
                    target: SHELL_ENV_TARGET,
                    vars = merged.len(),
                    "shell environment resolved"
                );
                Ok(merged)
            }
            Err(error) => {
                warn!(
                    target: SHELL_ENV_TARGET,
                    error = %error,
                    "shell environment unavailable"
                );
                Err(error)
            }
        }
    }

    async fn fetch_shell_env(&self) -> Result<EnvMap, BridgeError> {
        validate_channel(SHELL_ENV_CHANNEL)?;
        let reply = self
            .ipc
            .invoke(SHELL_ENV_CHANNEL, &[])
            .await
            .map_err(|source| BridgeError::Resolution {
                resolution: Resolution::ShellEnvironment,
                source,
            })?;
        decode_env(reply)
    }
}

fn decode_env(value: Value) -> Result<EnvMap, BridgeError> {
    serde_json::from_value(value).map_err(|error| BridgeError::MalformedPayload {
        resolution: Resolution::ShellEnvironment,
        message: error.to_string(),
    })
}

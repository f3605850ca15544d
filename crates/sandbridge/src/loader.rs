//! Load-time orchestration of the bridge.

use std::rc::Rc;

use futures::future::FutureExt;
use futures::task::{LocalSpawn, LocalSpawnExt};

use sandbridge_config::{BridgeSettings, StartupArgs, StartupError};

use crate::configuration::{ConfigurationResolver, ConfigurationTask};
use crate::error::{BridgeError, Resolution};
use crate::host::{ContextBridge, GlobalScope, HostServices};
use crate::install::{Installation, PublishStrategy, install};
use crate::reporter::LifecycleReporter;
use crate::shell_env::ShellEnvResolver;
use crate::surface::CapabilitySurface;

/// The two publication mechanisms the host offers.
#[derive(Clone, Copy)]
pub struct Publishers<'a> {
    /// Isolation bridge.
    pub bridge: &'a dyn ContextBridge,
    /// Shared global namespace.
    pub scope: &'a dyn GlobalScope,
}

/// A loaded bridge: the surface and where it ended up.
#[derive(Debug)]
pub struct LoadedBridge {
    surface: Rc<CapabilitySurface>,
    installation: Installation,
}

impl LoadedBridge {
    /// The surface that was built.
    #[must_use]
    pub const fn surface(&self) -> &Rc<CapabilitySurface> {
        &self.surface
    }

    /// How publication went.
    #[must_use]
    pub const fn installation(&self) -> &Installation {
        &self.installation
    }
}

/// Runs the load sequence.
///
/// The configuration task is started before anything is published, then
/// the shell environment task, then the surface is built and installed with
/// the strategy `settings` selects. Startup errors do not abort loading:
/// they become the permanent outcome of the configuration task.
///
/// # Errors
///
/// Returns [`BridgeError::Spawn`] when `spawner` refuses a background task.
/// Publication failures are reported through [`LoadedBridge::installation`]
/// instead.
pub fn load_bridge<S>(
    startup: Result<StartupArgs, StartupError>,
    settings: &BridgeSettings,
    host: &HostServices,
    publishers: Publishers<'_>,
    spawner: &S,
    reporter: &Rc<dyn LifecycleReporter>,
) -> Result<LoadedBridge, BridgeError>
where
    S: LocalSpawn + ?Sized,
{
    reporter.loading();

    let configuration = ConfigurationResolver::new(
        Rc::clone(&host.ipc),
        Rc::clone(&host.web_frame),
        host.environment.clone(),
    )
    .start(startup, spawner)?;
    observe_configuration(&configuration, Rc::clone(reporter), spawner)?;

    let shell_env = ShellEnvResolver::new(
        Rc::clone(&host.ipc),
        host.environment.clone(),
        configuration.clone(),
    )
    .start(spawner)?;

    let surface = CapabilitySurface::build(host, configuration, shell_env);
    let strategy = PublishStrategy::select(
        settings.context_isolation(),
        publishers.bridge,
        publishers.scope,
    );
    let installation = install(&surface, strategy, &**reporter);

    Ok(LoadedBridge {
        surface,
        installation,
    })
}

fn observe_configuration<S>(
    configuration: &ConfigurationTask,
    reporter: Rc<dyn LifecycleReporter>,
    spawner: &S,
) -> Result<(), BridgeError>
where
    S: LocalSpawn + ?Sized,
{
    let report = configuration.result().map(move |outcome| match outcome {
        Ok(resolved) => reporter.configuration_resolved(&resolved),
        Err(error) => reporter.configuration_failed(&error),
    });
    spawner
        .spawn_local(report)
        .map_err(|error| BridgeError::Spawn {
            resolution: Resolution::WindowConfiguration,
            message: error.to_string(),
        })
}

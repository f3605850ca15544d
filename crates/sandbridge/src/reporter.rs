//! Structured reporting for bridge lifecycle events.

use std::rc::Rc;

use crate::configuration::WindowConfiguration;
use crate::error::BridgeError;

/// Tracing target for lifecycle events.
const LIFECYCLE_TARGET: &str = "sandbridge::lifecycle";

/// Observer used to surface lifecycle events to telemetry sinks.
pub trait LifecycleReporter {
    /// Invoked before the background tasks are started.
    fn loading(&self);

    /// Invoked when the window configuration has been applied.
    fn configuration_resolved(&self, configuration: &WindowConfiguration);

    /// Invoked when the window configuration cannot be obtained.
    fn configuration_failed(&self, error: &BridgeError);

    /// Invoked after the surface reached the sandboxed context.
    fn published(&self, isolated: bool);

    /// Invoked when publication failed.
    fn publication_failed(&self, error: &BridgeError);
}

impl<T> LifecycleReporter for Rc<T>
where
    T: LifecycleReporter + ?Sized,
{
    fn loading(&self) {
        (**self).loading();
    }

    fn configuration_resolved(&self, configuration: &WindowConfiguration) {
        (**self).configuration_resolved(configuration);
    }

    fn configuration_failed(&self, error: &BridgeError) {
        (**self).configuration_failed(error);
    }

    fn published(&self, isolated: bool) {
        (**self).published(isolated);
    }

    fn publication_failed(&self, error: &BridgeError) {
        (**self).publication_failed(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredLifecycleReporter;

impl StructuredLifecycleReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LifecycleReporter for StructuredLifecycleReporter {
    fn loading(&self) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "loading",
            "loading sandbox bridge"
        );
    }

    fn configuration_resolved(&self, configuration: &WindowConfiguration) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "configuration_resolved",
            zoom_level = configuration.effective_zoom_level(),
            user_env = configuration.user_env().len(),
            "window configuration resolved"
        );
    }

    fn configuration_failed(&self, error: &BridgeError) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "configuration_failed",
            error = %error,
            "window configuration failed"
        );
    }

    fn published(&self, isolated: bool) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "published",
            isolated,
            "capability surface published"
        );
    }

    fn publication_failed(&self, error: &BridgeError) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "publication_failed",
            error = %error,
            "capability surface could not be published"
        );
    }
}

//! Publication of the capability surface into the sandboxed context.
//!
//! Two interchangeable strategies exist: the one-way isolation bridge, used
//! when context isolation is active, and a direct global binding otherwise.
//! [`install`] never fails outright. A refused publication is reported and
//! leaves the application without its bridge.

use std::rc::Rc;

use sandbridge_config::GLOBAL_ENTRY_POINT;

use crate::error::BridgeError;
use crate::host::{ContextBridge, GlobalScope};
use crate::reporter::LifecycleReporter;
use crate::surface::CapabilitySurface;

/// How the surface reaches the sandboxed context's global namespace.
#[derive(Clone, Copy)]
pub enum PublishStrategy<'a> {
    /// Publish through the isolation bridge.
    Isolated(&'a dyn ContextBridge),
    /// Bind directly in the shared global namespace.
    Direct(&'a dyn GlobalScope),
}

impl<'a> PublishStrategy<'a> {
    /// Picks the isolation bridge when `context_isolation` is set.
    #[must_use]
    pub fn select(
        context_isolation: bool,
        bridge: &'a dyn ContextBridge,
        scope: &'a dyn GlobalScope,
    ) -> Self {
        if context_isolation {
            Self::Isolated(bridge)
        } else {
            Self::Direct(scope)
        }
    }

    /// Whether this strategy goes through the isolation bridge.
    #[must_use]
    pub const fn is_isolated(&self) -> bool {
        matches!(self, Self::Isolated(_))
    }

    /// Publishes `surface` under the global entry point.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Publication`] when the isolation bridge
    /// refuses the surface. Direct binding cannot fail.
    pub fn publish(&self, surface: &Rc<CapabilitySurface>) -> Result<(), BridgeError> {
        match self {
            Self::Isolated(bridge) => bridge
                .expose_in_main_world(GLOBAL_ENTRY_POINT, Rc::clone(surface))
                .map_err(|source| BridgeError::Publication {
                    entry_point: GLOBAL_ENTRY_POINT.to_owned(),
                    source,
                }),
            Self::Direct(scope) => {
                scope.bind(GLOBAL_ENTRY_POINT, Rc::clone(surface));
                Ok(())
            }
        }
    }
}

/// Outcome of an installation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Installation {
    /// Published through the isolation bridge.
    Isolated,
    /// Bound directly as a global.
    Direct,
    /// Publication failed; the application has no bridge.
    Unavailable {
        /// Failure reported by the isolation mechanism.
        error: BridgeError,
    },
}

impl Installation {
    /// Whether the surface reached the sandboxed context.
    #[must_use]
    pub const fn is_published(&self) -> bool {
        !matches!(self, Self::Unavailable { .. })
    }
}

/// Publishes `surface` with `strategy`, catching and reporting failures.
pub fn install(
    surface: &Rc<CapabilitySurface>,
    strategy: PublishStrategy<'_>,
    reporter: &dyn LifecycleReporter,
) -> Installation {
    match strategy.publish(surface) {
        Ok(()) => {
            reporter.published(strategy.is_isolated());
            if strategy.is_isolated() {
                Installation::Isolated
            } else {
                Installation::Direct
            }
        }
        Err(error) => {
            reporter.publication_failed(&error);
            Installation::Unavailable { error }
        }
    }
}

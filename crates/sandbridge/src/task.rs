//! Memoised one-shot background tasks.
//!
//! A [`OneShot`] wraps a future that is polled to completion at most once.
//! The first outcome, success or failure, is cached and replayed to every
//! current and future awaiter. Tasks are started eagerly on a local
//! spawner so they finish even when nobody is waiting on them.

use std::fmt;
use std::future::Future;

use futures::future::{FutureExt, LocalBoxFuture, Shared};
use futures::task::{LocalSpawn, LocalSpawnExt};

use crate::error::{BridgeError, Resolution};

type Outcome<T> = Result<T, BridgeError>;

/// Cached, shareable result of a background task.
pub struct OneShot<T: Clone + 'static> {
    inner: Shared<LocalBoxFuture<'static, Outcome<T>>>,
}

impl<T: Clone + 'static> OneShot<T> {
    /// Wraps `future` without starting it.
    ///
    /// The future is first polled when someone awaits [`OneShot::result`].
    pub fn lazy<F>(future: F) -> Self
    where
        F: Future<Output = Outcome<T>> + 'static,
    {
        Self {
            inner: future.boxed_local().shared(),
        }
    }

    /// Wraps `future`, polls it once, and hands a driver to `spawner` so it
    /// runs to completion without an awaiter.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Spawn`] when the executor refuses the task.
    pub fn start<F, S>(resolution: Resolution, future: F, spawner: &S) -> Result<Self, BridgeError>
    where
        F: Future<Output = Outcome<T>> + 'static,
        S: LocalSpawn + ?Sized,
    {
        let task = Self::lazy(future);
        // The first poll happens here so requests leave before `start`
        // returns; the spawned driver finishes whatever is left.
        if task.inner.clone().now_or_never().is_none() {
            spawner
                .spawn_local(task.inner.clone().map(drop))
                .map_err(|error| BridgeError::Spawn {
                    resolution,
                    message: error.to_string(),
                })?;
        }
        Ok(task)
    }

    /// A task that is already complete with `outcome`.
    pub fn ready(outcome: Outcome<T>) -> Self {
        Self::lazy(futures::future::ready(outcome))
    }

    /// Future resolving to the cached outcome.
    ///
    /// Every call returns a handle onto the same underlying computation.
    pub fn result(&self) -> Shared<LocalBoxFuture<'static, Outcome<T>>> {
        self.inner.clone()
    }

    /// The outcome if the task has already completed.
    #[must_use]
    pub fn peek(&self) -> Option<&Outcome<T>> {
        self.inner.peek()
    }

    /// The successful value if the task has already completed successfully.
    #[must_use]
    pub fn peek_ok(&self) -> Option<T> {
        self.peek().and_then(|outcome| outcome.as_ref().ok()).cloned()
    }
}

impl<T: Clone + 'static> Clone for OneShot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> fmt::Debug for OneShot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.peek() {
            None => "pending",
            Some(Ok(_)) => "resolved",
            Some(Err(_)) => "failed",
        };
        f.debug_struct("OneShot").field("state", &state).finish()
    }
}

//! Namespace-gated messaging exposed to the sandboxed application.

use std::rc::Rc;

use futures::future::{self, FutureExt, LocalBoxFuture};
use serde_json::Value;

use crate::channel::validate_channel;
use crate::error::BridgeError;
use crate::host::{IpcTransport, Listener};
use crate::port::PortHandoff;

/// Messaging operations. Every method validates its channel before the
/// transport sees it.
pub struct IpcRendererApi {
    ipc: Rc<dyn IpcTransport>,
}

impl IpcRendererApi {
    pub(crate) fn new(ipc: Rc<dyn IpcTransport>) -> Self {
        Self { ipc }
    }

    /// Sends a one-way message on `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnsupportedChannel`] for channels outside the
    /// reserved namespace.
    pub fn send(&self, channel: &str, args: &[Value]) -> Result<(), BridgeError> {
        validate_channel(channel)?;
        self.ipc.send(channel, args);
        Ok(())
    }

    /// Sends a request on `channel` and resolves with the reply.
    ///
    /// Validation happens before this method returns: a rejected channel
    /// yields an already-failed future and the transport is never contacted.
    #[must_use]
    pub fn invoke(
        &self,
        channel: &str,
        args: &[Value],
    ) -> LocalBoxFuture<'static, Result<Value, BridgeError>> {
        if let Err(error) = validate_channel(channel) {
            return future::ready(Err(error)).boxed_local();
        }
        let name = channel.to_owned();
        self.ipc
            .invoke(channel, args)
            .map(move |reply| {
                reply.map_err(|source| BridgeError::Invoke {
                    channel: name,
                    source,
                })
            })
            .boxed_local()
    }

    /// Registers `listener` for every message on `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnsupportedChannel`] for channels outside the
    /// reserved namespace.
    pub fn on(&self, channel: &str, listener: Listener) -> Result<&Self, BridgeError> {
        validate_channel(channel)?;
        self.ipc.on(channel, listener);
        Ok(self)
    }

    /// Registers `listener` for the next message on `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnsupportedChannel`] for channels outside the
    /// reserved namespace.
    pub fn once(&self, channel: &str, listener: Listener) -> Result<&Self, BridgeError> {
        validate_channel(channel)?;
        self.ipc.once(channel, listener);
        Ok(self)
    }

    /// Removes a registration previously made with the same `listener`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnsupportedChannel`] for channels outside the
    /// reserved namespace.
    pub fn remove_listener(&self, channel: &str, listener: &Listener) -> Result<&Self, BridgeError> {
        validate_channel(channel)?;
        self.ipc.remove_listener(channel, listener);
        Ok(self)
    }
}

/// Port handoff, the only message-port operation exposed.
pub struct IpcMessagePortApi {
    handoff: PortHandoff,
}

impl IpcMessagePortApi {
    pub(crate) const fn new(handoff: PortHandoff) -> Self {
        Self { handoff }
    }

    /// Acquires the port answering `nonce` on `response_channel`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnsupportedChannel`] for channels outside the
    /// reserved namespace.
    pub fn acquire(&self, response_channel: &str, nonce: &str) -> Result<(), BridgeError> {
        self.handoff.acquire(response_channel, nonce)
    }
}

//! Nonce-authenticated handoff of message ports into the sandboxed context.
//!
//! Transferable ports cannot be cloned across the isolation boundary, so the
//! controller delivers them on a response channel and the bridge re-posts
//! them into the window. The response channel may be shared between
//! requests; the caller's nonce is the only proof that an arriving port
//! answers this particular request.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde_json::Value;
use tracing::debug;

use crate::channel::validate_channel;
use crate::error::BridgeError;
use crate::host::{IpcEvent, IpcTransport, Listener, WindowMessenger};

/// Tracing target for port handoff.
const PORT_TARGET: &str = "sandbridge::port";

/// Target origin used when re-posting ports into the window.
const POST_TARGET_ORIGIN: &str = "*";

/// Weak handle to the registered listener, emptied by the first match.
type ListenerSlot = Rc<RefCell<Option<Weak<dyn Fn(&IpcEvent, &[Value])>>>>;

/// Performs port acquisitions on behalf of the sandboxed application.
#[derive(Clone)]
pub struct PortHandoff {
    ipc: Rc<dyn IpcTransport>,
    messenger: Rc<dyn WindowMessenger>,
}

impl PortHandoff {
    /// Creates a handoff over the given transport and window messenger.
    #[must_use]
    pub fn new(ipc: Rc<dyn IpcTransport>, messenger: Rc<dyn WindowMessenger>) -> Self {
        Self { ipc, messenger }
    }

    /// Waits on `response_channel` for the message carrying `nonce`.
    ///
    /// The first message whose leading argument equals `nonce` removes the
    /// listener and has its ports posted into the window, tagged with the
    /// nonce. Messages with any other leading argument are ignored and the
    /// listener stays registered.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnsupportedChannel`] when `response_channel`
    /// is outside the reserved namespace. No listener is registered then.
    pub fn acquire(&self, response_channel: &str, nonce: &str) -> Result<(), BridgeError> {
        validate_channel(response_channel)?;

        let registration: ListenerSlot = Rc::new(RefCell::new(None));
        let listener: Listener = {
            let ipc = Rc::clone(&self.ipc);
            let messenger = Rc::clone(&self.messenger);
            let channel = response_channel.to_owned();
            let expected = nonce.to_owned();
            let slot = Rc::clone(&registration);
            Rc::new(move |event: &IpcEvent, args: &[Value]| {
                let received = args.first().and_then(Value::as_str);
                if received != Some(expected.as_str()) {
                    debug!(
                        target: PORT_TARGET,
                        channel = %channel,
                        "ignoring port response with mismatched nonce"
                    );
                    return;
                }

                // Taking the slot makes removal and delivery happen once even
                // if the host replays the message before the removal lands.
                let Some(registered) = slot.borrow_mut().take().and_then(|weak| weak.upgrade())
                else {
                    return;
                };
                ipc.remove_listener(&channel, &registered);

                debug!(
                    target: PORT_TARGET,
                    channel = %channel,
                    ports = event.ports().len(),
                    "handing off message ports"
                );
                messenger.post_message(
                    Value::String(expected.clone()),
                    POST_TARGET_ORIGIN,
                    event.ports().to_vec(),
                );
            })
        };

        *registration.borrow_mut() = Some(Rc::downgrade(&listener));
        self.ipc.on(response_channel, listener);
        Ok(())
    }
}

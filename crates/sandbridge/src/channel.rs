//! Namespace gate for every channel the sandboxed side can address.
//!
//! The bridge never forwards a channel name to the transport without passing
//! it through [`validate_channel`] first. The check is purely lexical: a name
//! is accepted iff it starts with [`CHANNEL_PREFIX`].

use std::fmt;

use sandbridge_config::CHANNEL_PREFIX;

use crate::error::BridgeError;

/// Accepts `channel` only when it lives in the reserved namespace.
///
/// # Errors
///
/// Returns [`BridgeError::UnsupportedChannel`] naming the rejected channel.
///
/// ```
/// use sandbridge::validate_channel;
///
/// assert!(validate_channel("vscode:foo").is_ok());
/// assert!(validate_channel("foo").is_err());
/// assert!(validate_channel("").is_err());
/// ```
pub fn validate_channel(channel: &str) -> Result<(), BridgeError> {
    if channel.starts_with(CHANNEL_PREFIX) {
        return Ok(());
    }
    Err(BridgeError::UnsupportedChannel {
        channel: channel.to_owned(),
    })
}

/// A channel name that has passed [`validate_channel`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelName(String);

impl ChannelName {
    /// Validates and wraps `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnsupportedChannel`] when the name is outside
    /// the reserved namespace.
    pub fn new(channel: impl Into<String>) -> Result<Self, BridgeError> {
        let name = channel.into();
        validate_channel(&name)?;
        Ok(Self(name))
    }

    /// Returns the validated name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<&str> for ChannelName {
    type Error = BridgeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<str> for ChannelName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

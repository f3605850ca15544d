//! Typed view of the startup switches the bridge depends on.
//!
//! The renderer's argument list belongs to the host runtime and carries many
//! switches the bridge knows nothing about. Only the window configuration
//! channel is extracted; every other argument is ignored.

use thiserror::Error;

use crate::defaults::WINDOW_CONFIG_ARG;

/// Errors raised while reading startup arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartupError {
    /// A required `--key=value` switch was absent or empty.
    #[error("did not find expected --{key} in the process argument list")]
    MissingArgument {
        /// Name of the missing switch, without the leading dashes.
        key: &'static str,
    },
}

/// Startup configuration populated once during process bootstrap.
///
/// ```
/// use sandbridge_config::StartupArgs;
///
/// let args = StartupArgs::parse(["electron", "--vscode-window-config=vscode:abc"])?;
/// assert_eq!(args.window_config_channel(), "vscode:abc");
/// # Ok::<(), sandbridge_config::StartupError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupArgs {
    window_config_channel: String,
}

impl StartupArgs {
    /// Scans `args` for the window configuration switch.
    ///
    /// Both `--vscode-window-config=<channel>` and the split form
    /// `--vscode-window-config <channel>` are accepted. The first occurrence
    /// wins.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::MissingArgument`] when the switch is absent,
    /// carries an empty value, or in split form is followed by another
    /// switch.
    pub fn parse<I, S>(args: I) -> Result<Self, StartupError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let flag = format!("--{WINDOW_CONFIG_ARG}");
        let mut iter = args.into_iter();
        let mut found = None;
        while let Some(arg) = iter.next() {
            let text = arg.as_ref();
            if let Some(value) = text
                .strip_prefix(flag.as_str())
                .and_then(|rest| rest.strip_prefix('='))
            {
                found = Some(value.to_owned());
                break;
            }
            if text == flag {
                // A following switch is not a value.
                found = iter
                    .next()
                    .map(|value| value.as_ref().to_owned())
                    .filter(|value| !value.starts_with("--"));
                break;
            }
        }

        match found {
            Some(channel) if !channel.is_empty() => Ok(Self {
                window_config_channel: channel,
            }),
            _ => Err(StartupError::MissingArgument {
                key: WINDOW_CONFIG_ARG,
            }),
        }
    }

    /// Builds startup arguments around a known channel name.
    #[must_use]
    pub fn with_window_config_channel(channel: impl Into<String>) -> Self {
        Self {
            window_config_channel: channel.into(),
        }
    }

    /// One-time channel the window configuration is requested over.
    #[must_use]
    pub const fn window_config_channel(&self) -> &str {
        self.window_config_channel.as_str()
    }
}

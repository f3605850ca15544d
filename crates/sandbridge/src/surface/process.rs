//! Read-only process metadata exposed to the sandboxed application.

use std::collections::BTreeMap;
use std::rc::Rc;

use futures::future::{LocalBoxFuture, Shared};

use sandbridge_config::CWD_OVERRIDE_VAR;

use crate::environment::LiveEnvironment;
use crate::error::BridgeError;
use crate::host::{EnvMap, HostFuture, MemoryInfo, ProcessCallback, ProcessHost};
use crate::shell_env::ShellEnvTask;

/// Role reported for the sandboxed context.
pub const PROCESS_TYPE: &str = "renderer";

/// Platform identifier whose paths use `\` as separator.
const WINDOWS_PLATFORM: &str = "win32";

/// Process metadata accessors. Reads never hand out the live environment.
pub struct ProcessApi {
    host: Rc<dyn ProcessHost>,
    environment: LiveEnvironment,
    shell_env: ShellEnvTask,
}

impl ProcessApi {
    pub(crate) fn new(
        host: Rc<dyn ProcessHost>,
        environment: LiveEnvironment,
        shell_env: ShellEnvTask,
    ) -> Self {
        Self {
            host,
            environment,
            shell_env,
        }
    }

    /// Operating system identifier.
    #[must_use]
    pub fn platform(&self) -> String {
        self.host.platform()
    }

    /// CPU architecture identifier.
    #[must_use]
    pub fn arch(&self) -> String {
        self.host.arch()
    }

    /// Fresh copy of the process environment.
    #[must_use]
    pub fn env(&self) -> EnvMap {
        self.environment.snapshot()
    }

    /// Component versions.
    #[must_use]
    pub fn versions(&self) -> BTreeMap<String, String> {
        self.host.versions()
    }

    /// Role of this context, always `"renderer"`.
    #[must_use]
    pub const fn process_type(&self) -> &'static str {
        PROCESS_TYPE
    }

    /// Absolute path of the running executable.
    #[must_use]
    pub fn exec_path(&self) -> String {
        self.host.exec_path()
    }

    /// Working directory of the application.
    ///
    /// A non-empty `VSCODE_CWD` wins. Otherwise the executable path is cut
    /// at its last separator (`\` on `win32`, `/` elsewhere); a path without
    /// a separator yields an empty string.
    #[must_use]
    pub fn cwd(&self) -> String {
        if let Some(dir) = self
            .environment
            .get(CWD_OVERRIDE_VAR)
            .filter(|dir| !dir.is_empty())
        {
            return dir;
        }

        let separator = if self.host.platform() == WINDOWS_PLATFORM {
            '\\'
        } else {
            '/'
        };
        self.host
            .exec_path()
            .rsplit_once(separator)
            .map(|(dir, _)| dir.to_owned())
            .unwrap_or_default()
    }

    /// The merged shell environment, resolved at most once.
    pub fn shell_env(&self) -> Shared<LocalBoxFuture<'static, Result<EnvMap, BridgeError>>> {
        self.shell_env.result()
    }

    /// Current memory usage, straight from the host.
    #[must_use]
    pub fn memory_info(&self) -> HostFuture<MemoryInfo> {
        self.host.memory_info()
    }

    /// Registers `callback` for a host lifecycle event.
    pub fn on(&self, event_type: &str, callback: ProcessCallback) {
        self.host.on(event_type, callback);
    }
}

//! The sandboxed process's live environment mapping.
//!
//! The mapping is written exactly once by the bridge, when the window
//! configuration's `userEnv` is merged in. Every other read goes through
//! [`LiveEnvironment::snapshot`], which hands out an owned copy.

use std::cell::RefCell;
use std::env;
use std::fmt;
use std::rc::Rc;

use crate::host::EnvMap;

/// Shared handle to the process environment seen by the sandboxed context.
#[derive(Clone, Default)]
pub struct LiveEnvironment {
    vars: Rc<RefCell<EnvMap>>,
}

impl LiveEnvironment {
    /// Seeds the mapping from the current process environment.
    ///
    /// Variables whose names or values are not valid Unicode are skipped.
    #[must_use]
    pub fn from_process() -> Self {
        let vars = env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        Self::from_map(vars)
    }

    /// Seeds the mapping from `vars`.
    #[must_use]
    pub fn from_map(vars: EnvMap) -> Self {
        Self {
            vars: Rc::new(RefCell::new(vars)),
        }
    }

    /// Owned copy of the current mapping.
    #[must_use]
    pub fn snapshot(&self) -> EnvMap {
        self.vars.borrow().clone()
    }

    /// Value of `key`, if set.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars.borrow().get(key).cloned()
    }

    /// Copies every entry of `overrides` in, replacing existing keys.
    pub(crate) fn merge(&self, overrides: &EnvMap) {
        self.vars.borrow_mut().extend(overrides.clone());
    }
}

impl fmt::Debug for LiveEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Values may hold secrets; only the size is printed.
        f.debug_struct("LiveEnvironment")
            .field("len", &self.vars.borrow().len())
            .finish()
    }
}

//! Environment variable lookup used by `${NAME}` substitution.

use std::collections::HashMap;

/// Read-only view of variable bindings.
pub trait EnvLookup: Send + Sync {
    /// Value bound to `name`, or `None` when unset.
    fn get(&self, name: &str) -> Option<String>;
}

/// The environment of the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        // Names the OS rejects (empty, containing '=' or NUL) are simply unset.
        if name.is_empty() || name.contains(['=', '\0']) {
            return None;
        }
        let value = std::env::var_os(name)?;
        Some(
            value
                .into_string()
                .unwrap_or_else(|v| v.to_string_lossy().into_owned()),
        )
    }
}

/// Fixed bindings, mainly for tests and embedders that sandbox the prompt.
impl EnvLookup for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

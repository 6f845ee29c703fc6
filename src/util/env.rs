//! Scoped environment-variable overrides.

use std::ffi::OsString;

/// Sets process environment variables and restores their prior state
/// (value or absence) when dropped, whatever the outcome of the run.
#[derive(Debug)]
pub struct EnvGuard {
    saved: Vec<(String, Option<OsString>)>,
}

impl EnvGuard {
    /// Override the given variables for the lifetime of the guard.
    pub fn set(vars: &[(&str, &str)]) -> Self {
        let mut saved = Vec::with_capacity(vars.len());
        for (key, value) in vars {
            saved.push((key.to_string(), std::env::var_os(key)));
            std::env::set_var(key, value);
        }
        EnvGuard { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, prior) in self.saved.drain(..).rev() {
            match prior {
                Some(value) => std::env::set_var(&key, value),
                None => std::env::remove_var(&key),
            }
        }
    }
}

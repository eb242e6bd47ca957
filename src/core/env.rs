//! Environment variable storage.
//!
//! Enrichment reads pre-existing values from and writes resolved secrets
//! into an [`EnvStore`]. [`ProcessEnv`] is the real process environment;
//! [`MemoryEnv`] keeps everything local to one instance.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::EnvError;

/// Key/value store for environment variables.
pub trait EnvStore: Send + Sync {
    /// Current value of `key`, if set.
    fn get(&self, key: &str) -> Option<String>;

    /// Set `key` to `value`, replacing any previous value.
    ///
    /// Fails without writing when the pair could never be a process
    /// environment entry.
    fn set(&self, key: &str, value: &str) -> Result<(), EnvError>;

    /// Value of `key` if it is set and non-empty.
    fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty())
    }
}

/// Reject pairs `std::env::set_var` would panic on.
pub fn check_var(key: &str, value: &str) -> Result<(), EnvError> {
    let invalid = |reason| EnvError::InvalidKey {
        key: key.to_string(),
        reason,
    };

    if key.is_empty() {
        return Err(invalid("name is empty"));
    }
    if key.contains('=') {
        return Err(invalid("name contains '='"));
    }
    if key.contains('\0') {
        return Err(invalid("name contains a NUL byte"));
    }
    if value.contains('\0') {
        return Err(EnvError::InvalidValue {
            key: key.to_string(),
        });
    }
    Ok(())
}

/// The process-wide environment (`std::env`).
///
/// Writes go through `std::env::set_var`, which is not synchronised with
/// other threads reading the environment through libc (`getaddrinfo` and
/// friends). Use it from a current-thread runtime, as the CLI does, or
/// before any other threads are started. Multi-threaded callers should
/// enrich into a [`MemoryEnv`] and apply the result themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvStore for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EnvError> {
        check_var(key, value)?;
        std::env::set_var(key, value);
        Ok(())
    }
}

/// An isolated in-memory environment.
#[derive(Debug, Default)]
pub struct MemoryEnv {
    vars: RwLock<HashMap<String, String>>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every variable.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.vars
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let vars = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            vars: RwLock::new(vars),
        }
    }
}

impl EnvStore for MemoryEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.vars
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EnvError> {
        check_var(key, value)?;
        self.vars
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

//! Persistent key/value storage.
//!
//! Backends implement the three-method [`Storage`] capability. Everything
//! above them goes through [`Store`], which adds JSON encoding and the
//! fail-open read rule: a missing key or an unparsable value yields the
//! caller's default and never an error.

#[cfg(test)]
pub(crate) mod failing;
pub mod keys;
#[cfg(target_arch = "wasm32")]
pub mod local;
pub mod memory;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// A flat string-keyed durable store. Implemented once per platform.
///
/// Methods take `&self`: the engine is single-threaded and every backend
/// (including `window.localStorage`) has interior mutability.
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn delete(&self, key: &str);
}

impl<S: Storage + ?Sized> Storage for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) {
        (**self).delete(key)
    }
}

/// Typed JSON access on top of a backend.
pub struct Store<S> {
    backend: S,
}

impl<S: Storage> Store<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Read and decode `key`, substituting `default` when the key is absent
    /// or its value does not decode.
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.backend.get(key) {
            None => default,
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(key, error = %e, "corrupted value in storage, using default");
                    default
                }
            },
        }
    }

    pub fn read_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.read(key, T::default())
    }

    /// Decode `key` strictly: `Ok(None)` when absent, `Err` with the parse
    /// error when present but corrupt.
    pub fn try_read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, serde_json::Error> {
        self.backend
            .get(key)
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.backend.get(key).is_some()
    }

    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value).map_err(|e| StorageError::Encode {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.backend.set(key, &json)
    }

    pub fn remove(&self, key: &str) {
        self.backend.delete(key);
    }

    /// Run `f` as one unit over `keys`. If it fails, each of those keys is
    /// put back to the raw value it held before (or removed if it was
    /// absent), so callers never observe a half-applied change.
    pub fn atomically<T, E>(
        &self,
        keys: &[&str],
        f: impl FnOnce(&Self) -> Result<T, E>,
    ) -> Result<T, E> {
        let saved: Vec<(&str, Option<String>)> =
            keys.iter().map(|key| (*key, self.backend.get(key))).collect();
        let result = f(self);
        if result.is_err() {
            for (key, raw) in saved {
                if self.backend.get(key) == raw {
                    continue;
                }
                match raw {
                    Some(raw) => {
                        if let Err(e) = self.backend.set(key, &raw) {
                            tracing::error!(key, error = %e, "rollback write failed");
                        }
                    }
                    None => self.backend.delete(key),
                }
            }
            tracing::warn!("write failed, changes rolled back");
        }
        result
    }
}

//! `window.localStorage` backend. WASM 環境でのみ動作。

use super::Storage;
use crate::error::StorageError;

/// Browser backend. The handle is looked up on every call so that a storage
/// area disabled mid-session degrades to "absent" reads instead of a panic.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn handle() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    /// `true` when the browser exposes a usable storage area.
    pub fn is_available() -> bool {
        Self::handle().is_some()
    }
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::handle()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = Self::handle().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }

    fn delete(&self, key: &str) {
        if let Some(storage) = Self::handle() {
            let _ = storage.remove_item(key);
        }
    }
}

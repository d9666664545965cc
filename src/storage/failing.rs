use std::cell::RefCell;
use std::collections::BTreeSet;

use super::{MemoryStorage, Storage};
use crate::error::StorageError;

/// In-memory backend that rejects writes to chosen keys, the way a full
/// `localStorage` rejects them with a quota error.
#[derive(Debug, Default)]
pub struct FailingStorage {
    inner: MemoryStorage,
    failing: RefCell<BTreeSet<String>>,
}

impl FailingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes_to(&self, key: &str) {
        self.failing.borrow_mut().insert(key.to_string());
    }

    pub fn heal(&self) {
        self.failing.borrow_mut().clear();
    }
}

impl Storage for FailingStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.failing.borrow().contains(key) {
            return Err(StorageError::Backend(format!("quota exceeded writing {key}")));
        }
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) {
        self.inner.delete(key)
    }
}

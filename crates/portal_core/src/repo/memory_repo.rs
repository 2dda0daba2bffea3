//! In-process key-value store.
//!
//! Used by tests and by callers that want an ephemeral portal without a
//! database file.

use crate::repo::kv_repo::{validate_key, KeyValueStore, StoreResult};
use std::collections::BTreeMap;

/// `BTreeMap`-backed store; contents are lost on drop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryKeyValueStore {
    items: BTreeMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        validate_key(key)?;
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.items.remove(key);
        Ok(())
    }
}

//! In-memory storage backend for testing.

use crate::error::Result;
use crate::storage::traits::KeyValueStore;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage backend for testing.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Create a new in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let records = self.records.read().unwrap();
        Ok(records.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut records = self.records.write().unwrap();
        records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut records = self.records.write().unwrap();
        records.remove(key);
        Ok(())
    }
}

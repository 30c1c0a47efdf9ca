//! Storage trait definitions.

use crate::error::Result;

/// Durable key-value store holding one JSON record per key.
///
/// Every write replaces the whole record for a key; there are no partial
/// updates. Read-modify-write is left to callers.
pub trait KeyValueStore: Send + Sync {
    /// Get the raw record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the record stored under `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn delete(&self, key: &str) -> Result<()>;
}

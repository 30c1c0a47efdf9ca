//! Stored credential for the completion endpoint.

use crate::error::{Error, Result};
use crate::storage::{API_KEY_KEY, KeyValueStore};

/// Reads and writes the user's API key.
pub struct CredentialStore<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> CredentialStore<'a> {
    /// Credential access backed by `store`.
    #[must_use]
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// The saved key, if any. A blank record counts as no key.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn get(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(API_KEY_KEY)?
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty()))
    }

    /// Save `key`, trimmed.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is blank or the storage backend fails.
    pub fn save(&self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::InvalidInput("API key must not be empty".to_string()));
        }
        self.store.put(API_KEY_KEY, key)
    }

    /// Forget the saved key.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn clear(&self) -> Result<()> {
        self.store.delete(API_KEY_KEY)
    }
}

/// Mask a key for display, keeping the first and last four characters.
#[must_use]
pub fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "*".repeat(chars.len())
    }
}

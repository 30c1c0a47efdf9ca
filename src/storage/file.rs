//! File-based storage backend.

use crate::error::{Error, Result};
use crate::storage::traits::KeyValueStore;
use std::fs;
use std::path::PathBuf;

/// File-based storage backend with atomic writes.
///
/// Each key lives in `<base_dir>/store/<key>.json`.
#[derive(Debug)]
pub struct FileBackend {
    base_dir: PathBuf,
}

impl FileBackend {
    /// Create a new file backend.
    ///
    /// Creates the store directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store directory cannot be created.
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(base_dir.join("store"))?;
        Ok(Self { base_dir })
    }

    /// Get the path to a record file, rejecting keys that could escape the store.
    fn record_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::InvalidInput(format!("invalid storage key: {key:?}")));
        }
        Ok(self.base_dir.join("store").join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.record_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let path = self.record_path(key)?;
        let temp = path.with_extension("tmp");

        fs::write(&temp, value)?;

        // Rename is atomic, so readers never see a half-written record
        fs::rename(&temp, &path)?;

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.record_path(key)?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// Get the default forge home directory.
///
/// Uses `FORGE_HOME` environment variable if set, otherwise `~/.forge`.
#[must_use]
pub fn get_forge_home() -> PathBuf {
    if let Ok(home) = std::env::var("FORGE_HOME") {
        PathBuf::from(home)
    } else if let Some(home) = dirs::home_dir() {
        home.join(".forge")
    } else {
        PathBuf::from(".forge")
    }
}

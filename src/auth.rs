//! Local PIN gate for the vault.
//!
//! A convenience lock, not a security boundary: anyone with access to the
//! store directory can clear it. The PIN is kept as a SHA-256 digest; a
//! plaintext value written by older versions is accepted once and upgraded.

use crate::error::{Error, Result};
use crate::storage::{AUTHENTICATED_KEY, KeyValueStore, PIN_KEY};
use sha2::{Digest, Sha256};
use tracing::info;

/// Minimum PIN length.
pub const MIN_PIN_LEN: usize = 4;

const DIGEST_PREFIX: &str = "sha256:";

fn digest(pin: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pin.as_bytes());
    format!("{DIGEST_PREFIX}{}", hex::encode(hasher.finalize()))
}

/// PIN setup, unlock and lock against the local store.
pub struct PinGate<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> PinGate<'a> {
    /// Gate backed by `store`.
    #[must_use]
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Whether a PIN has been set.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn is_configured(&self) -> Result<bool> {
        Ok(self.store.get(PIN_KEY)?.is_some_and(|p| !p.is_empty()))
    }

    /// Set the PIN. `pin` and `confirm` must match and be at least
    /// [`MIN_PIN_LEN`] characters. Setting a PIN also unlocks the vault.
    ///
    /// # Errors
    ///
    /// Returns an error if the PIN is too short, the confirmation differs,
    /// or the storage backend fails.
    pub fn setup(&self, pin: &str, confirm: &str) -> Result<()> {
        if pin.chars().count() < MIN_PIN_LEN {
            return Err(Error::InvalidInput(format!(
                "PIN must be at least {MIN_PIN_LEN} characters"
            )));
        }
        if pin != confirm {
            return Err(Error::InvalidInput("PINs do not match".to_string()));
        }
        self.store.put(PIN_KEY, &digest(pin))?;
        self.store.put(AUTHENTICATED_KEY, "true")
    }

    /// Check `pin` and mark the vault unlocked.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPin` on mismatch, `NotFound` if no PIN is set, or a
    /// storage error.
    pub fn unlock(&self, pin: &str) -> Result<()> {
        let stored = self
            .store
            .get(PIN_KEY)?
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::NotFound("no PIN configured".to_string()))?;

        if stored.starts_with(DIGEST_PREFIX) {
            if stored != digest(pin) {
                return Err(Error::InvalidPin);
            }
        } else {
            if stored != pin {
                return Err(Error::InvalidPin);
            }
            info!("upgrading plaintext PIN to digest");
            self.store.put(PIN_KEY, &digest(pin))?;
        }

        self.store.put(AUTHENTICATED_KEY, "true")
    }

    /// Clear the unlocked flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn lock(&self) -> Result<()> {
        self.store.delete(AUTHENTICATED_KEY)
    }

    /// True when no PIN is set or the vault has been unlocked.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn is_unlocked(&self) -> Result<bool> {
        if !self.is_configured()? {
            return Ok(true);
        }
        Ok(self.store.get(AUTHENTICATED_KEY)?.as_deref() == Some("true"))
    }

    /// Fail with [`Error::Locked`] unless [`PinGate::is_unlocked`].
    ///
    /// # Errors
    ///
    /// Returns `Locked`, or a storage error.
    pub fn require_unlocked(&self) -> Result<()> {
        if self.is_unlocked()? {
            Ok(())
        } else {
            Err(Error::Locked)
        }
    }
}

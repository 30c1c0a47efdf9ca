//! `forge pin`, `forge unlock` and `forge lock` command implementations.

use crate::auth::PinGate;
use crate::cli::open_store;
use crate::config::Config;
use crate::error::{Error, Result};

/// Set the vault PIN.
///
/// # Errors
///
/// Returns an error if a PIN is already set and the vault is locked, the
/// PIN is invalid, or storage fails.
pub fn setup(config: &Config, pin: &str, confirm: &str) -> Result<()> {
    let store = open_store(config)?;
    let gate = PinGate::new(&store);

    // Changing an existing PIN requires being unlocked
    if gate.is_configured()? && !gate.is_unlocked()? {
        return Err(Error::Locked);
    }

    gate.setup(pin, confirm)?;
    println!("PIN set. Vault unlocked.");
    Ok(())
}

/// Unlock the vault.
///
/// # Errors
///
/// Returns an error if the PIN is wrong, none is set, or storage fails.
pub fn unlock(config: &Config, pin: &str) -> Result<()> {
    let store = open_store(config)?;
    PinGate::new(&store).unlock(pin)?;
    println!("Vault unlocked.");
    Ok(())
}

/// Lock the vault.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn lock(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let gate = PinGate::new(&store);
    if !gate.is_configured()? {
        println!("No PIN configured; nothing to lock.");
        return Ok(());
    }
    gate.lock()?;
    println!("Vault locked.");
    Ok(())
}

//! `forge key` command implementation.

use crate::chat::CredentialStore;
use crate::chat::credential::mask;
use crate::cli::open_store;
use crate::config::Config;
use crate::error::Result;

/// Save the API key.
///
/// # Errors
///
/// Returns an error if the key is blank or storage fails.
pub fn set(config: &Config, key: &str) -> Result<()> {
    let store = open_store(config)?;
    CredentialStore::new(&store).save(key)?;
    println!("API key saved.");
    Ok(())
}

/// Show the active key, masked, and where it comes from.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn show(config: &Config) -> Result<()> {
    if let Some(key) = &config.api_key_override {
        println!("{} (from FORGE_API_KEY)", mask(key));
        return Ok(());
    }

    let store = open_store(config)?;
    match CredentialStore::new(&store).get()? {
        Some(key) => println!("{}", mask(&key)),
        None => println!("No API key configured."),
    }
    Ok(())
}

/// Forget the saved key.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn clear(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    CredentialStore::new(&store).clear()?;
    println!("API key removed.");
    Ok(())
}

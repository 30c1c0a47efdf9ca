//! CLI command implementations.

pub mod chat;
pub mod history;
pub mod idea;
pub mod journal;
pub mod key;
pub mod mvp;
pub mod pin;
pub mod stack;

use crate::auth::PinGate;
use crate::config::Config;
use crate::error::Result;
use crate::storage::FileBackend;
use chrono::{DateTime, Local, Utc};

/// Open the configured store.
///
/// # Errors
///
/// Returns an error if the store directory cannot be created.
pub fn open_store(config: &Config) -> Result<FileBackend> {
    FileBackend::new(config.storage.path.clone())
}

/// Open the configured store, failing if the vault is PIN locked.
///
/// # Errors
///
/// Returns `Locked` if a PIN is set and the vault hasn't been unlocked,
/// or a storage error.
pub fn open_unlocked(config: &Config) -> Result<FileBackend> {
    let store = open_store(config)?;
    PinGate::new(&store).require_unlocked()?;
    Ok(store)
}

/// Shortened id for listings.
fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

const SHORT_ID_LEN: usize = 8;

/// Format UTC time as local time for display.
fn format_local_time(utc: DateTime<Utc>) -> String {
    let local: DateTime<Local> = utc.into();
    local.format("%Y-%m-%d %H:%M").to_string()
}

/// First line of `text`, cut to `max_chars` with an ellipsis.
fn preview(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or(text);
    if first_line.chars().count() > max_chars {
        let cut: String = first_line.chars().take(max_chars).collect();
        format!("{cut}...")
    } else {
        first_line.to_string()
    }
}

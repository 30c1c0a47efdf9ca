//! Error types for forge.

use std::io;
use thiserror::Error;

/// Result type alias for forge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in forge operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage I/O error.
    #[error("Storage error: {0}")]
    Storage(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input rejected before anything was stored.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Record not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The vault is PIN protected and has not been unlocked.
    #[error("Vault is locked. Run `forge unlock <pin>` first.")]
    Locked,

    /// No credential for the completion endpoint.
    #[error("No API key configured. Run `forge key set <key>` or set FORGE_API_KEY.")]
    MissingCredential,

    /// PIN did not match the stored one.
    #[error("Incorrect PIN")]
    InvalidPin,
}

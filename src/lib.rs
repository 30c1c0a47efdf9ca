//! forge - startup idea vault with a topic-aware chat assistant.
//!
//! Chat history for every topic lives in one capped record; each send builds
//! a prompt from the last few turns of the active topic.

pub mod auth;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod storage;
pub mod vault;

pub use config::Config;
pub use error::{Error, Result};

//! Storage backends for local records.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::{FileBackend, get_forge_home};
pub use memory::MemoryBackend;
pub use traits::KeyValueStore;

/// Flat chat history across all topics.
pub const CHAT_HISTORY_KEY: &str = "forge_chat_history";

/// Credential for the completion endpoint.
pub const API_KEY_KEY: &str = "gemini_api_key";

/// PIN digest for the vault gate.
pub const PIN_KEY: &str = "forge_pin";

/// Persisted "unlocked" flag for the vault gate.
pub const AUTHENTICATED_KEY: &str = "forge_authenticated";

/// Idea collection.
pub const IDEAS_KEY: &str = "forge_ideas";

/// MVP plan collection.
pub const MVP_PLANS_KEY: &str = "forge_mvp_plans";

/// Tech stack collection.
pub const TECH_STACKS_KEY: &str = "forge_tech_stacks";

/// Focus journal collection.
pub const JOURNAL_KEY: &str = "forge_journal_entries";

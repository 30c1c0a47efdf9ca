//! Topic-aware chat assistant: history, prompt assembly, completion client
//! and the per-topic conversation controller.

pub mod client;
pub mod context;
pub mod conversation;
pub mod credential;
pub mod guard;
pub mod history;
pub mod message;

pub use client::{ChatError, CompletionClient, GeminiClient};
pub use context::{CONTEXT_WINDOW, build_conversation_context, greeting};
pub use conversation::{Conversation, ConversationState, ERROR_REPLY, SendOutcome};
pub use credential::CredentialStore;
pub use guard::{InFlight, InFlightGuard};
pub use history::{HistoryStore, MAX_STORED_MESSAGES, TopicSummary};
pub use message::{Message, Topic};

//! Conversation controller for one topic.
//!
//! Owns the visible message list for its topic and drives one chat turn:
//! build the prompt, call the completion endpoint, append the reply (or a
//! fixed error message) and persist. Nothing in a turn is fatal; every path
//! ends back in [`ConversationState::Ready`] with history written.

use crate::chat::client::CompletionClient;
use crate::chat::context::{build_conversation_context, greeting};
use crate::chat::guard::InFlight;
use crate::chat::history::HistoryStore;
use crate::chat::message::{Message, Topic};
use crate::error::Result;
use crate::storage::KeyValueStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Transcript message appended when a completion request fails.
pub const ERROR_REPLY: &str =
    "Sorry, I encountered an error. Please check your API key and try again.";

/// Where the conversation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    /// Opened but history not loaded yet.
    Idle,

    /// Loaded, but no credential to send with.
    AwaitingCredential,

    /// Ready to send.
    Ready,

    /// A completion request is outstanding.
    Sending,
}

/// Result of [`Conversation::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing happened.
    Ignored,

    /// No credential configured; nothing was sent.
    NeedsCredential,

    /// A request for this topic is already running.
    Busy,

    /// The assistant replied.
    Replied(Message),

    /// The request failed; the fixed error message was appended instead.
    Failed(Message),

    /// The caller cancelled the request. The user's message was kept.
    Cancelled,
}

/// Active conversation for one topic.
pub struct Conversation<'a> {
    topic: Topic,
    history: HistoryStore<'a>,
    messages: Vec<Message>,
    credential: Option<String>,
    state: ConversationState,
    in_flight: Arc<InFlight>,
}

impl<'a> Conversation<'a> {
    /// Open a conversation. Call [`Conversation::activate`] before use.
    #[must_use]
    pub fn open(
        topic: Topic,
        store: &'a dyn KeyValueStore,
        credential: Option<String>,
        in_flight: Arc<InFlight>,
    ) -> Self {
        Self {
            topic,
            history: HistoryStore::new(store),
            messages: Vec::new(),
            credential: credential.filter(|c| !c.trim().is_empty()),
            state: ConversationState::Idle,
            in_flight,
        }
    }

    /// Load stored history, or start from the topic greeting when there is none.
    pub fn activate(&mut self) {
        let stored = self.history.load(self.topic);
        self.messages = if stored.is_empty() {
            vec![Message::new(greeting(self.topic), true, self.topic)]
        } else {
            stored
        };
        self.state = if self.credential.is_some() {
            ConversationState::Ready
        } else {
            ConversationState::AwaitingCredential
        };
        debug!(topic = %self.topic, messages = self.messages.len(), "conversation activated");
    }

    /// Topic this conversation belongs to.
    #[must_use]
    pub fn topic(&self) -> Topic {
        self.topic
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConversationState {
        self.state
    }

    /// Visible transcript, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Provide a credential. Blank values are ignored.
    pub fn set_credential(&mut self, credential: impl Into<String>) {
        let credential = credential.into();
        if credential.trim().is_empty() {
            return;
        }
        self.credential = Some(credential);
        if self.state == ConversationState::AwaitingCredential {
            self.state = ConversationState::Ready;
        }
    }

    /// Append a message. Assistant messages persist the whole list.
    pub fn append(&mut self, content: impl Into<String>, is_bot: bool) -> Message {
        let message = Message::new(content, is_bot, self.topic);
        self.messages.push(message.clone());
        if is_bot {
            self.persist();
        }
        message
    }

    /// Replace the visible list and persist it.
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.persist();
    }

    /// Drop this topic's stored history and reset to the greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if the history record cannot be written.
    pub fn clear_history(&mut self) -> Result<()> {
        self.messages = vec![Message::new(greeting(self.topic), true, self.topic)];
        self.history.clear(self.topic)
    }

    /// Run one chat turn for `input`.
    ///
    /// Only one turn per topic runs at a time across the process. The turn
    /// ends early if `cancel` fires; the user's message is kept and no reply
    /// is appended.
    pub async fn send(
        &mut self,
        input: &str,
        client: &dyn CompletionClient,
        cancel: &CancellationToken,
    ) -> SendOutcome {
        if input.trim().is_empty() {
            return SendOutcome::Ignored;
        }

        match self.state {
            ConversationState::Idle => self.activate(),
            // A dropped send future leaves this behind; no request is running
            ConversationState::Sending => self.state = ConversationState::Ready,
            ConversationState::AwaitingCredential | ConversationState::Ready => {}
        }

        let Some(credential) = self.credential.clone() else {
            self.state = ConversationState::AwaitingCredential;
            return SendOutcome::NeedsCredential;
        };

        let Some(_guard) = self.in_flight.try_acquire(self.topic) else {
            debug!(topic = %self.topic, "send rejected, request already in flight");
            return SendOutcome::Busy;
        };

        self.state = ConversationState::Sending;

        // Prompt covers the history before this turn plus the new question
        let prompt = build_conversation_context(&self.messages, input, self.topic);
        self.append(input, false);

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            reply = client.complete(&prompt, &credential) => Some(reply),
        };

        let outcome = match result {
            Some(Ok(reply)) => SendOutcome::Replied(self.append(reply, true)),
            Some(Err(e)) => {
                warn!(topic = %self.topic, error = %e, "completion request failed");
                SendOutcome::Failed(self.append(ERROR_REPLY, true))
            }
            None => {
                info!(topic = %self.topic, "completion request cancelled");
                self.persist();
                SendOutcome::Cancelled
            }
        };

        self.state = ConversationState::Ready;
        outcome
    }

    fn persist(&self) {
        if let Err(e) = self.history.save(&self.messages, self.topic) {
            warn!(topic = %self.topic, error = %e, "failed to save chat history");
        }
    }
}

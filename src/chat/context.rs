//! Prompt assembly and topic greetings.

use crate::chat::message::{Message, Topic};

/// Number of prior messages replayed into each prompt.
pub const CONTEXT_WINDOW: usize = 5;

/// Greeting shown when a topic has no stored history.
#[must_use]
pub fn greeting(topic: Topic) -> &'static str {
    match topic {
        Topic::MvpPlanning => {
            "Hi! I'm your MVP Planning Assistant. I can help you define core features, validate your MVP concept, and create a roadmap for your minimum viable product. I remember our previous conversations, so feel free to continue where we left off. What would you like to work on?"
        }
        Topic::TechStack => {
            "Hello! I'm your Tech Stack Advisor. I can help you choose the right technologies for your project, compare frameworks, and make informed technical decisions. I have memory of our past discussions to provide better continuity. What's your project about?"
        }
        Topic::FocusJournal => {
            "Hey there! I'm your Productivity Coach. I can help you set goals, track progress, overcome blockers, and stay motivated on your startup journey. I remember our previous sessions to provide personalized advice. How can I support you today?"
        }
        Topic::General | Topic::Legacy => {
            "Hi! I'm your AI assistant with memory of our conversations. How can I help you with your startup today?"
        }
    }
}

/// Build the prompt for one turn.
///
/// Replays at most [`CONTEXT_WINDOW`] of the most recent `history` entries
/// in their original order, then the new question, then the continuity
/// instruction.
#[must_use]
pub fn build_conversation_context(history: &[Message], new_message: &str, topic: Topic) -> String {
    let start = history.len().saturating_sub(CONTEXT_WINDOW);

    let transcript = history[start..]
        .iter()
        .map(|msg| {
            let speaker = if msg.is_bot { "Assistant" } else { "User" };
            format!("{speaker}: {}", msg.content)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Context: You are helping with {topic}. \n\
         \n\
         Previous conversation history:\n\
         {transcript}\n\
         \n\
         Current user question: {new_message}\n\
         \n\
         Please respond based on the conversation history and provide helpful, contextual advice. Reference previous discussions when relevant."
    )
}

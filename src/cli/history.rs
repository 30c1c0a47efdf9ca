//! `forge history` command implementation.

use crate::chat::{HistoryStore, Message, Topic, TopicSummary};
use crate::cli::{format_local_time, open_unlocked, preview};
use crate::config::Config;
use crate::error::Result;

/// Maximum length for message preview in `show`.
const CONTENT_PREVIEW_LEN: usize = 100;

/// Print the stored transcript for a topic.
///
/// # Errors
///
/// Returns an error if the vault is locked or storage fails.
pub fn show(config: &Config, topic: Topic) -> Result<()> {
    let store = open_unlocked(config)?;
    let messages = HistoryStore::new(&store).load(topic);

    if messages.is_empty() {
        println!("No stored history for {topic}.");
        return Ok(());
    }

    for msg in &messages {
        println!("{}", format_row(msg));
    }
    println!("{}", "─".repeat(60));
    println!("{} message(s)", messages.len());
    Ok(())
}

/// Remove a topic's stored history.
///
/// # Errors
///
/// Returns an error if the vault is locked or storage fails.
pub fn clear(config: &Config, topic: Topic) -> Result<()> {
    let store = open_unlocked(config)?;
    let history = HistoryStore::new(&store);
    let removed = history.load(topic).iter().filter(|m| m.topic == topic).count();
    history.clear(topic)?;

    if removed == 0 {
        println!("No history to clear for {topic}.");
    } else {
        println!("Cleared {removed} message(s) for {topic}.");
    }
    Ok(())
}

/// List topics with stored history.
///
/// # Errors
///
/// Returns an error if the vault is locked or storage fails.
pub fn list(config: &Config) -> Result<()> {
    let store = open_unlocked(config)?;
    let summary = HistoryStore::new(&store).summary();

    if summary.is_empty() {
        println!("No chat history stored.");
        return Ok(());
    }

    println!("{:<16} {:>8}  Last message", "Topic", "Messages");
    println!("{}", "─".repeat(50));
    for row in &summary {
        println!("{}", format_summary(row));
    }
    Ok(())
}

fn format_row(msg: &Message) -> String {
    let speaker = if msg.is_bot { "assistant" } else { "you" };
    format!(
        "[{}] {:<9} {}",
        format_local_time(msg.timestamp),
        speaker,
        preview(&msg.content, CONTENT_PREVIEW_LEN)
    )
}

fn format_summary(row: &TopicSummary) -> String {
    format!(
        "{:<16} {:>8}  {}",
        row.topic.as_str(),
        row.message_count,
        format_local_time(row.last_message_at)
    )
}

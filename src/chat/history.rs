//! Persisted chat history.
//!
//! All topics share one flat record under [`CHAT_HISTORY_KEY`], kept in
//! append order and capped at [`MAX_STORED_MESSAGES`]. The record is a plain
//! JSON array of messages so existing local-storage exports load unchanged.
//!
//! Entries written before messages carried a topic are migrated on read to
//! [`Topic::Legacy`] and stay visible from every topic.

use crate::chat::message::{Message, Topic};
use crate::error::Result;
use crate::storage::{CHAT_HISTORY_KEY, KeyValueStore};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Maximum number of messages kept across all topics.
pub const MAX_STORED_MESSAGES: usize = 100;

/// On-disk shape of a message, before migration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredMessage {
    id: String,
    content: String,
    #[serde(default)]
    is_bot: bool,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default, alias = "context")]
    topic: Option<String>,
}

impl StoredMessage {
    fn migrate(self) -> Message {
        let topic = match self.topic.as_deref().map(str::trim) {
            Some("general") => Topic::General,
            Some("mvp-planning") => Topic::MvpPlanning,
            Some("tech-stack") => Topic::TechStack,
            Some("focus-journal") => Topic::FocusJournal,
            Some(other) => {
                if !other.is_empty() && other != "legacy" {
                    debug!(id = %self.id, topic = other, "unknown topic, treating as legacy");
                }
                Topic::Legacy
            }
            None => Topic::Legacy,
        };
        Message {
            id: self.id,
            content: self.content,
            is_bot: self.is_bot,
            timestamp: self.timestamp.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            topic,
        }
    }
}

/// Per-topic counts for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSummary {
    /// The topic.
    pub topic: Topic,

    /// Number of stored messages tagged with it.
    pub message_count: usize,

    /// Timestamp of the newest stored message.
    pub last_message_at: DateTime<Utc>,
}

/// Reads and writes the shared history record.
pub struct HistoryStore<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> HistoryStore<'a> {
    /// Wrap a key-value store.
    #[must_use]
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Every stored message in append order, migrated.
    ///
    /// A missing, unreadable or non-array record reads as empty. Entries
    /// that can't be read as a message are skipped; the rest still load.
    /// Entries without a timestamp get the unix epoch.
    #[must_use]
    pub fn all(&self) -> Vec<Message> {
        let raw = match self.store.get(CHAT_HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "chat history unreadable, treating as empty");
                return Vec::new();
            }
        };

        let entries = match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "chat history corrupt, treating as empty");
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value::<StoredMessage>(entry) {
                Ok(stored) => Some(stored.migrate()),
                Err(e) => {
                    warn!(index, error = %e, "skipping unreadable chat history entry");
                    None
                }
            })
            .collect()
    }

    /// Messages for `topic` plus any legacy entries, in stored order.
    #[must_use]
    pub fn load(&self, topic: Topic) -> Vec<Message> {
        self.all()
            .into_iter()
            .filter(|m| m.topic == topic || m.topic == Topic::Legacy)
            .collect()
    }

    /// Replace the stored slice for `topic` with `messages`.
    ///
    /// Other topics' entries keep their relative order; the new messages are
    /// appended after them and the oldest entries beyond the cap are dropped.
    /// Legacy entries re-submitted through `messages` replace their stored
    /// copy instead of being duplicated.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn save(&self, messages: &[Message], topic: Topic) -> Result<()> {
        let resubmitted: HashSet<&str> = messages.iter().map(|m| m.id.as_str()).collect();

        let mut combined: Vec<Message> = self
            .all()
            .into_iter()
            .filter(|m| m.topic != topic)
            .filter(|m| !(m.topic == Topic::Legacy && resubmitted.contains(m.id.as_str())))
            .collect();
        combined.extend_from_slice(messages);

        if combined.len() > MAX_STORED_MESSAGES {
            let excess = combined.len() - MAX_STORED_MESSAGES;
            debug!(excess, "chat history over cap, dropping oldest");
            combined.drain(..excess);
        }

        self.write(&combined)
    }

    /// Remove every entry for `topic`, leaving other topics untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn clear(&self, topic: Topic) -> Result<()> {
        if !matches!(self.store.get(CHAT_HISTORY_KEY), Ok(Some(_))) {
            return Ok(());
        }
        let remaining: Vec<Message> = self
            .all()
            .into_iter()
            .filter(|m| m.topic != topic)
            .collect();
        self.write(&remaining)
    }

    /// Count and recency per stored topic, ordered by topic.
    #[must_use]
    pub fn summary(&self) -> Vec<TopicSummary> {
        let mut by_topic: BTreeMap<Topic, TopicSummary> = BTreeMap::new();
        for msg in self.all() {
            by_topic
                .entry(msg.topic)
                .and_modify(|s| {
                    s.message_count += 1;
                    s.last_message_at = s.last_message_at.max(msg.timestamp);
                })
                .or_insert(TopicSummary {
                    topic: msg.topic,
                    message_count: 1,
                    last_message_at: msg.timestamp,
                });
        }
        by_topic.into_values().collect()
    }

    fn write(&self, messages: &[Message]) -> Result<()> {
        let json = serde_json::to_string(messages)?;
        self.store.put(CHAT_HISTORY_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use proptest::prelude::*;

    fn msgs(n: usize, topic: Topic) -> Vec<Message> {
        (0..n)
            .map(|i| Message::new(format!("{topic} #{i}"), i % 2 == 1, topic))
            .collect()
    }

    #[test]
    fn load_empty_store() {
        let store = MemoryBackend::new();
        assert!(HistoryStore::new(&store).load(Topic::General).is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = MemoryBackend::new();
        let history = HistoryStore::new(&store);
        let messages = msgs(4, Topic::MvpPlanning);

        history.save(&messages, Topic::MvpPlanning).unwrap();

        assert_eq!(history.load(Topic::MvpPlanning), messages);
        assert!(history.load(Topic::TechStack).is_empty());
    }

    #[test]
    fn save_replaces_only_its_topic() {
        let store = MemoryBackend::new();
        let history = HistoryStore::new(&store);
        let tech = msgs(3, Topic::TechStack);
        history.save(&tech, Topic::TechStack).unwrap();
        history.save(&msgs(2, Topic::MvpPlanning), Topic::MvpPlanning).unwrap();

        let replacement = msgs(1, Topic::MvpPlanning);
        history.save(&replacement, Topic::MvpPlanning).unwrap();

        assert_eq!(history.load(Topic::TechStack), tech);
        assert_eq!(history.load(Topic::MvpPlanning), replacement);
    }

    #[test]
    fn cap_drops_oldest_regardless_of_topic() {
        let store = MemoryBackend::new();
        let history = HistoryStore::new(&store);
        let journal = msgs(30, Topic::FocusJournal);
        history.save(&journal, Topic::FocusJournal).unwrap();

        let general = msgs(80, Topic::General);
        history.save(&general, Topic::General).unwrap();

        let all = history.all();
        assert_eq!(all.len(), MAX_STORED_MESSAGES);
        // The 10 oldest journal entries went first
        assert_eq!(history.load(Topic::FocusJournal), journal[10..].to_vec());
        assert_eq!(history.load(Topic::General), general);
    }

    #[test]
    fn clear_leaves_other_topics() {
        let store = MemoryBackend::new();
        let history = HistoryStore::new(&store);
        let general = msgs(2, Topic::General);
        history.save(&general, Topic::General).unwrap();
        history.save(&msgs(2, Topic::TechStack), Topic::TechStack).unwrap();

        history.clear(Topic::TechStack).unwrap();

        assert!(history.load(Topic::TechStack).is_empty());
        assert_eq!(history.load(Topic::General), general);
    }

    #[test]
    fn clear_without_record_writes_nothing() {
        let store = MemoryBackend::new();
        HistoryStore::new(&store).clear(Topic::General).unwrap();
        assert!(store.get(CHAT_HISTORY_KEY).unwrap().is_none());
    }

    #[test]
    fn corrupt_record_loads_as_empty() {
        let store = MemoryBackend::new();
        store.put(CHAT_HISTORY_KEY, "{ not json").unwrap();
        let history = HistoryStore::new(&store);

        assert!(history.load(Topic::General).is_empty());

        // And the next save overwrites it with a valid record
        let messages = msgs(1, Topic::General);
        history.save(&messages, Topic::General).unwrap();
        assert_eq!(history.load(Topic::General), messages);
    }

    #[test]
    fn malformed_entry_does_not_hide_other_topics() {
        let store = MemoryBackend::new();
        store
            .put(
                CHAT_HISTORY_KEY,
                r#"[
                    {"id":"1_user","content":"Rust or Go?","isBot":false,"timestamp":"2024-05-01T10:00:00Z","topic":"tech-stack"},
                    {"id":"2_bot","content":"Rust.","isBot":true,"timestamp":"2024-05-01T10:00:01Z","topic":"tech-stack"},
                    {"id":"3_user","content":"Slept badly","isBot":false,"timestamp":null,"topic":"focus-journal"},
                    {"id":"4_user","content":null,"topic":"focus-journal"},
                    null
                ]"#,
            )
            .unwrap();
        let history = HistoryStore::new(&store);

        assert_eq!(history.load(Topic::TechStack).len(), 2);
        let journal = history.load(Topic::FocusJournal);
        assert_eq!(journal.len(), 1);
        assert_eq!(journal[0].timestamp, DateTime::<Utc>::UNIX_EPOCH);

        history
            .save(&msgs(1, Topic::General), Topic::General)
            .unwrap();

        let tech = history.load(Topic::TechStack);
        assert_eq!(tech.len(), 2);
        assert_eq!(tech[1].content, "Rust.");
        assert_eq!(history.load(Topic::FocusJournal).len(), 1);
        assert_eq!(history.load(Topic::General).len(), 1);
    }

    #[test]
    fn non_array_record_loads_as_empty() {
        let store = MemoryBackend::new();
        store.put(CHAT_HISTORY_KEY, r#"{"id":"1_bot"}"#).unwrap();
        assert!(HistoryStore::new(&store).all().is_empty());
    }

    #[test]
    fn untagged_entries_migrate_to_legacy_and_show_everywhere() {
        let store = MemoryBackend::new();
        store
            .put(
                CHAT_HISTORY_KEY,
                r#"[
                    {"id":"1_bot","content":"old","isBot":true,"timestamp":"2024-05-01T10:00:00.000Z"},
                    {"id":"2_user","content":"tagged","isBot":false,"timestamp":"2024-05-01T10:01:00.000Z","context":"tech-stack"}
                ]"#,
            )
            .unwrap();
        let history = HistoryStore::new(&store);

        let general = history.load(Topic::General);
        assert_eq!(general.len(), 1);
        assert_eq!(general[0].topic, Topic::Legacy);

        let tech = history.load(Topic::TechStack);
        assert_eq!(tech.len(), 2);
        assert_eq!(tech[1].topic, Topic::TechStack);
    }

    #[test]
    fn resaving_loaded_legacy_entries_does_not_duplicate() {
        let store = MemoryBackend::new();
        store
            .put(
                CHAT_HISTORY_KEY,
                r#"[{"id":"1_bot","content":"old","isBot":true,"timestamp":"2024-05-01T10:00:00Z"}]"#,
            )
            .unwrap();
        let history = HistoryStore::new(&store);

        let mut loaded = history.load(Topic::MvpPlanning);
        loaded.push(Message::new("new", false, Topic::MvpPlanning));
        history.save(&loaded, Topic::MvpPlanning).unwrap();

        let all = history.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all.iter().filter(|m| m.id == "1_bot").count(), 1);
        // Still visible from other topics
        assert_eq!(history.load(Topic::General).len(), 1);
    }

    #[test]
    fn summary_counts_per_topic() {
        let store = MemoryBackend::new();
        let history = HistoryStore::new(&store);
        history.save(&msgs(3, Topic::TechStack), Topic::TechStack).unwrap();
        history.save(&msgs(1, Topic::General), Topic::General).unwrap();

        let summary = history.summary();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].topic, Topic::General);
        assert_eq!(summary[0].message_count, 1);
        assert_eq!(summary[1].topic, Topic::TechStack);
        assert_eq!(summary[1].message_count, 3);
    }

    fn topic_strategy() -> impl Strategy<Value = Topic> {
        prop::sample::select(Topic::SELECTABLE.to_vec())
    }

    proptest! {
        #[test]
        fn round_trip_under_cap(counts in prop::collection::vec((topic_strategy(), 0usize..20), 1..5)) {
            let store = MemoryBackend::new();
            let history = HistoryStore::new(&store);
            let mut expected: BTreeMap<Topic, Vec<Message>> = BTreeMap::new();

            for (topic, n) in counts {
                let messages = msgs(n, topic);
                history.save(&messages, topic).unwrap();
                expected.insert(topic, messages);
            }

            let total: usize = expected.values().map(Vec::len).sum();
            prop_assume!(total <= MAX_STORED_MESSAGES);
            for (topic, messages) in expected {
                prop_assert_eq!(history.load(topic), messages);
            }
        }

        #[test]
        fn never_exceeds_cap(sizes in prop::collection::vec((topic_strategy(), 0usize..80), 1..6)) {
            let store = MemoryBackend::new();
            let history = HistoryStore::new(&store);
            for (topic, n) in sizes {
                history.save(&msgs(n, topic), topic).unwrap();
                prop_assert!(history.all().len() <= MAX_STORED_MESSAGES);
            }
        }

        #[test]
        fn save_never_touches_other_topic(a in topic_strategy(), b in topic_strategy(), n in 0usize..30, m in 0usize..30) {
            prop_assume!(a != b);
            let store = MemoryBackend::new();
            let history = HistoryStore::new(&store);
            let kept = msgs(n, b);
            history.save(&kept, b).unwrap();

            history.save(&msgs(m, a), a).unwrap();

            prop_assert_eq!(history.load(b), kept);
        }
    }
}

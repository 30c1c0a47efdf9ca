//! Chat message and topic types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

/// Conversation category. Selects the greeting and the framing sent with
/// each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    /// General idea assistance.
    General,

    /// MVP planning.
    MvpPlanning,

    /// Tech-stack advice.
    TechStack,

    /// Focus-journal coaching.
    FocusJournal,

    /// Entries written before messages carried a topic. Visible from every
    /// topic on load; never selectable by the user.
    Legacy,
}

impl Topic {
    /// Topics a user can open a conversation in.
    pub const SELECTABLE: [Topic; 4] = [
        Topic::General,
        Topic::MvpPlanning,
        Topic::TechStack,
        Topic::FocusJournal,
    ];

    /// Wire name of the topic.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::General => "general",
            Topic::MvpPlanning => "mvp-planning",
            Topic::TechStack => "tech-stack",
            Topic::FocusJournal => "focus-journal",
            Topic::Legacy => "legacy",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::SELECTABLE
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| {
                format!(
                    "unknown topic '{s}' (expected one of: general, mvp-planning, tech-stack, focus-journal)"
                )
            })
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique id: creation millis plus a role suffix.
    pub id: String,

    /// Message text.
    pub content: String,

    /// True for assistant-authored messages.
    pub is_bot: bool,

    /// When the message was created.
    pub timestamp: DateTime<Utc>,

    /// Conversation the message belongs to.
    pub topic: Topic,
}

impl Message {
    /// Create a message stamped with the current time.
    #[must_use]
    pub fn new(content: impl Into<String>, is_bot: bool, topic: Topic) -> Self {
        let millis = next_millis();
        let role = if is_bot { "bot" } else { "user" };
        Self {
            id: format!("{millis}_{role}"),
            content: content.into(),
            is_bot,
            timestamp: DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now),
            topic,
        }
    }
}

/// Last millisecond value handed out, so ids stay unique within a process.
static LAST_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Current unix millis, bumped past the previous value when the clock hasn't moved.
fn next_millis() -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_MILLIS.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_MILLIS.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

//! Single in-flight request per topic.

use crate::chat::message::Topic;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Topics that currently have a completion request outstanding.
///
/// Shared by every conversation in the process, so two views of the same
/// topic can't overlap while different topics proceed independently.
#[derive(Debug, Default)]
pub struct InFlight {
    topics: Mutex<HashSet<Topic>>,
}

impl InFlight {
    /// Empty set, shared through an `Arc` so guards can release into it.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Claim `topic`, or `None` if a request for it is already running.
    #[must_use]
    pub fn try_acquire(self: &Arc<Self>, topic: Topic) -> Option<InFlightGuard> {
        let mut topics = self.topics.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if !topics.insert(topic) {
            return None;
        }
        Some(InFlightGuard {
            owner: Arc::clone(self),
            topic,
        })
    }

    /// Whether a request for `topic` is running.
    #[must_use]
    pub fn is_busy(&self, topic: Topic) -> bool {
        self.topics
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .contains(&topic)
    }
}

/// Releases its topic when dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    owner: Arc<InFlight>,
    topic: Topic,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.owner
            .topics
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&self.topic);
    }
}

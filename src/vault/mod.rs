//! Idea vault: ideas, MVP plans, tech stacks and focus-journal entries.

pub mod collection;
pub mod models;

pub use collection::{Collection, Record};
pub use models::{
    Idea, IdeaStatus, JournalDraft, JournalEntry, Mood, MvpDraft, MvpPlan, MvpStatus, TechStack,
    TechStackDraft, active_mvp_count, entries_this_week, idea_status_counts, parse_tags,
};

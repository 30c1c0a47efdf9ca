//! Vault record types.

use crate::error::{Error, Result};
use crate::vault::collection::Record;
use crate::storage::{IDEAS_KEY, JOURNAL_KEY, MVP_PLANS_KEY, TECH_STACKS_KEY};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn require(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidInput(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Trim items and drop blanks.
fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a comma-separated tag string.
#[must_use]
pub fn parse_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Idea lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdeaStatus {
    #[default]
    Brainstorming,
    Validating,
    Building,
    Shipped,
}

impl IdeaStatus {
    /// Every value, in display order.
    pub const ALL: [IdeaStatus; 4] = [
        IdeaStatus::Brainstorming,
        IdeaStatus::Validating,
        IdeaStatus::Building,
        IdeaStatus::Shipped,
    ];

    /// Lowercase name used in storage and on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IdeaStatus::Brainstorming => "brainstorming",
            IdeaStatus::Validating => "validating",
            IdeaStatus::Building => "building",
            IdeaStatus::Shipped => "shipped",
        }
    }
}

impl fmt::Display for IdeaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdeaStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        IdeaStatus::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown idea status '{s}'"))
    }
}

/// A startup idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    /// Random UUID.
    pub id: String,

    pub title: String,

    pub description: String,

    /// Free-form category, possibly empty.
    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub status: IdeaStatus,

    /// Trimmed, non-empty tags.
    #[serde(default)]
    pub tags: Vec<String>,

    pub created_at: DateTime<Utc>,

    /// Bumped by every update.
    pub updated_at: DateTime<Utc>,
}

impl Idea {
    /// Create an idea. Title and description are required; `tags` is a
    /// comma-separated list.
    ///
    /// # Errors
    ///
    /// Returns an error if title or description is blank.
    pub fn new(title: &str, description: &str, category: &str, tags: &str) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: new_id(),
            title: require("title", title)?,
            description: require("description", description)?,
            category: category.trim().to_string(),
            status: IdeaStatus::default(),
            tags: parse_tags(tags),
            created_at: now,
            updated_at: now,
        })
    }
}

impl Record for Idea {
    const KEY: &'static str = IDEAS_KEY;
    const KIND: &'static str = "idea";

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Number of ideas in each status, in lifecycle order.
#[must_use]
pub fn idea_status_counts(ideas: &[Idea]) -> Vec<(IdeaStatus, usize)> {
    IdeaStatus::ALL
        .into_iter()
        .map(|status| (status, ideas.iter().filter(|i| i.status == status).count()))
        .collect()
}

/// MVP plan lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MvpStatus {
    #[default]
    Planning,
    Building,
    Testing,
    Shipped,
}

impl MvpStatus {
    /// Every value, in display order.
    pub const ALL: [MvpStatus; 4] = [
        MvpStatus::Planning,
        MvpStatus::Building,
        MvpStatus::Testing,
        MvpStatus::Shipped,
    ];

    /// Lowercase name used in storage and on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MvpStatus::Planning => "planning",
            MvpStatus::Building => "building",
            MvpStatus::Testing => "testing",
            MvpStatus::Shipped => "shipped",
        }
    }
}

impl fmt::Display for MvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MvpStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        MvpStatus::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown MVP status '{s}'"))
    }
}

/// A minimum-viable-product plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MvpPlan {
    /// Random UUID.
    pub id: String,

    pub name: String,

    pub description: String,

    /// Who the MVP is for.
    #[serde(default)]
    pub target_audience: String,

    /// Features in scope, in priority order.
    #[serde(default)]
    pub core_features: Vec<String>,

    /// Free-form, e.g. "6 weeks".
    #[serde(default)]
    pub timeline: String,

    /// Free-form, e.g. "$5k".
    #[serde(default)]
    pub budget: String,

    /// How the plan will be judged.
    #[serde(default)]
    pub success_metrics: Vec<String>,

    #[serde(default)]
    pub status: MvpStatus,

    pub created_at: DateTime<Utc>,
}

/// Fields for a new MVP plan, with the same meaning as on [`MvpPlan`].
#[derive(Debug, Clone, Default)]
pub struct MvpDraft {
    pub name: String,
    pub description: String,
    pub target_audience: String,
    pub core_features: Vec<String>,
    pub timeline: String,
    pub budget: String,
    pub success_metrics: Vec<String>,
}

impl MvpPlan {
    /// Create a plan in [`MvpStatus::Planning`].
    ///
    /// # Errors
    ///
    /// Returns an error if name or description is blank.
    pub fn new(draft: MvpDraft) -> Result<Self> {
        Ok(Self {
            id: new_id(),
            name: require("name", &draft.name)?,
            description: require("description", &draft.description)?,
            target_audience: draft.target_audience.trim().to_string(),
            core_features: clean_list(&draft.core_features),
            timeline: draft.timeline.trim().to_string(),
            budget: draft.budget.trim().to_string(),
            success_metrics: clean_list(&draft.success_metrics),
            status: MvpStatus::Planning,
            created_at: Utc::now(),
        })
    }
}

impl Record for MvpPlan {
    const KEY: &'static str = MVP_PLANS_KEY;
    const KIND: &'static str = "MVP plan";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Plans currently being built or tested.
#[must_use]
pub fn active_mvp_count(plans: &[MvpPlan]) -> usize {
    plans
        .iter()
        .filter(|p| matches!(p.status, MvpStatus::Building | MvpStatus::Testing))
        .count()
}

/// Technology choices for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechStack {
    /// Random UUID.
    pub id: String,

    pub project_name: String,

    pub description: String,

    /// Technologies per category, in the order entered.
    #[serde(default)]
    pub frontend: Vec<String>,
    #[serde(default)]
    pub backend: Vec<String>,
    #[serde(default)]
    pub database: Vec<String>,
    #[serde(default)]
    pub cloud: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new tech stack, with the same meaning as on [`TechStack`].
#[derive(Debug, Clone, Default)]
pub struct TechStackDraft {
    pub project_name: String,
    pub description: String,
    pub frontend: Vec<String>,
    pub backend: Vec<String>,
    pub database: Vec<String>,
    pub cloud: Vec<String>,
    pub tools: Vec<String>,
}

impl TechStack {
    /// # Errors
    ///
    /// Returns an error if project name or description is blank.
    pub fn new(draft: TechStackDraft) -> Result<Self> {
        Ok(Self {
            id: new_id(),
            project_name: require("project name", &draft.project_name)?,
            description: require("description", &draft.description)?,
            frontend: clean_list(&draft.frontend),
            backend: clean_list(&draft.backend),
            database: clean_list(&draft.database),
            cloud: clean_list(&draft.cloud),
            tools: clean_list(&draft.tools),
            created_at: Utc::now(),
        })
    }

    /// Non-empty categories with their entries, in display order.
    #[must_use]
    pub fn categories(&self) -> Vec<(&'static str, &[String])> {
        [
            ("frontend", self.frontend.as_slice()),
            ("backend", self.backend.as_slice()),
            ("database", self.database.as_slice()),
            ("cloud", self.cloud.as_slice()),
            ("tools", self.tools.as_slice()),
        ]
        .into_iter()
        .filter(|(_, items)| !items.is_empty())
        .collect()
    }
}

impl Record for TechStack {
    const KEY: &'static str = TECH_STACKS_KEY;
    const KIND: &'static str = "tech stack";

    fn id(&self) -> &str {
        &self.id
    }
}

/// How the day felt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Excited,
    Happy,
    #[default]
    Neutral,
    Frustrated,
    Tired,
}

impl Mood {
    /// Every value, in display order.
    pub const ALL: [Mood; 5] = [
        Mood::Excited,
        Mood::Happy,
        Mood::Neutral,
        Mood::Frustrated,
        Mood::Tired,
    ];

    /// Lowercase name used in storage and on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Excited => "excited",
            Mood::Happy => "happy",
            Mood::Neutral => "neutral",
            Mood::Frustrated => "frustrated",
            Mood::Tired => "tired",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown mood '{s}'"))
    }
}

/// Default energy level on a 1-10 scale.
pub const DEFAULT_ENERGY_LEVEL: u8 = 5;

fn default_energy_level() -> u8 {
    DEFAULT_ENERGY_LEVEL
}

/// One focus-journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// Random UUID.
    pub id: String,

    pub title: String,

    /// Day the entry is about (UTC).
    pub date: NaiveDate,

    #[serde(default)]
    pub goals: Vec<String>,

    #[serde(default)]
    pub accomplishments: Vec<String>,

    #[serde(default)]
    pub blockers: Vec<String>,

    /// Free-form notes.
    #[serde(default)]
    pub reflections: String,

    /// 1-10.
    #[serde(default = "default_energy_level")]
    pub energy_level: u8,

    #[serde(default)]
    pub mood: Mood,

    pub created_at: DateTime<Utc>,
}

/// Fields for a new journal entry, with the same meaning as on [`JournalEntry`].
#[derive(Debug, Clone)]
pub struct JournalDraft {
    pub title: String,
    pub goals: Vec<String>,
    pub accomplishments: Vec<String>,
    pub blockers: Vec<String>,
    pub reflections: String,
    pub energy_level: u8,
    pub mood: Mood,
}

impl Default for JournalDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            goals: Vec::new(),
            accomplishments: Vec::new(),
            blockers: Vec::new(),
            reflections: String::new(),
            energy_level: DEFAULT_ENERGY_LEVEL,
            mood: Mood::default(),
        }
    }
}

impl JournalEntry {
    /// Create an entry dated today (UTC).
    ///
    /// # Errors
    ///
    /// Returns an error if the title is blank or the energy level is outside 1-10.
    pub fn new(draft: JournalDraft) -> Result<Self> {
        if !(1..=10).contains(&draft.energy_level) {
            return Err(Error::InvalidInput(format!(
                "energy level must be between 1 and 10, got {}",
                draft.energy_level
            )));
        }
        let now = Utc::now();
        Ok(Self {
            id: new_id(),
            title: require("title", &draft.title)?,
            date: now.date_naive(),
            goals: clean_list(&draft.goals),
            accomplishments: clean_list(&draft.accomplishments),
            blockers: clean_list(&draft.blockers),
            reflections: draft.reflections.trim().to_string(),
            energy_level: draft.energy_level,
            mood: draft.mood,
            created_at: now,
        })
    }
}

impl Record for JournalEntry {
    const KEY: &'static str = JOURNAL_KEY;
    const KIND: &'static str = "journal entry";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Entries dated on or after the most recent Sunday relative to `today`.
#[must_use]
pub fn entries_this_week(entries: &[JournalEntry], today: NaiveDate) -> usize {
    let week_start =
        today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
    entries.iter().filter(|e| e.date >= week_start).count()
}

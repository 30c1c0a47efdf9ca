//! `forge journal` command implementation.

use crate::cli::{open_unlocked, preview};
use crate::config::Config;
use crate::error::Result;
use crate::vault::{Collection, JournalDraft, JournalEntry, entries_this_week};
use chrono::Local;

const REFLECTION_PREVIEW_LEN: usize = 80;

/// Record today's focus-journal entry.
///
/// # Errors
///
/// Returns an error if the vault is locked, the title is blank, the energy
/// level is out of range, or storage fails.
pub fn add(config: &Config, draft: JournalDraft) -> Result<()> {
    let store = open_unlocked(config)?;
    let entry = Collection::new(&store).insert(JournalEntry::new(draft)?)?;
    println!("Logged \"{}\" for {}", entry.title, entry.date);
    Ok(())
}

/// List journal entries, newest first.
///
/// # Errors
///
/// Returns an error if the vault is locked or storage fails.
pub fn list(config: &Config, limit: Option<usize>) -> Result<()> {
    let store = open_unlocked(config)?;
    let mut entries: Vec<JournalEntry> = Collection::new(&store).list()?;

    if entries.is_empty() {
        println!("No journal entries yet. Add one with `forge journal add`.");
        return Ok(());
    }

    let this_week = entries_this_week(&entries, Local::now().date_naive());
    println!("{} entr(ies), {this_week} this week", entries.len());
    println!("{}", "─".repeat(70));

    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    for entry in entries.iter().take(limit.unwrap_or(usize::MAX)) {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

fn format_entry(entry: &JournalEntry) -> String {
    let mut lines = vec![format!(
        "{}  {}  (energy {}/10, {})",
        entry.date, entry.title, entry.energy_level, entry.mood
    )];
    let sections = [
        ("goals", &entry.goals),
        ("done", &entry.accomplishments),
        ("blockers", &entry.blockers),
    ];
    for (label, items) in sections {
        if !items.is_empty() {
            lines.push(format!("            {label}: {}", items.join("; ")));
        }
    }
    if !entry.reflections.is_empty() {
        lines.push(format!(
            "            {}",
            preview(&entry.reflections, REFLECTION_PREVIEW_LEN)
        ));
    }
    lines.join("\n")
}

//! `forge idea` command implementation.

use crate::cli::{open_unlocked, preview, short_id};
use crate::config::Config;
use crate::error::Result;
use crate::vault::{Collection, Idea, IdeaStatus, idea_status_counts};

const DESCRIPTION_PREVIEW_LEN: usize = 60;

/// Record a new idea.
///
/// # Errors
///
/// Returns an error if the vault is locked, a required field is blank, or
/// storage fails.
pub fn add(
    config: &Config,
    title: &str,
    description: &str,
    category: &str,
    tags: &str,
) -> Result<()> {
    let store = open_unlocked(config)?;
    let idea = Collection::new(&store).insert(Idea::new(title, description, category, tags)?)?;
    println!("Added idea {} \"{}\"", short_id(&idea.id), idea.title);
    Ok(())
}

/// List ideas, optionally filtered by status.
///
/// # Errors
///
/// Returns an error if the vault is locked or storage fails.
pub fn list(config: &Config, status: Option<IdeaStatus>) -> Result<()> {
    let store = open_unlocked(config)?;
    let ideas: Vec<Idea> = Collection::new(&store).list()?;

    if ideas.is_empty() {
        println!("No ideas yet. Add one with `forge idea add`.");
        return Ok(());
    }

    println!("{}", format_counts(&ideas));
    println!("{}", "─".repeat(70));
    for idea in ideas.iter().filter(|i| status.is_none_or(|s| i.status == s)) {
        println!("{}", format_idea(idea));
    }
    Ok(())
}

/// Move an idea to another status.
///
/// # Errors
///
/// Returns an error if the vault is locked, the id doesn't match exactly
/// one idea, or storage fails.
pub fn set_status(config: &Config, id: &str, status: IdeaStatus) -> Result<()> {
    let store = open_unlocked(config)?;
    let ideas = Collection::new(&store);
    let mut idea: Idea = ideas.find(id)?;
    let previous = idea.status;
    idea.status = status;
    let idea = ideas.update(idea)?;
    println!("\"{}\": {previous} -> {status}", idea.title);
    Ok(())
}

/// Delete an idea.
///
/// # Errors
///
/// Returns an error if the vault is locked, the id doesn't match exactly
/// one idea, or storage fails.
pub fn remove(config: &Config, id: &str) -> Result<()> {
    let store = open_unlocked(config)?;
    let ideas = Collection::new(&store);
    let idea: Idea = ideas.find(id)?;
    ideas.remove(&idea.id)?;
    println!("Removed idea \"{}\"", idea.title);
    Ok(())
}

fn format_counts(ideas: &[Idea]) -> String {
    let parts: Vec<String> = idea_status_counts(ideas)
        .into_iter()
        .map(|(status, n)| format!("{status}: {n}"))
        .collect();
    format!("{} idea(s)  ({})", ideas.len(), parts.join(", "))
}

fn format_idea(idea: &Idea) -> String {
    let mut line = format!(
        "{}  {:<13} {}",
        short_id(&idea.id),
        idea.status.as_str(),
        idea.title
    );
    if !idea.category.is_empty() {
        line.push_str(&format!(" [{}]", idea.category));
    }
    if !idea.tags.is_empty() {
        line.push_str(&format!(" #{}", idea.tags.join(" #")));
    }
    line.push_str(&format!(
        "\n          {}",
        preview(&idea.description, DESCRIPTION_PREVIEW_LEN)
    ));
    line
}

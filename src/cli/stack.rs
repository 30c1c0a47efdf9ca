//! `forge stack` command implementation.

use crate::cli::{open_unlocked, short_id};
use crate::config::Config;
use crate::error::Result;
use crate::vault::{Collection, TechStack, TechStackDraft};

/// Record a tech stack.
///
/// # Errors
///
/// Returns an error if the vault is locked, the project name is blank, or
/// storage fails.
pub fn add(config: &Config, draft: TechStackDraft) -> Result<()> {
    let store = open_unlocked(config)?;
    let stack = Collection::new(&store).insert(TechStack::new(draft)?)?;
    println!(
        "Added tech stack {} for \"{}\"",
        short_id(&stack.id),
        stack.project_name
    );
    Ok(())
}

/// List tech stacks.
///
/// # Errors
///
/// Returns an error if the vault is locked or storage fails.
pub fn list(config: &Config) -> Result<()> {
    let store = open_unlocked(config)?;
    let stacks: Vec<TechStack> = Collection::new(&store).list()?;

    if stacks.is_empty() {
        println!("No tech stacks yet. Add one with `forge stack add`.");
        return Ok(());
    }

    for stack in &stacks {
        println!("{}", format_stack(stack));
    }
    Ok(())
}

fn format_stack(stack: &TechStack) -> String {
    let mut lines = vec![format!("{}  {}", short_id(&stack.id), stack.project_name)];
    if !stack.description.is_empty() {
        lines.push(format!("          {}", stack.description));
    }
    for (category, items) in stack.categories() {
        lines.push(format!("          {category:<9} {}", items.join(", ")));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_lists_only_filled_categories() {
        let stack = TechStack::new(TechStackDraft {
            project_name: "Forge".into(),
            description: "Mobile idea vault".into(),
            frontend: vec!["React Native".into()],
            database: vec!["SQLite".into(), "Redis".into()],
            ..TechStackDraft::default()
        })
        .unwrap();
        let text = format_stack(&stack);
        assert!(text.contains("Mobile idea vault"));
        assert!(text.contains("frontend  React Native"));
        assert!(text.contains("database  SQLite, Redis"));
        assert!(!text.contains("backend"));
    }
}

//! `forge mvp` command implementation.

use crate::cli::{open_unlocked, short_id};
use crate::config::Config;
use crate::error::Result;
use crate::vault::{Collection, MvpDraft, MvpPlan, MvpStatus, active_mvp_count};

/// Record a new MVP plan.
///
/// # Errors
///
/// Returns an error if the vault is locked, name or description is blank,
/// or storage fails.
pub fn add(config: &Config, draft: MvpDraft) -> Result<()> {
    let store = open_unlocked(config)?;
    let plan = Collection::new(&store).insert(MvpPlan::new(draft)?)?;
    println!("Added MVP plan {} \"{}\"", short_id(&plan.id), plan.name);
    Ok(())
}

/// List MVP plans.
///
/// # Errors
///
/// Returns an error if the vault is locked or storage fails.
pub fn list(config: &Config) -> Result<()> {
    let store = open_unlocked(config)?;
    let plans: Vec<MvpPlan> = Collection::new(&store).list()?;

    if plans.is_empty() {
        println!("No MVP plans yet. Add one with `forge mvp add`.");
        return Ok(());
    }

    println!(
        "{} plan(s), {} in progress",
        plans.len(),
        active_mvp_count(&plans)
    );
    println!("{}", "─".repeat(70));
    for plan in &plans {
        println!("{}", format_plan(plan));
    }
    Ok(())
}

/// Move a plan to another status.
///
/// # Errors
///
/// Returns an error if the vault is locked, the id doesn't match exactly
/// one plan, or storage fails.
pub fn set_status(config: &Config, id: &str, status: MvpStatus) -> Result<()> {
    let store = open_unlocked(config)?;
    let plans = Collection::new(&store);
    let mut plan: MvpPlan = plans.find(id)?;
    let previous = plan.status;
    plan.status = status;
    let plan = plans.update(plan)?;
    println!("\"{}\": {previous} -> {status}", plan.name);
    Ok(())
}

fn format_plan(plan: &MvpPlan) -> String {
    let mut lines = vec![format!(
        "{}  {:<9} {}",
        short_id(&plan.id),
        plan.status.as_str(),
        plan.name
    )];
    let details = [
        ("audience", plan.target_audience.as_str()),
        ("timeline", plan.timeline.as_str()),
        ("budget", plan.budget.as_str()),
    ];
    for (label, value) in details {
        if !value.is_empty() {
            lines.push(format!("          {label}: {value}"));
        }
    }
    if !plan.core_features.is_empty() {
        lines.push(format!("          features: {}", plan.core_features.join(", ")));
    }
    if !plan.success_metrics.is_empty() {
        lines.push(format!("          metrics: {}", plan.success_metrics.join(", ")));
    }
    lines.join("\n")
}

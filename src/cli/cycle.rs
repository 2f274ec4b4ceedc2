//! Cycle lifecycle commands - new, list, show, complete

use crate::services::cycle_service;
use crate::{Colorize, Result};
use std::env;

pub fn run_new(
    feature: &str,
    priority: &str,
    description: Option<&str>,
    json: bool,
) -> Result<()> {
    let project_root = env::current_dir()?;
    let report = cycle_service::new_cycle(feature, priority, description, &project_root)?;

    if json {
        return crate::cli::print_json(&report);
    }

    println!("{}", format!("✨ Created cycle: {}", report.cycle_id).green());
    println!("   Phase:    {}", report.phase);
    println!("   Priority: {}", report.priority);
    println!("   Path:     {}", report.path);
    Ok(())
}

pub fn run_list(all: bool, json: bool) -> Result<()> {
    let project_root = env::current_dir()?;
    let report = cycle_service::list_cycles(all, &project_root)?;

    if json {
        return crate::cli::print_json(&report);
    }

    if report.cycles.is_empty() {
        println!("{}", "No cycles found.".yellow());
        println!("Create one with: {}", "forge new \"feature-name\"".cyan());
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "Cycles ({} total, {} active):",
            report.count, report.active_count
        )
        .cyan()
        .bold()
    );
    println!();
    for cycle in &report.cycles {
        let partition = if cycle.active {
            "active".green()
        } else {
            "completed".bright_black()
        };
        let status = cycle.status.as_deref().unwrap_or("-");
        println!(
            "   [{}] {}: {} ({}, {}%)",
            partition, cycle.id, cycle.feature, status, cycle.overall_progress
        );
    }
    Ok(())
}

pub fn run_show(cycle_id: &str, json: bool) -> Result<()> {
    let project_root = env::current_dir()?;
    let report = cycle_service::show_cycle(cycle_id, &project_root)?;

    if json {
        return crate::cli::print_json(&report);
    }

    crate::cli::status::print_cycle(&report);

    // show also lists each checklist item
    for phase in &report.phases {
        if phase.tasks.is_empty() {
            continue;
        }
        println!("{}", phase.name.bold());
        for task in &phase.tasks {
            let mark = if task.done { "x".green() } else { " ".normal() };
            println!("   {}. [{}] {}", task.ordinal, mark, task.text);
        }
        println!();
    }
    Ok(())
}

pub fn run_complete(cycle_id: &str, notes: Option<&str>, force: bool, json: bool) -> Result<()> {
    let project_root = env::current_dir()?;

    match cycle_service::complete_cycle(cycle_id, notes, force, &project_root) {
        Ok(report) => {
            if json {
                return crate::cli::print_json(&report);
            }
            println!("{}", format!("📦 Completed: {}", report.cycle_id).green().bold());
            println!("   Archived to: {}", report.path);
            if report.forced {
                println!();
                println!("{}", "⚠️  Validation bypassed with --force:".yellow());
                for issue in &report.validation.issues {
                    println!("   • {}", issue);
                }
            }
            Ok(())
        }
        Err(err) => crate::cli::phase::explain_validation_failure(err, json, "complete"),
    }
}

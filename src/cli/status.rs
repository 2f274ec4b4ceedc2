//! Status command - progress overview for one or all cycles

use crate::models::report::CycleReport;
use crate::models::PhaseName;
use crate::services::cycle_service;
use crate::{Colorize, Result};
use std::env;

pub fn run(cycle_id: Option<&str>, all: bool, json: bool) -> Result<()> {
    let project_root = env::current_dir()?;

    if let Some(id) = cycle_id {
        let report = cycle_service::show_cycle(id, &project_root)?;
        if json {
            return crate::cli::print_json(&report);
        }
        print_cycle(&report);
        return Ok(());
    }

    let report = cycle_service::list_cycles(all, &project_root)?;
    if json {
        return crate::cli::print_json(&report);
    }

    if report.cycles.is_empty() {
        println!("{}", "No active cycles found.".yellow());
        println!("Create one with: {}", "forge new \"feature-name\"".cyan());
        return Ok(());
    }

    for cycle in &report.cycles {
        print_cycle(cycle);
    }
    Ok(())
}

/// Banner + per-phase progress bars for one cycle.
pub fn print_cycle(report: &CycleReport) {
    let completed_marker = if report.active { "" } else { " [COMPLETED]" };

    println!();
    println!("{}", "═".repeat(50));
    println!("📦 {}{}", report.feature.bold(), completed_marker.bright_black());
    println!("{}", "═".repeat(50));
    println!("ID:       {}", report.id);
    if let Some(priority) = &report.priority {
        println!("Priority: {}", priority);
    }
    println!(
        "Overall:  [{}] {}% ({}/{} tasks)",
        crate::cli::progress_bar(report.overall_progress, 10),
        report.overall_progress,
        report.completed_tasks,
        report.total_tasks
    );
    println!();

    for (name, phase) in PhaseName::ALL.iter().zip(&report.phases) {
        let marker = match phase.state {
            crate::models::PhaseState::Active => " ← CURRENT".cyan().to_string(),
            crate::models::PhaseState::Complete => " ✓".green().to_string(),
            crate::models::PhaseState::Pending => String::new(),
        };
        println!(
            "{} {:12} [{}] {:3}%{}",
            crate::cli::phase_icon(*name),
            phase.name,
            crate::cli::progress_bar(phase.progress, 10),
            phase.progress,
            marker
        );
    }
    println!();
}

//! Phase commands - advance, complete-task, add-task, validate

use crate::error::ForgeError;
use crate::models::PhaseName;
use crate::services::phase_service;
use crate::{Colorize, Result};
use std::env;

pub fn run_advance(cycle_id: Option<&str>, force: bool, json: bool) -> Result<()> {
    let project_root = env::current_dir()?;

    match phase_service::advance(cycle_id, force, &project_root) {
        Ok(report) => {
            if json {
                return crate::cli::print_json(&report);
            }
            println!(
                "{}",
                format!(
                    "⏭️  Advanced: {} → {}",
                    report.previous_phase, report.current_phase
                )
                .green()
                .bold()
            );
            let v = &report.validation;
            println!(
                "   Previous phase: {}/{} tasks ({}%)",
                v.completed_tasks, v.total_tasks, v.progress
            );
            if report.forced {
                println!();
                println!("{}", "⚠️  Validation bypassed with --force:".yellow());
                for issue in &v.issues {
                    println!("   • {}", issue);
                }
            }
            for warning in &v.warnings {
                println!("   {} {}", "⚠".yellow(), warning);
            }
            Ok(())
        }
        Err(err) => explain_validation_failure(err, json, "advance"),
    }
}

pub fn run_complete_task(cycle_id: Option<&str>, task: &str, json: bool) -> Result<()> {
    let project_root = env::current_dir()?;
    let report = phase_service::complete_task(cycle_id, task, &project_root)?;

    if json {
        return crate::cli::print_json(&report);
    }
    println!(
        "{}",
        format!("✓ Completed [{}]: {}", report.phase, report.task).green()
    );
    Ok(())
}

pub fn run_add_task(
    cycle_id: Option<&str>,
    task: &str,
    phase: Option<&str>,
    json: bool,
) -> Result<()> {
    let project_root = env::current_dir()?;

    let phase = match phase {
        Some(raw) => Some(PhaseName::parse(raw).ok_or_else(|| {
            anyhow::anyhow!(
                "invalid phase '{}', expected one of: {}",
                raw,
                PhaseName::ALL.map(|p| p.as_str()).join(", ")
            )
        })?),
        None => None,
    };

    let report = phase_service::add_task(cycle_id, task, phase, &project_root)?;

    if json {
        return crate::cli::print_json(&report);
    }
    println!(
        "{}",
        format!("＋ Added to {} (task {}): {}", report.phase, report.ordinal, report.task).green()
    );
    Ok(())
}

pub fn run_validate(cycle_id: Option<&str>, json: bool) -> Result<()> {
    let project_root = env::current_dir()?;
    let report = phase_service::validate(cycle_id, &project_root)?;

    if json {
        return crate::cli::print_json(&report);
    }

    let v = &report.validation;
    let verdict = if v.valid {
        "PASS".green().bold()
    } else {
        "FAIL".red().bold()
    };
    println!("Phase: {} [{}]", report.current_phase.cyan(), verdict);
    println!(
        "Progress: [{}] {}% ({}/{})",
        crate::cli::progress_bar(v.progress, 10),
        v.progress,
        v.completed_tasks,
        v.total_tasks
    );

    if !v.issues.is_empty() {
        println!();
        println!("{}", "❌ Blocking issues:".red());
        for issue in &v.issues {
            println!("   • {}", issue);
        }
    }
    if !v.warnings.is_empty() {
        println!();
        println!("{}", "⚠️  Warnings:".yellow());
        for warning in &v.warnings {
            println!("   • {}", warning);
        }
    }

    println!();
    if v.valid {
        println!("{}", "✓ Ready to advance to next phase".green());
    } else {
        println!("{}", "✗ Cannot advance - resolve issues first".red());
    }
    Ok(())
}

/// Shared pretty-printer for gate refusals: list the blocking issues and the
/// force hint before propagating a short error for the exit path.
pub fn explain_validation_failure(err: anyhow::Error, json: bool, action: &str) -> Result<()> {
    if json {
        return Err(err);
    }
    if let Some(ForgeError::ValidationFailed(report)) = err.downcast_ref::<ForgeError>() {
        println!("{}", format!("✗ Cannot {} - validation failed", action).red().bold());
        for issue in &report.issues {
            println!("   • {}", issue);
        }
        println!();
        println!("{}", "Use --force to override".bright_black());
        anyhow::bail!("phase validation failed")
    }
    Err(err)
}

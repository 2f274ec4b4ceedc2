//! Phase service - advancement, task completion and insertion, validation
//!
//! Each operation is one read-modify-write pass: read the full document,
//! compute a patch against that exact text, write the patched text back.
//! Nothing touches the file until the final write, so any failure leaves the
//! previous version intact.

use crate::error::ForgeError;
use crate::models::report::{AdvanceReport, ValidationReport};
use crate::models::{ForgeConfig, PhaseName};
use crate::parser::parse_cycle;
use crate::store::{self, Store};
use crate::workflow::{gates, ledger, GateOptions, TaskSelector};
use crate::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// Outcome of `forge complete-task` / `forge add-task`.
#[derive(Debug, Serialize)]
pub struct TaskActionReport {
    pub cycle_id: String,
    pub phase: String,
    pub task: String,
    pub ordinal: usize,
}

/// Outcome of `forge validate`.
#[derive(Debug, Serialize)]
pub struct ValidateReport {
    pub cycle_id: String,
    pub current_phase: String,
    pub validation: ValidationReport,
}

/// Advance the resolved cycle to its next phase.
pub fn advance(cycle_id: Option<&str>, force: bool, project_root: &Path) -> Result<AdvanceReport> {
    let store = Store::open(project_root)?;
    let path = store.resolve_active(cycle_id)?;
    let (id, text) = read_document(&path)?;
    let cycle = parse_cycle(id.as_str(), &text);

    let options = gate_options(project_root)?;
    let (current, validation) = gates::can_advance(&cycle, options)?;
    if !validation.valid && !force {
        return Err(ForgeError::ValidationFailed(validation).into());
    }

    let next = current
        .next()
        .ok_or_else(|| ForgeError::TerminalPhase(current.to_string()))?;
    let patch = gates::advance_patch(&cycle, current)?;
    let updated = patch.apply(&text)?;
    std::fs::write(&path, updated)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(AdvanceReport {
        cycle_id: id,
        previous_phase: current.to_string(),
        current_phase: next.to_string(),
        forced: force && !validation.valid,
        validation,
    })
}

/// Mark an incomplete task in the current phase as done. `raw_selector` is an
/// ordinal when all digits, otherwise a text query.
pub fn complete_task(
    cycle_id: Option<&str>,
    raw_selector: &str,
    project_root: &Path,
) -> Result<TaskActionReport> {
    let store = Store::open(project_root)?;
    let path = store.resolve_active(cycle_id)?;
    let (id, text) = read_document(&path)?;
    let cycle = parse_cycle(id.as_str(), &text);

    let current = cycle.current_phase().ok_or_else(|| {
        ForgeError::MalformedDocument("could not determine current phase".to_string())
    })?;

    let selector = TaskSelector::parse(raw_selector);
    let (task, patch) = ledger::complete_task(current, &selector)?;
    let report = TaskActionReport {
        cycle_id: id,
        phase: current.name.to_string(),
        task: task.text.clone(),
        ordinal: task.ordinal,
    };

    let updated = patch.apply(&text)?;
    std::fs::write(&path, updated)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(report)
}

/// Append a new task to the named phase, defaulting to the current one.
pub fn add_task(
    cycle_id: Option<&str>,
    task_text: &str,
    phase: Option<PhaseName>,
    project_root: &Path,
) -> Result<TaskActionReport> {
    let store = Store::open(project_root)?;
    let path = store.resolve_active(cycle_id)?;
    let (id, text) = read_document(&path)?;
    let cycle = parse_cycle(id.as_str(), &text);

    let target = match phase {
        Some(name) => name,
        None => {
            cycle
                .current_phase()
                .ok_or_else(|| {
                    ForgeError::MalformedDocument(
                        "could not determine current phase".to_string(),
                    )
                })?
                .name
        }
    };

    let target_phase = cycle.phase(target);
    let patch = ledger::insert_task(&text, target_phase, task_text)?;
    let ordinal = target_phase.tasks.len() + 1;

    let updated = patch.apply(&text)?;
    std::fs::write(&path, updated)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(TaskActionReport {
        cycle_id: id,
        phase: target.to_string(),
        task: task_text.to_string(),
        ordinal,
    })
}

/// Evaluate the current phase's gate without mutating anything.
pub fn validate(cycle_id: Option<&str>, project_root: &Path) -> Result<ValidateReport> {
    let store = Store::open(project_root)?;
    let path = store.resolve_active(cycle_id)?;
    let (id, text) = read_document(&path)?;
    let cycle = parse_cycle(id.as_str(), &text);

    let options = gate_options(project_root)?;
    let (current, validation) = gates::validate_current(&cycle, options)?;

    Ok(ValidateReport {
        cycle_id: id,
        current_phase: current.to_string(),
        validation,
    })
}

fn gate_options(project_root: &Path) -> Result<GateOptions> {
    let config = ForgeConfig::load(project_root)?;
    Ok(GateOptions::from(&config.settings))
}

fn read_document(path: &Path) -> Result<(String, String)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok((store::cycle_id_of(path), text))
}

//! Cycle service - Business logic for cycle lifecycle operations

use crate::error::ForgeError;
use crate::models::report::{CycleReport, ValidationReport};
use crate::parser::parse_cycle;
use crate::store::{self, Store};
use crate::workflow::{gates, GateOptions, Patch};
use crate::{Context, Result};
use chrono::Local;
use regex::Regex;
use serde::Serialize;
use std::path::Path;

/// Outcome of `forge new`.
#[derive(Debug, Serialize)]
pub struct NewCycleReport {
    pub cycle_id: String,
    pub feature: String,
    pub phase: String,
    pub priority: String,
    pub path: String,
}

/// Outcome of `forge list` / `forge status` over several cycles.
#[derive(Debug, Serialize)]
pub struct ListReport {
    pub count: usize,
    pub active_count: usize,
    pub cycles: Vec<CycleReport>,
}

/// Outcome of `forge complete`.
#[derive(Debug, Serialize)]
pub struct CompleteReport {
    pub cycle_id: String,
    pub completed_at: String,
    pub path: String,
    pub forced: bool,
    pub validation: ValidationReport,
}

/// Convert a feature name to a kebab-case slug, capped at 50 characters.
pub fn slugify(text: &str) -> Result<String> {
    let lowered = text.to_lowercase();
    let strip = Regex::new(r"[^\w\s-]")?;
    let collapse = Regex::new(r"[\s_]+")?;

    let stripped = strip.replace_all(lowered.trim(), "");
    let slug = collapse.replace_all(&stripped, "-");
    Ok(slug.chars().take(50).collect())
}

/// Author a new cycle document from the template.
pub fn new_cycle(
    feature: &str,
    priority: &str,
    description: Option<&str>,
    project_root: &Path,
) -> Result<NewCycleReport> {
    let store = Store::open(project_root)?;

    let base_id = format!("{}-{}", slugify(feature)?, Local::now().format("%Y%m%d"));
    let cycle_id = store::resolve_cycle_id_conflict(&base_id, &store.active_dir())?;

    let date = Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();
    let vars = [
        ("FEATURE", feature),
        ("DATE", date.as_str()),
        ("PRIORITY", priority),
    ];
    let mut content = store.render_cycle_template(&vars)?;

    if let Some(description) = description {
        content = content.replace(
            "## Notes\n",
            &format!("## Notes\n\n### Description\n{}\n", description),
        );
    }

    let path = store.active_dir().join(format!("{}.md", cycle_id));
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(NewCycleReport {
        cycle_id,
        feature: feature.to_string(),
        phase: "Focus".to_string(),
        priority: priority.to_string(),
        path: path.display().to_string(),
    })
}

/// Parse every cycle document, active partition first.
pub fn list_cycles(include_completed: bool, project_root: &Path) -> Result<ListReport> {
    let store = Store::open(project_root)?;

    let mut cycles = Vec::new();
    for path in store.active_cycles()? {
        cycles.push(load_report(&path, true)?);
    }
    if include_completed {
        for path in store.completed_cycles()? {
            cycles.push(load_report(&path, false)?);
        }
    }

    let active_count = cycles.iter().filter(|c| c.active).count();
    Ok(ListReport {
        count: cycles.len(),
        active_count,
        cycles,
    })
}

/// Full report for one cycle, searched across both partitions.
pub fn show_cycle(cycle_id: &str, project_root: &Path) -> Result<CycleReport> {
    let store = Store::open(project_root)?;
    let (path, active) = store
        .find_cycle(cycle_id)
        .ok_or_else(|| ForgeError::CycleNotFound(cycle_id.to_string()))?;
    load_report(&path, active)
}

/// The terminal action: gate on Evaluate, stamp the completion section, flip
/// the status label, and move the document to the completed partition.
pub fn complete_cycle(
    cycle_id: &str,
    notes: Option<&str>,
    force: bool,
    project_root: &Path,
) -> Result<CompleteReport> {
    let store = Store::open(project_root)?;
    let active_path = store.active_dir().join(format!("{}.md", cycle_id));
    if !active_path.exists() {
        return Err(ForgeError::CycleNotFound(cycle_id.to_string()).into());
    }

    let text = std::fs::read_to_string(&active_path)
        .with_context(|| format!("Failed to read {}", active_path.display()))?;
    let cycle = parse_cycle(cycle_id, &text);

    let config = crate::models::ForgeConfig::load(project_root)?;
    let validation = gates::can_complete(&cycle, GateOptions::from(&config.settings));
    if !validation.valid && !force {
        return Err(ForgeError::ValidationFailed(validation).into());
    }

    let completed_at = Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();
    let mut section = format!("\n## Completion\n\n**Completed**: {}\n", completed_at);
    if let Some(notes) = notes {
        section.push_str(&format!("**Notes**: {}\n", notes));
    }

    let mut patch = Patch::new().insert(text.len(), section);
    if let Some(status) = &cycle.status {
        patch = patch.replace(status.span.clone(), "Completed");
    }
    let updated = patch.apply(&text)?;

    // Write the archived copy before unlinking the active one; a crash in
    // between leaves both, never neither
    let completed_path = store.completed_dir().join(format!("{}.md", cycle_id));
    std::fs::write(&completed_path, updated)
        .with_context(|| format!("Failed to write {}", completed_path.display()))?;
    std::fs::remove_file(&active_path)
        .with_context(|| format!("Failed to remove {}", active_path.display()))?;

    Ok(CompleteReport {
        cycle_id: cycle_id.to_string(),
        completed_at,
        path: completed_path.display().to_string(),
        forced: force && !validation.valid,
        validation,
    })
}

fn load_report(path: &Path, active: bool) -> Result<CycleReport> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let cycle = parse_cycle(store::cycle_id_of(path), &text);
    Ok(CycleReport::from_cycle(&cycle, active))
}

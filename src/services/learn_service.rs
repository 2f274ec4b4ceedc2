//! Learn service - knowledge base operations over .forge/learnings.md
//!
//! The learnings file is a companion document: entries are appended under
//! the `## Learnings` heading (newest first) and the cycle core never reads
//! it. `list` and `retro` are read-only conveniences for the CLI.

use crate::error::ForgeError;
use crate::parser::parse_cycle;
use crate::store::{self, Store};
use crate::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

pub const CATEGORIES: [&str; 6] = [
    "success",
    "failure",
    "pattern",
    "antipattern",
    "tool",
    "process",
];

fn category_icon(category: &str) -> &'static str {
    match category {
        "success" => "✅",
        "failure" => "❌",
        "pattern" => "🔄",
        "antipattern" => "⚠️",
        "tool" => "🔧",
        "process" => "📋",
        _ => "📝",
    }
}

/// One knowledge base entry.
#[derive(Debug, Clone, Serialize)]
pub struct Learning {
    pub title: String,
    pub category: String,
    pub date: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Outcome of `forge learn add`.
#[derive(Debug, Serialize)]
pub struct LearningAdded {
    pub title: String,
    pub category: String,
    pub path: String,
}

/// Outcome of `forge learn retro`.
#[derive(Debug, Serialize)]
pub struct RetroReport {
    pub cycle_id: String,
    pub feature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: u32,
    /// Phase name → (completed, total), in workflow order.
    pub phases: BTreeMap<String, (usize, usize)>,
    pub prompts: Vec<&'static str>,
}

/// Append a learning entry under the `## Learnings` heading, newest first.
pub fn add_learning(
    category: &str,
    title: &str,
    description: &str,
    context: Option<&str>,
    project_root: &Path,
) -> Result<LearningAdded> {
    if !CATEGORIES.contains(&category) {
        anyhow::bail!(
            "Invalid category '{}'. Must be one of: {}",
            category,
            CATEGORIES.join(", ")
        );
    }

    let store = Store::open(project_root)?;
    let learnings_path = store.learnings_path();
    let content = if learnings_path.exists() {
        std::fs::read_to_string(&learnings_path).context("Failed to read learnings.md")?
    } else {
        Store::learnings_template().to_string()
    };

    let date = Local::now().format("%Y-%m-%d").to_string();
    let mut entry = format!(
        "\n### {} {}\n**Category**: {}\n**Date**: {}\n\n{}\n",
        category_icon(category),
        title,
        category,
        date,
        description
    );
    if let Some(context) = context {
        entry.push_str(&format!("\n**Context**: {}\n", context));
    }
    entry.push_str("\n---\n");

    let updated = if content.contains("## Learnings\n") {
        content.replace("## Learnings\n", &format!("## Learnings\n{}", entry))
    } else {
        format!("{}\n## Learnings\n{}", content, entry)
    };

    std::fs::write(&learnings_path, updated).context("Failed to write learnings.md")?;

    Ok(LearningAdded {
        title: title.to_string(),
        category: category.to_string(),
        path: learnings_path.display().to_string(),
    })
}

/// Read back entries, optionally filtered by category.
pub fn list_learnings(category: Option<&str>, project_root: &Path) -> Result<Vec<Learning>> {
    let store = Store::open(project_root)?;
    let learnings_path = store.learnings_path();
    if !learnings_path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(&learnings_path).context("Failed to read learnings.md")?;
    let mut learnings = Vec::new();
    let mut current: Option<Learning> = None;
    let mut body: Vec<String> = Vec::new();
    let mut past_metadata = false;

    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("### ") {
            finish_entry(&mut learnings, current.take(), &mut body);
            // Strip the leading category icon if present
            let title = rest
                .split_once(' ')
                .filter(|(icon, _)| icon.chars().all(|c| !c.is_alphanumeric()))
                .map(|(_, t)| t)
                .unwrap_or(rest);
            current = Some(Learning {
                title: title.trim().to_string(),
                category: String::new(),
                date: String::new(),
                description: String::new(),
                context: None,
            });
            past_metadata = false;
        } else if line == "---" && current.is_some() {
            finish_entry(&mut learnings, current.take(), &mut body);
        } else if let Some(entry) = current.as_mut() {
            if let Some(value) = line.strip_prefix("**Category**: ") {
                entry.category = value.trim().to_string();
            } else if let Some(value) = line.strip_prefix("**Date**: ") {
                entry.date = value.trim().to_string();
                past_metadata = true;
            } else if let Some(value) = line.strip_prefix("**Context**: ") {
                entry.context = Some(value.trim().to_string());
            } else if past_metadata {
                body.push(line.to_string());
            }
        }
    }
    finish_entry(&mut learnings, current.take(), &mut body);

    if let Some(category) = category {
        learnings.retain(|l| l.category == category);
    }
    Ok(learnings)
}

fn finish_entry(learnings: &mut Vec<Learning>, entry: Option<Learning>, body: &mut Vec<String>) {
    if let Some(mut entry) = entry {
        entry.description = body.join("\n").trim().to_string();
        body.clear();
        // Entries without a category are author prose, not tool output
        if !entry.category.is_empty() {
            learnings.push(entry);
        }
    } else {
        body.clear();
    }
}

/// Summarize a cycle for a retrospective, searched across both partitions.
pub fn retrospective(cycle_id: Option<&str>, project_root: &Path) -> Result<RetroReport> {
    let store = Store::open(project_root)?;

    let path = match cycle_id {
        Some(id) => {
            store
                .find_cycle(id)
                .ok_or_else(|| ForgeError::CycleNotFound(id.to_string()))?
                .0
        }
        None => store.resolve_active(None)?,
    };

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let cycle = parse_cycle(store::cycle_id_of(&path), &text);

    let mut phases = BTreeMap::new();
    for phase in &cycle.phases {
        phases.insert(
            format!("{}-{}", phase.name.index() + 1, phase.name),
            (phase.completed_count(), phase.tasks.len()),
        );
    }

    Ok(RetroReport {
        cycle_id: cycle.id.clone(),
        feature: cycle.feature.clone(),
        created: cycle.created.as_ref().map(|m| m.value.clone()),
        total_tasks: cycle.total_tasks(),
        completed_tasks: cycle.completed_tasks(),
        completion_rate: cycle.overall_progress(),
        phases,
        prompts: vec![
            "What practices, tools, or approaches worked well in this cycle?",
            "What challenges did you face? What would you do differently?",
            "What specific improvements will you make in the next cycle?",
            "What key insights should be captured for future reference?",
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{cycle_service, init_service};
    use tempfile::TempDir;

    fn init_project() -> TempDir {
        let temp = TempDir::new().unwrap();
        init_service::init_project(temp.path(), Some("test"), false).unwrap();
        temp
    }

    #[test]
    fn test_add_and_list_learnings() {
        let temp = init_project();

        add_learning(
            "pattern",
            "Span-based patching",
            "Record byte offsets at parse time, splice at write time.",
            Some("Any in-place document edit"),
            temp.path(),
        )
        .unwrap();
        add_learning("failure", "Regex everywhere", "Slow and ambiguous.", None, temp.path())
            .unwrap();

        let all = list_learnings(None, temp.path()).unwrap();
        assert_eq!(all.len(), 2);
        // Newest first
        assert_eq!(all[0].title, "Regex everywhere");
        assert_eq!(all[1].title, "Span-based patching");
        assert_eq!(all[1].category, "pattern");
        assert_eq!(
            all[1].context.as_deref(),
            Some("Any in-place document edit")
        );
        assert!(all[1].description.contains("splice at write time"));

        let patterns = list_learnings(Some("pattern"), temp.path()).unwrap();
        assert_eq!(patterns.len(), 1);
    }

    #[test]
    fn test_invalid_category_rejected() {
        let temp = init_project();
        let err = add_learning("vibes", "t", "d", None, temp.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid category"));
    }

    #[test]
    fn test_retrospective_counts() {
        let temp = init_project();
        let report = cycle_service::new_cycle("Retro target", "medium", None, temp.path()).unwrap();

        crate::services::phase_service::complete_task(None, "Gather requirements", temp.path())
            .unwrap();

        let retro = retrospective(Some(&report.cycle_id), temp.path()).unwrap();
        assert_eq!(retro.feature, "Retro target");
        assert_eq!(retro.completed_tasks, 1);
        assert!(retro.total_tasks > retro.completed_tasks);
        assert_eq!(retro.phases.len(), 5);
        assert_eq!(retro.phases["1-Focus"].0, 1);
        assert_eq!(retro.prompts.len(), 4);
    }
}

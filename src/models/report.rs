//! Reportable summaries over a parsed cycle
//!
//! These are the structured results the services hand back to the CLI, which
//! renders them as colored text or serializes them with serde_json.

use crate::models::cycle::{Cycle, Phase, PhaseState};
use serde::{Deserialize, Serialize};

/// One checklist item, stripped of spans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReport {
    pub ordinal: usize,
    pub text: String,
    pub done: bool,
}

/// Per-phase progress summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseReport {
    pub name: String,
    pub state: PhaseState,
    pub completed: usize,
    pub total: usize,
    pub progress: u32,
    pub tasks: Vec<TaskReport>,
}

impl PhaseReport {
    pub fn from_phase(phase: &Phase) -> Self {
        Self {
            name: phase.name.as_str().to_string(),
            state: phase.state,
            completed: phase.completed_count(),
            total: phase.tasks.len(),
            progress: phase.progress(),
            tasks: phase
                .tasks
                .iter()
                .map(|t| TaskReport {
                    ordinal: t.ordinal,
                    text: t.text.clone(),
                    done: t.done,
                })
                .collect(),
        }
    }
}

/// Full status summary for one cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub id: String,
    pub feature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<String>,
    pub phases: Vec<PhaseReport>,
    pub overall_progress: u32,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// False once the document lives under cycles/completed/.
    pub active: bool,
}

impl CycleReport {
    pub fn from_cycle(cycle: &Cycle, active: bool) -> Self {
        Self {
            id: cycle.id.clone(),
            feature: cycle.feature.clone(),
            created: cycle.created.as_ref().map(|m| m.value.clone()),
            status: cycle.status.as_ref().map(|m| m.value.clone()),
            priority: cycle.priority.as_ref().map(|m| m.value.clone()),
            current_phase: cycle
                .current_phase()
                .map(|p| p.name.as_str().to_string()),
            phases: cycle.phases.iter().map(PhaseReport::from_phase).collect(),
            overall_progress: cycle.overall_progress(),
            total_tasks: cycle.total_tasks(),
            completed_tasks: cycle.completed_tasks(),
            active,
        }
    }
}

/// Gate evaluation for one phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub phase: String,
    /// True when no blocking issues remain.
    pub valid: bool,
    pub completed_tasks: usize,
    pub total_tasks: usize,
    pub progress: u32,
    /// Blocking issues; advancement refuses on these unless forced.
    pub issues: Vec<String>,
    /// Advisory findings that never block.
    pub warnings: Vec<String>,
}

/// Outcome of a successful phase advancement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceReport {
    pub cycle_id: String,
    pub previous_phase: String,
    pub current_phase: String,
    /// True when validation issues were bypassed with --force; the bypassed
    /// issues stay in `validation` for the audit trail.
    pub forced: bool,
    pub validation: ValidationReport,
}

//! Phase state machine - linear ordering and advancement gates
//!
//! The five phases advance strictly in order, one Active at a time. Each
//! phase carries a gate: a minimum number of completed tasks plus mandatory
//! task categories matched by case-insensitive substring against completed
//! task text. Gates produce a [`ValidationReport`]; advancement refuses on
//! blocking issues unless the caller forces past them.

use crate::error::ForgeError;
use crate::models::report::ValidationReport;
use crate::models::{Cycle, ForgeSettings, PhaseName, PhaseState, Task};
use crate::workflow::patch::Patch;

/// Advancement requirements for one phase.
#[derive(Debug, Clone, Copy)]
pub struct GatePolicy {
    pub phase: PhaseName,
    /// Completed-task floor for leaving the phase.
    pub minimum_tasks: usize,
    /// Categories that must appear among completed task text. Blocking.
    pub mandatory: &'static [&'static str],
    /// Categories reported as warnings when absent. Never blocking.
    pub recommended: &'static [&'static str],
    pub summary: &'static str,
}

/// The gate table, one row per phase in workflow order.
pub const POLICIES: [GatePolicy; 5] = [
    GatePolicy {
        phase: PhaseName::Focus,
        minimum_tasks: 1,
        mandatory: &["test scenarios"],
        recommended: &["architecture"],
        summary: "Requirements, architecture, test scenarios",
    },
    GatePolicy {
        phase: PhaseName::Orchestrate,
        minimum_tasks: 3,
        mandatory: &[],
        recommended: &[],
        summary: "Task breakdown, dependencies, test strategy",
    },
    GatePolicy {
        phase: PhaseName::Refine,
        minimum_tasks: 2,
        mandatory: &["tests", "code review"],
        recommended: &[],
        summary: "TDD implementation (RED-GREEN-REFACTOR)",
    },
    GatePolicy {
        phase: PhaseName::Generate,
        minimum_tasks: 1,
        mandatory: &["documentation"],
        recommended: &[],
        summary: "Build artifacts, deployment prep",
    },
    GatePolicy {
        phase: PhaseName::Evaluate,
        minimum_tasks: 1,
        mandatory: &[],
        recommended: &[],
        summary: "Metrics, retrospective, learnings",
    },
];

pub fn policy(phase: PhaseName) -> &'static GatePolicy {
    &POLICIES[phase.index()]
}

/// Validation knobs sourced from config settings.
#[derive(Debug, Clone, Copy)]
pub struct GateOptions {
    /// Zero incomplete tasks tolerated on top of the per-phase minimums.
    pub strict: bool,
    /// Clearing this skips the Focus "test scenarios" mandatory check.
    pub require_test_scenarios: bool,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            strict: false,
            require_test_scenarios: true,
        }
    }
}

impl From<&ForgeSettings> for GateOptions {
    fn from(settings: &ForgeSettings) -> Self {
        Self {
            strict: settings.strict_validation,
            require_test_scenarios: settings.require_test_scenarios,
        }
    }
}

/// Evaluate one phase's gate.
pub fn validate_phase(cycle: &Cycle, name: PhaseName, options: GateOptions) -> ValidationReport {
    let phase = cycle.phase(name);
    let policy = policy(name);
    let completed: Vec<&Task> = phase.tasks.iter().filter(|t| t.done).collect();
    let incomplete = phase.tasks.len() - completed.len();

    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    if completed.len() < policy.minimum_tasks {
        issues.push(format!(
            "Need at least {} tasks completed (have {})",
            policy.minimum_tasks,
            completed.len()
        ));
    }

    for category in policy.mandatory {
        if name == PhaseName::Focus
            && *category == "test scenarios"
            && !options.require_test_scenarios
        {
            continue;
        }
        if !has_category(&completed, category) {
            issues.push(format!("MANDATORY: '{}' task not completed", category));
        }
    }

    if options.strict && incomplete > 0 {
        issues.push(format!(
            "{} task(s) still incomplete (strict validation)",
            incomplete
        ));
    }

    for category in policy.recommended {
        if !has_category(&completed, category) {
            warnings.push(format!("'{}' task not marked complete", category));
        }
    }

    ValidationReport {
        phase: name.as_str().to_string(),
        valid: issues.is_empty(),
        completed_tasks: completed.len(),
        total_tasks: phase.tasks.len(),
        progress: phase.progress(),
        issues,
        warnings,
    }
}

/// Gate evaluation for the current phase, wherever it is. Errors only when
/// the document has no Active phase.
pub fn validate_current(
    cycle: &Cycle,
    options: GateOptions,
) -> Result<(PhaseName, ValidationReport), ForgeError> {
    let current = cycle.current_phase().ok_or_else(|| {
        ForgeError::MalformedDocument("could not determine current phase".to_string())
    })?;

    let mut report = validate_phase(cycle, current.name, options);
    append_shape_warnings(cycle, &mut report);
    Ok((current.name, report))
}

/// Gate evaluation for an advancement attempt. Additionally errors when the
/// cycle is already at the terminal phase.
pub fn can_advance(
    cycle: &Cycle,
    options: GateOptions,
) -> Result<(PhaseName, ValidationReport), ForgeError> {
    let (current, report) = validate_current(cycle, options)?;
    if current == PhaseName::Evaluate {
        return Err(ForgeError::TerminalPhase(current.to_string()));
    }
    Ok((current, report))
}

/// The terminal gate: completing/archiving a cycle requires Evaluate to pass
/// the same rule every other phase does.
pub fn can_complete(cycle: &Cycle, options: GateOptions) -> ValidationReport {
    let mut report = validate_phase(cycle, PhaseName::Evaluate, options);
    append_shape_warnings(cycle, &mut report);
    report
}

/// Build the edit performing one phase transition: current state token →
/// Complete, next state token → Active, status metadata mirrored when
/// present. Untouched bytes are preserved by construction.
pub fn advance_patch(cycle: &Cycle, current: PhaseName) -> Result<Patch, ForgeError> {
    let next = current.next().ok_or_else(|| {
        ForgeError::TerminalPhase(current.to_string())
    })?;

    let current_span = cycle
        .phase(current)
        .state_span
        .clone()
        .ok_or_else(|| missing_header(current))?;
    let next_span = cycle
        .phase(next)
        .state_span
        .clone()
        .ok_or_else(|| missing_header(next))?;

    let mut patch = Patch::new()
        .replace(current_span, PhaseState::Complete.as_str())
        .replace(next_span, PhaseState::Active.as_str());

    if let Some(status) = &cycle.status {
        patch = patch.replace(status.span.clone(), next.as_str());
    }

    Ok(patch)
}

fn missing_header(phase: PhaseName) -> ForgeError {
    ForgeError::MalformedDocument(format!("phase '{}' has no header in this document", phase))
}

fn has_category(completed: &[&Task], category: &str) -> bool {
    let needle = category.to_lowercase();
    completed
        .iter()
        .any(|t| t.text.to_lowercase().contains(&needle))
}

/// Warn about hand-edited documents that violate the linear shape.
fn append_shape_warnings(cycle: &Cycle, report: &mut ValidationReport) {
    let active = cycle
        .phases
        .iter()
        .filter(|p| p.state == PhaseState::Active)
        .count();
    if active > 1 {
        report
            .warnings
            .push(format!("{} phases are marked Active; expected one", active));
    }

    if let Some(current) = cycle.current_phase() {
        let behind = cycle.phases[..current.name.index()]
            .iter()
            .filter(|p| p.state != PhaseState::Complete)
            .count();
        if behind > 0 {
            report.warnings.push(format!(
                "{} phase(s) before {} are not marked Complete",
                behind, current.name
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_cycle;

    fn doc_with_focus(tasks: &str) -> String {
        format!(
            "# Feature: Gate test\n\n**Status**: Focus\n\n### Phase 1: Focus [Active]\n{}\n### Phase 2: Orchestrate [Pending]\n",
            tasks
        )
    }

    #[test]
    fn test_minimum_not_met_blocks() {
        // 2 tasks, 1 complete, against a minimum of 2 (Refine)
        let text = "\
### Phase 3: Refine [Active]
- [x] Write unit tests
- [ ] Code review completed
";
        let cycle = parse_cycle("t", text);
        let report = validate_phase(&cycle, PhaseName::Refine, GateOptions::default());
        assert!(!report.valid);
        assert!(report
            .issues
            .iter()
            .any(|i| i.contains("at least 2 tasks completed (have 1)")));
    }

    #[test]
    fn test_mandatory_category_blocks() {
        let text = doc_with_focus("- [x] Gather requirements\n");
        let cycle = parse_cycle("t", &text);
        let report = validate_phase(&cycle, PhaseName::Focus, GateOptions::default());
        assert!(!report.valid);
        assert!(report
            .issues
            .iter()
            .any(|i| i.contains("MANDATORY: 'test scenarios'")));
    }

    #[test]
    fn test_mandatory_category_matched_in_completed_text() {
        let text = doc_with_focus(
            "- [x] Define test scenarios (MANDATORY)\n- [x] Design architecture\n",
        );
        let cycle = parse_cycle("t", &text);
        let report = validate_phase(&cycle, PhaseName::Focus, GateOptions::default());
        assert!(report.valid, "issues: {:?}", report.issues);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_recommended_category_only_warns() {
        let text = doc_with_focus("- [x] Define test scenarios (MANDATORY)\n");
        let cycle = parse_cycle("t", &text);
        let report = validate_phase(&cycle, PhaseName::Focus, GateOptions::default());
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("architecture"));
    }

    #[test]
    fn test_require_test_scenarios_can_be_disabled() {
        let text = doc_with_focus("- [x] Gather requirements\n");
        let cycle = parse_cycle("t", &text);
        let options = GateOptions {
            require_test_scenarios: false,
            ..GateOptions::default()
        };
        let report = validate_phase(&cycle, PhaseName::Focus, options);
        assert!(report.valid, "issues: {:?}", report.issues);
    }

    #[test]
    fn test_strict_mode_rejects_incomplete_tasks() {
        let text = doc_with_focus(
            "- [x] Define test scenarios (MANDATORY)\n- [ ] Identify security risks\n",
        );
        let cycle = parse_cycle("t", &text);
        let options = GateOptions {
            strict: true,
            ..GateOptions::default()
        };
        let report = validate_phase(&cycle, PhaseName::Focus, options);
        assert!(!report.valid);
        assert!(report.issues.iter().any(|i| i.contains("strict validation")));
    }

    #[test]
    fn test_can_advance_without_active_phase_is_malformed() {
        let cycle = parse_cycle("t", "just prose\n");
        let err = can_advance(&cycle, GateOptions::default()).unwrap_err();
        assert!(matches!(err, ForgeError::MalformedDocument(_)));
    }

    #[test]
    fn test_evaluate_is_terminal_for_advance() {
        let text = "### Phase 5: Evaluate [Active]\n- [x] Retrospective\n";
        let cycle = parse_cycle("t", text);
        let err = can_advance(&cycle, GateOptions::default()).unwrap_err();
        assert!(matches!(err, ForgeError::TerminalPhase(_)));
    }

    #[test]
    fn test_advance_patch_flips_exactly_the_marker_lines() {
        let text = doc_with_focus("- [x] Define test scenarios (MANDATORY)\n");
        let cycle = parse_cycle("t", &text);
        let (current, report) = can_advance(&cycle, GateOptions::default()).unwrap();
        assert!(report.valid);

        let patch = advance_patch(&cycle, current).unwrap();
        let out = patch.apply(&text).unwrap();

        let changed: Vec<(&str, &str)> = text
            .lines()
            .zip(out.lines())
            .filter(|(a, b)| a != b)
            .collect();
        assert_eq!(changed.len(), 3);
        assert!(changed
            .iter()
            .any(|(_, b)| b.contains("Phase 1: Focus [Complete]")));
        assert!(changed
            .iter()
            .any(|(_, b)| b.contains("Phase 2: Orchestrate [Active]")));
        assert!(changed.iter().any(|(_, b)| b.contains("**Status**: Orchestrate")));

        // The result is one Complete-prefix, one Active, Pending-suffix
        let reparsed = parse_cycle("t", &out);
        assert_eq!(reparsed.phase(PhaseName::Focus).state, PhaseState::Complete);
        assert_eq!(
            reparsed.current_phase().unwrap().name,
            PhaseName::Orchestrate
        );
        assert!(reparsed.phases[2..]
            .iter()
            .all(|p| p.state == PhaseState::Pending));
    }

    #[test]
    fn test_advance_patch_without_status_touches_two_lines() {
        let text = "\
### Phase 1: Focus [Active]
- [x] Define test scenarios (MANDATORY)

### Phase 2: Orchestrate [Pending]
";
        let cycle = parse_cycle("t", text);
        let patch = advance_patch(&cycle, PhaseName::Focus).unwrap();
        let out = patch.apply(text).unwrap();
        let changed = text
            .lines()
            .zip(out.lines())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(changed, 2);
    }

    #[test]
    fn test_advance_into_missing_header_is_malformed() {
        let text = "### Phase 1: Focus [Active]\n- [x] Define test scenarios\n";
        let cycle = parse_cycle("t", text);
        let err = advance_patch(&cycle, PhaseName::Focus).unwrap_err();
        assert!(matches!(err, ForgeError::MalformedDocument(_)));
    }

    #[test]
    fn test_complete_gate_runs_on_evaluate() {
        let text = "### Phase 5: Evaluate [Active]\n- [ ] Retrospective\n";
        let cycle = parse_cycle("t", text);
        let report = can_complete(&cycle, GateOptions::default());
        assert_eq!(report.phase, "Evaluate");
        assert!(!report.valid);
    }

    #[test]
    fn test_shape_warning_for_multiple_active() {
        let text = "\
### Phase 1: Focus [Active]
- [x] Define test scenarios
### Phase 2: Orchestrate [Active]
";
        let cycle = parse_cycle("t", text);
        let (_, report) = can_advance(&cycle, GateOptions::default()).unwrap();
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("2 phases are marked Active")));
    }

    #[test]
    fn test_policy_table_order_matches_phases() {
        for (i, policy) in POLICIES.iter().enumerate() {
            assert_eq!(policy.phase.index(), i);
        }
        assert_eq!(policy(PhaseName::Orchestrate).minimum_tasks, 3);
    }
}

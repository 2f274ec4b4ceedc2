//! Parse-result model for a cycle document
//!
//! These types are a transient view over one document's text. They carry the
//! byte spans of every marker the parser recognized so that edits can be
//! expressed as targeted span replacements against the original text. The
//! document on disk is the source of truth; this model is never serialized
//! back wholesale.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// The five fixed workflow phases, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseName {
    Focus,
    Orchestrate,
    Refine,
    Generate,
    Evaluate,
}

impl PhaseName {
    /// All phases in workflow order.
    pub const ALL: [PhaseName; 5] = [
        PhaseName::Focus,
        PhaseName::Orchestrate,
        PhaseName::Refine,
        PhaseName::Generate,
        PhaseName::Evaluate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseName::Focus => "Focus",
            PhaseName::Orchestrate => "Orchestrate",
            PhaseName::Refine => "Refine",
            PhaseName::Generate => "Generate",
            PhaseName::Evaluate => "Evaluate",
        }
    }

    /// 0-based position in the workflow.
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|p| p == self).unwrap_or(0)
    }

    /// Phase following this one, or None for Evaluate.
    pub fn next(&self) -> Option<PhaseName> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// Case-insensitive lookup, e.g. for a `--phase` argument.
    pub fn parse(s: &str) -> Option<PhaseName> {
        Self::ALL
            .iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .copied()
    }
}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-phase progress state as written in the phase marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PhaseState {
    #[default]
    Pending,
    Active,
    Complete,
}

impl PhaseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseState::Pending => "Pending",
            PhaseState::Active => "Active",
            PhaseState::Complete => "Complete",
        }
    }

    /// Exact-token lookup as the marker grammar writes it.
    pub fn parse(s: &str) -> Option<PhaseState> {
        match s {
            "Pending" => Some(PhaseState::Pending),
            "Active" => Some(PhaseState::Active),
            "Complete" => Some(PhaseState::Complete),
            _ => None,
        }
    }
}

impl fmt::Display for PhaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One checklist item within a phase.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Stable 1-based position within its phase, assigned at parse time.
    pub ordinal: usize,
    pub text: String,
    pub done: bool,
    /// Byte span of the whole checklist line, excluding the trailing newline.
    pub line_span: Range<usize>,
    /// Byte span of the mark character between the brackets.
    pub mark_span: Range<usize>,
}

/// One workflow phase and its checklist.
#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    pub name: PhaseName,
    pub state: PhaseState,
    pub tasks: Vec<Task>,
    /// Byte span of the state token inside the header brackets, if the
    /// header was found.
    pub state_span: Option<Range<usize>>,
    /// Byte offset at the end of the header line, before its newline; the
    /// insertion anchor when the phase has no tasks.
    pub header_end: Option<usize>,
}

impl Phase {
    pub fn new(name: PhaseName) -> Self {
        Self {
            name,
            state: PhaseState::Pending,
            tasks: Vec::new(),
            state_span: None,
            header_end: None,
        }
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.done).count()
    }

    /// Completion percentage, 0 when the phase has no tasks.
    pub fn progress(&self) -> u32 {
        if self.tasks.is_empty() {
            return 0;
        }
        (self.completed_count() as f64 / self.tasks.len() as f64 * 100.0).round() as u32
    }
}

/// A metadata value with the span of the value text, so the writer can
/// rewrite it in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub value: String,
    pub span: Range<usize>,
}

/// Parse result for one cycle document.
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    /// Derived from the filename stem, not from document content.
    pub id: String,
    pub feature: String,
    pub created: Option<Metadata>,
    pub status: Option<Metadata>,
    pub priority: Option<Metadata>,
    /// Always exactly five, in workflow order.
    pub phases: Vec<Phase>,
}

impl Cycle {
    /// The single Active phase, if any. A document the user has hand-edited
    /// into several Active phases yields the first; validation flags it.
    pub fn current_phase(&self) -> Option<&Phase> {
        self.phases.iter().find(|p| p.state == PhaseState::Active)
    }

    pub fn phase(&self, name: PhaseName) -> &Phase {
        &self.phases[name.index()]
    }

    pub fn total_tasks(&self) -> usize {
        self.phases.iter().map(|p| p.tasks.len()).sum()
    }

    pub fn completed_tasks(&self) -> usize {
        self.phases.iter().map(|p| p.completed_count()).sum()
    }

    pub fn overall_progress(&self) -> u32 {
        let total = self.total_tasks();
        if total == 0 {
            return 0;
        }
        (self.completed_tasks() as f64 / total as f64 * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order_and_next() {
        assert_eq!(PhaseName::Focus.index(), 0);
        assert_eq!(PhaseName::Focus.next(), Some(PhaseName::Orchestrate));
        assert_eq!(PhaseName::Generate.next(), Some(PhaseName::Evaluate));
        assert_eq!(PhaseName::Evaluate.next(), None);
    }

    #[test]
    fn test_phase_name_parse_case_insensitive() {
        assert_eq!(PhaseName::parse("refine"), Some(PhaseName::Refine));
        assert_eq!(PhaseName::parse("ORCHESTRATE"), Some(PhaseName::Orchestrate));
        assert_eq!(PhaseName::parse("unknown"), None);
    }

    #[test]
    fn test_phase_state_parse_exact_token() {
        assert_eq!(PhaseState::parse("Active"), Some(PhaseState::Active));
        // The marker grammar is case-sensitive for state tokens
        assert_eq!(PhaseState::parse("active"), None);
    }

    #[test]
    fn test_progress_rounding() {
        let mut phase = Phase::new(PhaseName::Focus);
        for i in 0..3 {
            phase.tasks.push(Task {
                ordinal: i + 1,
                text: format!("task {}", i + 1),
                done: i == 0,
                line_span: 0..0,
                mark_span: 0..0,
            });
        }
        assert_eq!(phase.completed_count(), 1);
        assert_eq!(phase.progress(), 33);
    }

    #[test]
    fn test_progress_empty_phase_is_zero() {
        let phase = Phase::new(PhaseName::Evaluate);
        assert_eq!(phase.progress(), 0);
    }
}

//! Typed failure taxonomy for cycle operations
//!
//! Core operations return these so callers can distinguish recoverable
//! conditions (unknown cycle, unmet gate) from fatal ones (no `.forge/`).
//! The CLI boundary converts them through `anyhow`.

use crate::models::report::ValidationReport;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForgeError {
    /// The `.forge/` state store is absent; the user must bootstrap first.
    #[error(".forge/ not found. Run 'forge init' first.")]
    NotInitialized,

    #[error("cycle '{0}' not found")]
    CycleNotFound(String),

    /// More than one active cycle and no id supplied to pick one.
    #[error("multiple active cycles found, specify one of: {}", .0.join(", "))]
    AmbiguousCycle(Vec<String>),

    /// No incomplete task matched the query or ordinal.
    #[error("no incomplete task matching '{0}'")]
    TaskNotFound(String),

    /// Several incomplete tasks matched a text query; none is silently chosen.
    #[error("query '{query}' matches {} tasks: {}", .candidates.len(), format_candidates(.candidates))]
    AmbiguousTask {
        query: String,
        /// (ordinal, task text) for every match, in document order.
        candidates: Vec<(usize, String)>,
    },

    /// Phase gate not met; carries the full report so callers can surface
    /// the issues or retry with force.
    #[error("phase validation failed: {}", .0.issues.join("; "))]
    ValidationFailed(ValidationReport),

    /// `advance` has nowhere to go; the terminal action is cycle completion.
    #[error("already at final phase ({0}); use 'forge complete' to archive the cycle")]
    TerminalPhase(String),

    /// The document lacks the marker an operation needs (e.g. no phase is
    /// marked Active). The parser itself never fails; this is raised by
    /// operations that cannot proceed on the degraded parse.
    #[error("{0}")]
    MalformedDocument(String),
}

fn format_candidates(candidates: &[(usize, String)]) -> String {
    candidates
        .iter()
        .map(|(ordinal, text)| format!("[{}] {}", ordinal, text))
        .collect::<Vec<_>>()
        .join(", ")
}

//! Marker grammar for cycle documents
//!
//! The grammar is the contract between the parser and the writer: state is
//! embedded in otherwise free-form markdown through three line shapes,
//!
//! ```text
//! ### Phase 3: Refine [Active]
//! - [ ] Write tests first (RED)
//! **Status**: Refine
//! ```
//!
//! plus the `# Feature:` title line. Everything else in a document belongs to
//! the author and is never interpreted or rewritten.

use crate::models::{PhaseName, PhaseState};
use std::ops::Range;

/// Prefix of a phase header line.
pub const PHASE_HEADER_PREFIX: &str = "### Phase ";

/// Title line prefix.
pub const FEATURE_PREFIX: &str = "# Feature: ";

/// Checkbox mark written for a completed task.
pub const COMPLETE_MARK: &str = "x";

/// Checkbox mark written for an incomplete task.
pub const INCOMPLETE_MARK: &str = " ";

/// Metadata keys the model owns. Values on these lines may be rewritten;
/// any other `**...**:` line is author content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKey {
    Created,
    Status,
    Priority,
}

impl MetadataKey {
    pub fn prefix(&self) -> &'static str {
        match self {
            MetadataKey::Created => "**Created**: ",
            MetadataKey::Status => "**Status**: ",
            MetadataKey::Priority => "**Priority**: ",
        }
    }
}

/// A recognized phase header line.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderToken {
    pub name: PhaseName,
    /// Parsed state; an unknown token inside the brackets degrades to Pending.
    pub state: PhaseState,
    /// Span of the state token between the brackets, relative to the line.
    pub state_span: Range<usize>,
}

/// A recognized checklist line.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskToken {
    pub done: bool,
    pub text: String,
    /// Span of the single mark character, relative to the line.
    pub mark_span: Range<usize>,
}

/// Classification of one document line against the grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum LineToken {
    PhaseHeader(HeaderToken),
    Task(TaskToken),
    Metadata(MetadataKey, Range<usize>),
    Feature(Range<usize>),
    /// Author-owned content; never touched.
    Other,
}

/// Classify a single line (without its newline) against the grammar.
pub fn classify_line(line: &str) -> LineToken {
    if let Some(header) = parse_phase_header(line) {
        return LineToken::PhaseHeader(header);
    }
    if let Some(task) = parse_task_line(line) {
        return LineToken::Task(task);
    }
    for key in [MetadataKey::Created, MetadataKey::Status, MetadataKey::Priority] {
        if let Some(span) = parse_metadata_value(line, key) {
            return LineToken::Metadata(key, span);
        }
    }
    if line.starts_with(FEATURE_PREFIX) {
        let start = FEATURE_PREFIX.len();
        return LineToken::Feature(trimmed_span(line, start));
    }
    LineToken::Other
}

/// Render a phase header line.
pub fn phase_header(name: PhaseName, state: PhaseState) -> String {
    format!(
        "{}{}: {} [{}]",
        PHASE_HEADER_PREFIX,
        name.index() + 1,
        name,
        state
    )
}

/// Render an incomplete checklist line (no trailing newline).
pub fn task_line(text: &str) -> String {
    format!("- [{}] {}", INCOMPLETE_MARK, text)
}

/// `### Phase <n>: <Name> [<State>]` — the phase number is accepted but the
/// name is authoritative; a header naming no known phase is author content.
fn parse_phase_header(line: &str) -> Option<HeaderToken> {
    let rest = line.strip_prefix(PHASE_HEADER_PREFIX)?;

    let colon = rest.find(':')?;
    if colon == 0 || !rest[..colon].chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let after_colon = rest[colon + 1..].trim_start();
    let bracket = after_colon.find(" [")?;
    let name = PhaseName::parse(after_colon[..bracket].trim())?;

    let state_rel = bracket + 2;
    let close = after_colon[state_rel..].find(']')?;
    let state_str = &after_colon[state_rel..state_rel + close];
    let state = PhaseState::parse(state_str).unwrap_or_default();

    // Translate the state span back to line-relative offsets
    let after_colon_start = line.len() - after_colon.len();
    let start = after_colon_start + state_rel;
    Some(HeaderToken {
        name,
        state,
        state_span: start..start + close,
    })
}

/// `- [ ] text` / `- [x] text`, mark case-insensitive, leading indent allowed.
fn parse_task_line(line: &str) -> Option<TaskToken> {
    let indent = line.len() - line.trim_start().len();
    let body = &line[indent..];

    let rest = body.strip_prefix("- [")?;
    let mut chars = rest.chars();
    let mark = chars.next()?;
    if chars.next()? != ']' {
        return None;
    }
    let done = match mark {
        'x' | 'X' => true,
        ' ' => false,
        _ => return None,
    };

    // "] " then non-empty text to end of line
    let text = rest.get(2..)?.strip_prefix(' ')?.trim();
    if text.is_empty() {
        return None;
    }

    let mark_start = indent + 3;
    Some(TaskToken {
        done,
        text: text.to_string(),
        mark_span: mark_start..mark_start + 1,
    })
}

/// Span of the value following `**Key**: `, trimmed of surrounding whitespace.
fn parse_metadata_value(line: &str, key: MetadataKey) -> Option<Range<usize>> {
    let prefix = key.prefix();
    if !line.starts_with(prefix) {
        return None;
    }
    Some(trimmed_span(line, prefix.len()))
}

/// Byte span of `line[start..]` with surrounding whitespace trimmed off.
fn trimmed_span(line: &str, start: usize) -> Range<usize> {
    let raw = &line[start..];
    let left = raw.len() - raw.trim_start().len();
    let value = raw.trim();
    let value_start = start + left;
    value_start..value_start + value.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_header_roundtrip() {
        let line = phase_header(PhaseName::Refine, PhaseState::Active);
        assert_eq!(line, "### Phase 3: Refine [Active]");

        match classify_line(&line) {
            LineToken::PhaseHeader(h) => {
                assert_eq!(h.name, PhaseName::Refine);
                assert_eq!(h.state, PhaseState::Active);
                assert_eq!(&line[h.state_span.clone()], "Active");
            }
            other => panic!("expected header, got {:?}", other),
        }
    }

    #[test]
    fn test_phase_header_unknown_state_degrades_to_pending() {
        match classify_line("### Phase 1: Focus [Blocked]") {
            LineToken::PhaseHeader(h) => assert_eq!(h.state, PhaseState::Pending),
            other => panic!("expected header, got {:?}", other),
        }
    }

    #[test]
    fn test_phase_header_unknown_name_is_author_content() {
        assert_eq!(classify_line("### Phase 6: Deploy [Active]"), LineToken::Other);
        assert_eq!(classify_line("### Phases"), LineToken::Other);
    }

    #[test]
    fn test_task_line_marks() {
        let line = "- [x] Write tests first (RED)";
        match classify_line(line) {
            LineToken::Task(t) => {
                assert!(t.done);
                assert_eq!(t.text, "Write tests first (RED)");
                assert_eq!(&line[t.mark_span.clone()], "x");
            }
            other => panic!("expected task, got {:?}", other),
        }

        match classify_line("- [X] Shouting mark") {
            LineToken::Task(t) => assert!(t.done),
            other => panic!("expected task, got {:?}", other),
        }

        match classify_line("  - [ ] Indented item") {
            LineToken::Task(t) => {
                assert!(!t.done);
                assert_eq!(t.mark_span, 5..6);
            }
            other => panic!("expected task, got {:?}", other),
        }
    }

    #[test]
    fn test_task_line_rejects_malformed() {
        assert_eq!(classify_line("- [] no mark"), LineToken::Other);
        assert_eq!(classify_line("- [y] bad mark"), LineToken::Other);
        assert_eq!(classify_line("- [ ]"), LineToken::Other);
        assert_eq!(classify_line("* [ ] wrong bullet"), LineToken::Other);
    }

    #[test]
    fn test_metadata_value_span() {
        let line = "**Status**: Orchestrate  ";
        match classify_line(line) {
            LineToken::Metadata(MetadataKey::Status, span) => {
                assert_eq!(&line[span], "Orchestrate");
            }
            other => panic!("expected metadata, got {:?}", other),
        }
    }

    #[test]
    fn test_unowned_bold_line_is_author_content() {
        assert_eq!(classify_line("**Owner**: someone"), LineToken::Other);
    }

    #[test]
    fn test_feature_title() {
        let line = "# Feature: Rate limiter";
        match classify_line(line) {
            LineToken::Feature(span) => assert_eq!(&line[span], "Rate limiter"),
            other => panic!("expected feature, got {:?}", other),
        }
    }
}

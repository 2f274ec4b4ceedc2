//! Cycle document parser
//!
//! A single line-oriented pass over the raw text: the scanner tracks which
//! phase span it is inside and classifies each line against the marker
//! grammar. Extraction is total — a document with missing or mangled markers
//! parses to defaults (Pending phases, no tasks, absent metadata) rather than
//! an error. Byte offsets are recorded for every recognized marker so edits
//! can later be applied to the original text.

use crate::models::{Cycle, Metadata, Phase, PhaseName, Task};
use crate::parser::grammar::{self, LineToken, MetadataKey};

/// Parse one document. `id` is the filename stem; the text never carries it.
pub fn parse_cycle(id: impl Into<String>, text: &str) -> Cycle {
    let mut phases: Vec<Phase> = PhaseName::ALL.iter().map(|n| Phase::new(*n)).collect();
    let mut feature: Option<String> = None;
    let mut created: Option<Metadata> = None;
    let mut status: Option<Metadata> = None;
    let mut priority: Option<Metadata> = None;

    // Index of the phase whose span the scanner is currently inside
    let mut current: Option<usize> = None;
    let mut offset = 0usize;

    for raw in text.split_inclusive('\n') {
        let line_start = offset;
        offset += raw.len();

        let line = raw.strip_suffix('\n').unwrap_or(raw);
        let line = line.strip_suffix('\r').unwrap_or(line);

        match grammar::classify_line(line) {
            LineToken::PhaseHeader(header) => {
                let idx = header.name.index();
                let phase = &mut phases[idx];
                // A hand-edited duplicate header doesn't override the first
                if phase.state_span.is_none() {
                    phase.state = header.state;
                    phase.state_span = Some(
                        line_start + header.state_span.start
                            ..line_start + header.state_span.end,
                    );
                    phase.header_end = Some(line_start + line.len());
                }
                current = Some(idx);
            }
            LineToken::Task(token) => {
                // Checklist lines outside any phase span are author content
                if let Some(idx) = current {
                    let phase = &mut phases[idx];
                    let ordinal = phase.tasks.len() + 1;
                    phase.tasks.push(Task {
                        ordinal,
                        text: token.text,
                        done: token.done,
                        line_span: line_start..line_start + line.len(),
                        mark_span: line_start + token.mark_span.start
                            ..line_start + token.mark_span.end,
                    });
                }
            }
            LineToken::Metadata(key, span) => {
                let meta = Metadata {
                    value: line[span.clone()].to_string(),
                    span: line_start + span.start..line_start + span.end,
                };
                let slot = match key {
                    MetadataKey::Created => &mut created,
                    MetadataKey::Status => &mut status,
                    MetadataKey::Priority => &mut priority,
                };
                if slot.is_none() {
                    *slot = Some(meta);
                }
            }
            LineToken::Feature(span) => {
                if feature.is_none() {
                    feature = Some(line[span].to_string());
                }
            }
            LineToken::Other => {}
        }
    }

    Cycle {
        id: id.into(),
        feature: feature.unwrap_or_else(|| "Unknown".to_string()),
        created,
        status,
        priority,
        phases,
    }
}

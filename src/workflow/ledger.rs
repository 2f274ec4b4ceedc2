//! Task ledger - resolving checklist items and expressing edits on them
//!
//! A task's lookup identity is either its stable ordinal (position within its
//! phase at parse time) or a text query. Queries try an exact
//! case-insensitive match first, then case-insensitive substring containment;
//! several substring hits are an error carrying every candidate — no match is
//! ever silently chosen. Both operations return a [`Patch`] for the writer
//! rather than mutating the parsed model.

use crate::error::ForgeError;
use crate::models::{Phase, Task};
use crate::parser::grammar;
use crate::workflow::patch::Patch;

/// How the caller names a task: an all-digits argument is an ordinal,
/// anything else a text query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSelector {
    Ordinal(usize),
    Query(String),
}

impl TaskSelector {
    pub fn parse(raw: &str) -> TaskSelector {
        let trimmed = raw.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(n) = trimmed.parse::<usize>() {
                return TaskSelector::Ordinal(n);
            }
        }
        TaskSelector::Query(trimmed.to_string())
    }

    fn display(&self) -> String {
        match self {
            TaskSelector::Ordinal(n) => n.to_string(),
            TaskSelector::Query(q) => q.clone(),
        }
    }
}

/// Resolve an incomplete task in `phase` and produce the checkbox-flip edit.
pub fn complete_task<'a>(
    phase: &'a Phase,
    selector: &TaskSelector,
) -> Result<(&'a Task, Patch), ForgeError> {
    let task = resolve(phase, selector)?;
    let patch = Patch::new().replace(task.mark_span.clone(), grammar::COMPLETE_MARK);
    Ok((task, patch))
}

/// Produce the edit appending a new incomplete task at the end of the
/// phase's checklist (or right under the header when it has none).
pub fn insert_task(text: &str, phase: &Phase, task_text: &str) -> Result<Patch, ForgeError> {
    // Anchor at the end of the last task line, or the header line for an
    // empty phase; both spans stop before the line's newline
    let anchor = match phase.tasks.last() {
        Some(last) => last.line_span.end,
        None => phase.header_end.ok_or_else(|| {
            ForgeError::MalformedDocument(format!(
                "phase '{}' has no header in this document",
                phase.name
            ))
        })?,
    };

    // Step over the newline terminating the anchor line; a document ending
    // without one gets the newline prepended instead.
    let rest = &text[anchor..];
    if rest.starts_with("\r\n") {
        Ok(Patch::new().insert(anchor + 2, format!("{}\n", grammar::task_line(task_text))))
    } else if rest.starts_with('\n') {
        Ok(Patch::new().insert(anchor + 1, format!("{}\n", grammar::task_line(task_text))))
    } else {
        Ok(Patch::new().insert(text.len(), format!("\n{}", grammar::task_line(task_text))))
    }
}

/// Find the single incomplete task the selector names.
fn resolve<'a>(phase: &'a Phase, selector: &TaskSelector) -> Result<&'a Task, ForgeError> {
    let incomplete: Vec<&Task> = phase.tasks.iter().filter(|t| !t.done).collect();

    match selector {
        TaskSelector::Ordinal(n) => incomplete
            .iter()
            .find(|t| t.ordinal == *n)
            .copied()
            .ok_or_else(|| ForgeError::TaskNotFound(selector.display())),
        TaskSelector::Query(query) => {
            let needle = query.to_lowercase();

            let exact: Vec<&Task> = incomplete
                .iter()
                .filter(|t| t.text.eq_ignore_ascii_case(query))
                .copied()
                .collect();
            let matches = if exact.is_empty() {
                incomplete
                    .iter()
                    .filter(|t| t.text.to_lowercase().contains(&needle))
                    .copied()
                    .collect()
            } else {
                exact
            };

            match matches.as_slice() {
                [] => Err(ForgeError::TaskNotFound(query.clone())),
                [task] => Ok(*task),
                many => Err(ForgeError::AmbiguousTask {
                    query: query.clone(),
                    candidates: many
                        .iter()
                        .map(|t| (t.ordinal, t.text.clone()))
                        .collect(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PhaseName;
    use crate::parser::parse_cycle;

    const DOC: &str = "\
### Phase 3: Refine [Active]
- [x] Write tests first (RED)
- [ ] Implement code (GREEN)
- [ ] Refactor (REFACTOR)
- [ ] Code review completed

### Phase 4: Generate [Pending]
";

    fn refine(doc: &str) -> crate::models::Cycle {
        parse_cycle("doc", doc)
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!(TaskSelector::parse("3"), TaskSelector::Ordinal(3));
        assert_eq!(
            TaskSelector::parse("code review"),
            TaskSelector::Query("code review".to_string())
        );
        // Mixed content is a query even if it starts with digits
        assert_eq!(
            TaskSelector::parse("3 retries"),
            TaskSelector::Query("3 retries".to_string())
        );
    }

    #[test]
    fn test_complete_by_query_flips_only_that_mark() {
        let cycle = refine(DOC);
        let phase = cycle.phase(PhaseName::Refine);
        let (task, patch) =
            complete_task(phase, &TaskSelector::Query("implement".to_string())).unwrap();
        assert_eq!(task.text, "Implement code (GREEN)");

        let out = patch.apply(DOC).unwrap();
        assert!(out.contains("- [x] Implement code (GREEN)"));
        // Nothing else moved
        assert_eq!(out.len(), DOC.len());
        assert!(out.contains("- [ ] Refactor (REFACTOR)"));
    }

    #[test]
    fn test_complete_by_ordinal() {
        let cycle = refine(DOC);
        let phase = cycle.phase(PhaseName::Refine);
        let (task, _) = complete_task(phase, &TaskSelector::Ordinal(3)).unwrap();
        assert_eq!(task.text, "Refactor (REFACTOR)");
    }

    #[test]
    fn test_completed_tasks_are_not_candidates() {
        let cycle = refine(DOC);
        let phase = cycle.phase(PhaseName::Refine);
        // "tests" only appears in the already-completed first task
        let err = complete_task(phase, &TaskSelector::Query("tests".to_string())).unwrap_err();
        assert!(matches!(err, ForgeError::TaskNotFound(_)));
    }

    #[test]
    fn test_ambiguous_query_lists_candidates() {
        let cycle = refine(DOC);
        let phase = cycle.phase(PhaseName::Refine);
        let err = complete_task(phase, &TaskSelector::Query("re".to_string())).unwrap_err();
        match err {
            ForgeError::AmbiguousTask { candidates, .. } => {
                assert_eq!(candidates.len(), 3);
                assert_eq!(candidates[0].0, 2);
            }
            other => panic!("expected AmbiguousTask, got {:?}", other),
        }
    }

    #[test]
    fn test_exact_match_beats_substring_ambiguity() {
        let doc = "\
### Phase 1: Focus [Active]
- [ ] Review
- [ ] Review notes
";
        let cycle = refine(doc);
        let phase = cycle.phase(PhaseName::Focus);
        let (task, _) =
            complete_task(phase, &TaskSelector::Query("review".to_string())).unwrap();
        assert_eq!(task.text, "Review");
    }

    #[test]
    fn test_insert_after_last_task() {
        let cycle = refine(DOC);
        let phase = cycle.phase(PhaseName::Refine);
        let patch = insert_task(DOC, phase, "All tests passing").unwrap();
        let out = patch.apply(DOC).unwrap();
        assert!(out.contains("- [ ] Code review completed\n- [ ] All tests passing\n"));

        // Re-parse reflects exactly one new incomplete task at the end
        let reparsed = parse_cycle("doc", &out);
        let tasks = &reparsed.phase(PhaseName::Refine).tasks;
        assert_eq!(tasks.len(), 5);
        assert_eq!(tasks[4].text, "All tests passing");
        assert_eq!(tasks[4].ordinal, 5);
        assert!(!tasks[4].done);
    }

    #[test]
    fn test_insert_into_empty_phase_goes_under_header() {
        let cycle = refine(DOC);
        let phase = cycle.phase(PhaseName::Generate);
        let patch = insert_task(DOC, phase, "Build artifacts").unwrap();
        let out = patch.apply(DOC).unwrap();
        assert!(out.contains("### Phase 4: Generate [Pending]\n- [ ] Build artifacts\n"));
    }

    #[test]
    fn test_insert_when_document_lacks_trailing_newline() {
        let doc = "### Phase 1: Focus [Active]\n- [ ] Only task";
        let cycle = refine(doc);
        let patch = insert_task(doc, cycle.phase(PhaseName::Focus), "Next task").unwrap();
        let out = patch.apply(doc).unwrap();
        assert_eq!(
            out,
            "### Phase 1: Focus [Active]\n- [ ] Only task\n- [ ] Next task"
        );
    }

    #[test]
    fn test_insert_into_headerless_phase_is_malformed() {
        let doc = "just prose\n";
        let cycle = refine(doc);
        let err = insert_task(doc, cycle.phase(PhaseName::Focus), "task").unwrap_err();
        assert!(matches!(err, ForgeError::MalformedDocument(_)));
    }
}

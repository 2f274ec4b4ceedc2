//! Mutation writer - targeted span edits over the original text
//!
//! One logical edit is a set of non-overlapping byte-span replacements keyed
//! off offsets the parser recorded. Applying a patch splices only those
//! spans; every other byte of the document survives verbatim. The parsed
//! model is never re-serialized, which is what keeps hand-authored prose,
//! spacing, and headings intact.

use crate::{Context, Result};
use std::ops::Range;

/// One span replacement. An insertion is an empty span.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub span: Range<usize>,
    pub replacement: String,
}

/// A single logical edit: one checkbox flip, one insertion, or one phase
/// transition (two state tokens plus the status mirror).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    edits: Vec<Edit>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the bytes in `span` with `replacement`.
    pub fn replace(mut self, span: Range<usize>, replacement: impl Into<String>) -> Self {
        self.edits.push(Edit {
            span,
            replacement: replacement.into(),
        });
        self
    }

    /// Insert `text` at byte offset `at`.
    pub fn insert(self, at: usize, text: impl Into<String>) -> Self {
        self.replace(at..at, text)
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply all edits to `text`. Spans must lie within the text and must not
    /// overlap; both would mean the patch was built against different text,
    /// so nothing is written in that case.
    pub fn apply(&self, text: &str) -> Result<String> {
        let mut edits: Vec<&Edit> = self.edits.iter().collect();
        edits.sort_by_key(|e| (e.span.start, e.span.end));

        for pair in edits.windows(2) {
            if pair[1].span.start < pair[0].span.end {
                anyhow::bail!(
                    "overlapping edits at {}..{} and {}..{}",
                    pair[0].span.start,
                    pair[0].span.end,
                    pair[1].span.start,
                    pair[1].span.end
                );
            }
        }

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0usize;
        for edit in edits {
            let chunk = text
                .get(cursor..edit.span.start)
                .context("edit span out of bounds")?;
            out.push_str(chunk);
            // Validate the replaced region is addressable too
            text.get(edit.span.clone())
                .context("edit span out of bounds")?;
            out.push_str(&edit.replacement);
            cursor = edit.span.end;
        }
        out.push_str(text.get(cursor..).context("edit span out of bounds")?);

        Ok(out)
    }
}

//! Conflict-free merging of rule-suggested fixes
//!
//! A single deterministic left-to-right pass, not an iterative fixed point:
//! edits are sorted by `(start, end)`, applied while they begin at or after
//! the write cursor, and silently skipped when they overlap an already
//! applied edit or reach past the end of the source (stale). A diagnostic
//! whose edit was skipped stays reported on the next analysis of the fixed
//! output.

use std::collections::HashSet;

use crate::diagnostic::Diagnostic;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    pub output: String,
    /// Edits actually written into the output.
    pub applied_edits: usize,
    /// Distinct diagnostics that had at least one edit applied.
    pub applied_diagnostics: usize,
}

impl FixOutcome {
    pub fn changed(&self) -> bool {
        self.applied_edits > 0
    }
}

struct TaggedEdit {
    start: usize,
    end: usize,
    text: String,
    diagnostic_index: usize,
}

/// Fold the diagnostics' fixes into a corrected copy of `source`.
pub fn apply_fixes(source: &str, diagnostics: &[Diagnostic]) -> FixOutcome {
    let mut edits: Vec<TaggedEdit> = Vec::new();

    for (index, diagnostic) in diagnostics.iter().enumerate() {
        let Some(fix) = &diagnostic.fix else {
            continue;
        };
        for edit in fix.edits() {
            // Malformed ranges are discarded during normalization.
            if !edit.is_well_formed() {
                continue;
            }
            edits.push(TaggedEdit {
                start: edit.start(),
                end: edit.end(),
                text: edit.text.clone(),
                diagnostic_index: index,
            });
        }
    }

    // Stale edits refer to text beyond the current source; they were
    // computed against a different buffer and cannot be applied.
    edits.retain(|edit| edit.end <= source.len());

    if edits.is_empty() {
        return FixOutcome {
            output: source.to_string(),
            applied_edits: 0,
            applied_diagnostics: 0,
        };
    }

    edits.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

    let mut cursor = 0;
    let mut output = String::with_capacity(source.len());
    let mut applied_edits = 0;
    let mut applied_diagnostics = HashSet::new();

    for edit in &edits {
        if edit.start < cursor {
            // Overlaps an already applied edit; skipped, not retried.
            continue;
        }

        output.push_str(&source[cursor..edit.start]);
        output.push_str(&edit.text);
        cursor = edit.end;

        applied_edits += 1;
        applied_diagnostics.insert(edit.diagnostic_index);
    }

    output.push_str(&source[cursor..]);

    FixOutcome {
        output,
        applied_edits,
        applied_diagnostics: applied_diagnostics.len(),
    }
}

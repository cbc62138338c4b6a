//! Diagnostic reporting for analysis results
//!
//! A [`Diagnostic`] is one reported issue: message, location, severity, rule
//! id, and an optional textual fix. Diagnostics are append-only during an
//! analysis pass and consumed by a reporter or the fix merger.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// A textual replacement over a half-open byte range `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixEdit {
    pub range: [usize; 2],
    pub text: String,
}

impl FixEdit {
    pub fn new(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            range: [start, end],
            text: text.into(),
        }
    }

    /// Pure insertion at `at`.
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::new(at, at, text)
    }

    pub fn delete(start: usize, end: usize) -> Self {
        Self::new(start, end, "")
    }

    pub fn start(&self) -> usize {
        self.range[0]
    }

    pub fn end(&self) -> usize {
        self.range[1]
    }

    pub fn is_well_formed(&self) -> bool {
        self.range[1] >= self.range[0]
    }
}

/// A fix attached to a diagnostic: a single edit or a list of edits.
/// Both shapes normalize to an edit list in the fix merger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Fix {
    Edit(FixEdit),
    Edits(Vec<FixEdit>),
}

impl Fix {
    pub fn edits(&self) -> &[FixEdit] {
        match self {
            Fix::Edit(edit) => std::slice::from_ref(edit),
            Fix::Edits(edits) => edits,
        }
    }
}

impl From<FixEdit> for Fix {
    fn from(edit: FixEdit) -> Self {
        Fix::Edit(edit)
    }
}

impl From<Vec<FixEdit>> for Fix {
    fn from(edits: Vec<FixEdit>) -> Self {
        Fix::Edits(edits)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub file_path: String,
    pub message: String,
    pub severity: Severity,
    /// Absent for structural failures (e.g. the parser could not produce a
    /// tree); always present for rule-reported diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    /// 1-based line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// 1-based column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
}

impl Diagnostic {
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        file_path: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            message: message.into(),
            severity,
            rule_id: Some(rule_id.into()),
            line: Some(line),
            column: Some(column),
            fix: None,
        }
    }

    /// A synthetic diagnostic with no rule id, used for structural failures
    /// such as parse errors.
    pub fn structural(
        message: impl Into<String>,
        file_path: impl Into<String>,
        line: Option<usize>,
        column: Option<usize>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            message: message.into(),
            severity: Severity::Error,
            rule_id: None,
            line,
            column,
            fix: None,
        }
    }

    pub fn with_fix(mut self, fix: impl Into<Fix>) -> Self {
        self.fix = Some(fix.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_carries_rule_id_and_location() {
        let diag = Diagnostic::new("eqeqeq", Severity::Error, "msg", "a.js", 3, 7);

        assert_eq!(diag.rule_id.as_deref(), Some("eqeqeq"));
        assert_eq!(diag.line, Some(3));
        assert_eq!(diag.column, Some(7));
        assert!(diag.is_error());
        assert!(diag.fix.is_none());
    }

    #[test]
    fn structural_diagnostic_has_no_rule_id() {
        let diag = Diagnostic::structural("Unexpected token", "a.js", Some(1), None);

        assert!(diag.rule_id.is_none());
        assert_eq!(diag.severity, Severity::Error);
    }

    #[test]
    fn single_edit_fix_normalizes_to_one_edit() {
        let fix: Fix = FixEdit::insert(4, " {").into();

        assert_eq!(fix.edits().len(), 1);
        assert_eq!(fix.edits()[0].range, [4, 4]);
    }

    #[test]
    fn edit_list_fix_preserves_order() {
        let fix: Fix = vec![FixEdit::new(0, 2, "a"), FixEdit::new(5, 5, "b")].into();

        let ranges: Vec<[usize; 2]> = fix.edits().iter().map(|e| e.range).collect();
        assert_eq!(ranges, vec![[0, 2], [5, 5]]);
    }

    #[test]
    fn malformed_edit_is_detectable() {
        let edit = FixEdit {
            range: [5, 2],
            text: String::new(),
        };

        assert!(!edit.is_well_formed());
        assert!(FixEdit::delete(2, 5).is_well_formed());
        assert!(FixEdit::insert(3, "x").is_well_formed());
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Error).unwrap(), "\"error\"");
        assert_eq!(
            serde_json::to_string(&Severity::Warning).unwrap(),
            "\"warning\""
        );
    }
}

//! Rule context passed to every listener invocation
//!
//! Rather than mutating shared "current node" fields, the dispatch engine
//! constructs a fresh [`RuleContext`] for each handler call carrying the
//! explicit traversal state: the current node, its ancestor path, and the
//! scope model as built so far. Reporting applies inline suppression before
//! a diagnostic is queued, so a suppressed report is never counted.

use std::collections::HashSet;

use crate::diagnostic::{Diagnostic, Fix, Severity};
use crate::directives::InlineDirectives;
use crate::parser::LineIndex;
use crate::semantic::{DeclarationInfo, Reference, ScopeId, ScopeModel};
use crate::syntax::{Node, NodeId, SyntaxTree};

/// One pending report. `node` defaults to the current node; `severity`
/// defaults to the rule's configured severity.
#[derive(Debug)]
pub struct Report {
    node: Option<NodeId>,
    message: String,
    severity: Option<Severity>,
    fix: Option<Fix>,
}

impl Report {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            node: None,
            message: message.into(),
            severity: None,
            fix: None,
        }
    }

    pub fn on(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn fix(mut self, fix: impl Into<Fix>) -> Self {
        self.fix = Some(fix.into());
        self
    }
}

pub struct RuleContext<'a> {
    pub(crate) file_path: &'a str,
    pub(crate) source: &'a str,
    pub(crate) tree: &'a SyntaxTree,
    pub(crate) scopes: &'a ScopeModel,
    pub(crate) lines: &'a LineIndex,
    pub(crate) globals: &'a HashSet<String>,
    pub(crate) directives: &'a InlineDirectives,
    pub(crate) diagnostics: &'a mut Vec<Diagnostic>,
    pub(crate) rule_id: &'a str,
    pub(crate) severity: Severity,
    pub(crate) node: NodeId,
    pub(crate) ancestors: &'a [NodeId],
}

impl<'a> RuleContext<'a> {
    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn file_path(&self) -> &str {
        self.file_path
    }

    pub fn node_id(&self) -> NodeId {
        self.node
    }

    pub fn node(&self) -> &'a Node {
        self.tree.get(self.node)
    }

    /// Ancestor path of the current node, outermost first, excluding the
    /// node itself.
    pub fn ancestors(&self) -> &'a [NodeId] {
        self.ancestors
    }

    pub fn parent_id(&self) -> Option<NodeId> {
        self.ancestors.last().copied()
    }

    pub fn parent(&self) -> Option<&'a Node> {
        self.parent_id().map(|id| self.tree.get(id))
    }

    pub fn scopes(&self) -> &'a ScopeModel {
        self.scopes
    }

    /// The scope active for the current node. Valid whenever listeners run;
    /// the engine never dispatches outside the Program scope.
    pub fn current_scope(&self) -> ScopeId {
        self.scopes.current().expect("listener outside any scope")
    }

    pub fn resolve(&self, name: &str, before: Option<usize>) -> Option<&'a DeclarationInfo> {
        self.scopes.resolve(name, before)
    }

    /// Resolve against a scope captured earlier in the walk. Sound even for
    /// scopes that have been exited; the model retains them until the pass
    /// completes.
    pub fn resolve_from(
        &self,
        scope: ScopeId,
        name: &str,
        before: Option<usize>,
    ) -> Option<&'a DeclarationInfo> {
        self.scopes.resolve_from(scope, name, before)
    }

    pub fn references(&self, scope: ScopeId) -> &'a [Reference] {
        self.scopes.references(scope)
    }

    pub fn is_global(&self, name: &str) -> bool {
        self.globals.contains(name)
    }

    /// Raw source text of a node, for rules that need what the tree does not
    /// encode (parenthesization, exact operator spelling).
    pub fn source_text(&self, node: NodeId) -> &'a str {
        let node = self.tree.get(node);
        let start = node.start.min(self.source.len());
        let end = node.end.min(self.source.len());
        &self.source[start..end.max(start)]
    }

    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        self.lines.line_col(offset)
    }

    pub fn report(&mut self, report: Report) {
        let target = report.node.unwrap_or(self.node);
        let node = self.tree.get(target);
        let (line, column) = self.lines.line_col(node.start);
        let end_line = self.lines.line_of(node.end.min(self.source.len()));

        if self.directives.should_ignore(line, Some(self.rule_id))
            || (end_line != line && self.directives.should_ignore(end_line, Some(self.rule_id)))
        {
            return;
        }

        self.diagnostics.push(Diagnostic {
            file_path: self.file_path.to_string(),
            message: report.message,
            severity: report.severity.unwrap_or(self.severity),
            rule_id: Some(self.rule_id.to_string()),
            line: Some(line),
            column: Some(column + 1),
            fix: report.fix,
        });
    }
}

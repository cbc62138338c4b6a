//! curly: enforce consistent brace style for all control statements.
//!
//! Bodies headed by a closing parenthesis (`if`, `while`, `for` variants)
//! also get a fix: insert `{` after the parenthesis and a matching `}` after
//! the body. `else` and `do` bodies are reported without a fix.

use crate::context::{Report, RuleContext};
use crate::declare_rule;
use crate::diagnostic::FixEdit;
use crate::rules::{Rule, RuleListeners, RuleMeta};
use crate::syntax::{Node, NodeData, NodeId, NodeKind};

declare_rule!(
    Curly,
    name = "curly",
    description = "Enforce consistent brace style for all control statements.",
    recommended = true,
    default_severity = Error
);

impl Rule for Curly {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn create(&self) -> Box<dyn RuleListeners> {
        Box::new(Listeners)
    }
}

struct Listeners;

impl RuleListeners for Listeners {
    fn enter_kinds(&self) -> &'static [NodeKind] {
        &[
            NodeKind::IfStatement,
            NodeKind::WhileStatement,
            NodeKind::DoWhileStatement,
            NodeKind::ForStatement,
            NodeKind::ForInStatement,
            NodeKind::ForOfStatement,
        ]
    }

    fn on_enter(&mut self, node: &Node, ctx: &mut RuleContext<'_>) {
        match &node.data {
            NodeData::IfStatement {
                consequent,
                alternate,
                ..
            } => {
                check_body(ctx, node, *consequent, "if", true);
                if let Some(alternate) = alternate {
                    if ctx.tree().kind(*alternate) != NodeKind::IfStatement {
                        check_body(ctx, node, *alternate, "else", false);
                    }
                }
            }
            NodeData::WhileStatement { body, .. } => check_body(ctx, node, *body, "while", true),
            NodeData::DoWhileStatement { body, .. } => check_body(ctx, node, *body, "do", false),
            NodeData::ForStatement { body, .. } => check_body(ctx, node, *body, "for", true),
            NodeData::ForInStatement { body, .. } => check_body(ctx, node, *body, "for-in", true),
            NodeData::ForOfStatement { body, .. } => check_body(ctx, node, *body, "for-of", true),
            _ => {}
        }
    }
}

fn check_body(
    ctx: &mut RuleContext<'_>,
    statement: &Node,
    body: NodeId,
    keyword: &str,
    paren_headed: bool,
) {
    if ctx.tree().kind(body) == NodeKind::BlockStatement {
        return;
    }

    let mut report = Report::new(format!("Expected {{ after '{keyword}'.")).on(body);
    if paren_headed {
        if let Some(fix) = brace_fix(ctx, statement, body) {
            report = report.fix(fix);
        }
    }
    ctx.report(report);
}

/// Two insertions: `{` right after the statement head's closing parenthesis
/// and `}` after the body, on its own line when the body spans past the
/// statement's first line.
fn brace_fix(ctx: &RuleContext<'_>, statement: &Node, body: NodeId) -> Option<Vec<FixEdit>> {
    let body_node = ctx.tree().get(body);
    let head = ctx.source().get(statement.start..body_node.start)?;
    let paren = head.rfind(')')?;
    let open_at = statement.start + paren + 1;

    let (statement_line, _) = ctx.line_col(statement.start);
    let (body_end_line, _) = ctx.line_col(body_node.end);
    let closing = if body_end_line > statement_line {
        "\n}"
    } else {
        " }"
    };

    Some(vec![
        FixEdit::insert(open_at, " {"),
        FixEdit::insert(body_node.end, closing),
    ])
}

//! no-empty: disallow empty block statements.
//!
//! Function bodies and catch blocks may be deliberately empty; a block whose
//! braces contain only a comment is also allowed, detected by slicing the
//! source text because the tree does not keep comments.

use crate::context::{Report, RuleContext};
use crate::declare_rule;
use crate::rules::{Rule, RuleListeners, RuleMeta};
use crate::syntax::{Node, NodeData, NodeKind};

declare_rule!(
    NoEmpty,
    name = "no-empty",
    description = "Disallow empty block statements.",
    recommended = true,
    default_severity = Error
);

impl Rule for NoEmpty {
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
        &[NodeKind::BlockStatement]
    }

    fn on_enter(&mut self, node: &Node, ctx: &mut RuleContext<'_>) {
        let NodeData::BlockStatement { body } = &node.data else {
            return;
        };
        if !body.is_empty() {
            return;
        }

        let source = ctx.source_text(node.id);
        if source.len() > 1 {
            let inner = source[1..source.len() - 1].trim();
            if !inner.is_empty() {
                return;
            }
        }

        if is_allowed_empty_block(ctx, node) {
            return;
        }
        ctx.report(Report::new("Unexpected empty block."));
    }
}

fn is_allowed_empty_block(ctx: &RuleContext<'_>, _node: &Node) -> bool {
    let Some(parent) = ctx.parent() else {
        return false;
    };
    matches!(
        parent.kind(),
        NodeKind::CatchClause
            | NodeKind::FunctionDeclaration
            | NodeKind::FunctionExpression
            | NodeKind::ArrowFunctionExpression
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::run_rule;

    fn check(code: &str) -> Vec<String> {
        run_rule(&NoEmpty::new(), "test.js", code)
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    #[test]
    fn empty_if_block_is_reported() {
        let messages = check("if (cond()) {}\nfunction cond() { return true; }\n");

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0], "Unexpected empty block.");
    }

    #[test]
    fn block_with_statements_is_fine() {
        assert!(check("if (x) { console.log(x); }\nvar x;\n").is_empty());
    }

    #[test]
    fn comment_only_block_is_fine() {
        assert!(check("if (x) { /* intentionally empty */ }\nvar x;\n").is_empty());
    }

    #[test]
    fn empty_function_body_is_fine() {
        assert!(check("function noop() {}\nnoop();\n").is_empty());
        assert!(check("const noop = () => {};\nnoop();\n").is_empty());
    }

    #[test]
    fn empty_catch_is_fine() {
        assert!(check("try { risky(); } catch (e) {}\nfunction risky() {}\n").is_empty());
    }

    #[test]
    fn empty_loop_body_is_reported() {
        assert_eq!(check("while (tick()) {}\nfunction tick() { return false; }\n").len(), 1);
    }

    #[test]
    fn empty_standalone_block_is_reported() {
        assert_eq!(check("{}\n").len(), 1);
    }
}

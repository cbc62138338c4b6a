//! eqeqeq: require `===` and `!==` instead of `==` and `!=`.

use crate::context::{Report, RuleContext};
use crate::declare_rule;
use crate::rules::{Rule, RuleListeners, RuleMeta};
use crate::syntax::{Node, NodeData, NodeKind};

declare_rule!(
    Eqeqeq,
    name = "eqeqeq",
    description = "Require === and !== instead of == and !=.",
    recommended = true,
    default_severity = Error
);

impl Rule for Eqeqeq {
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
        &[NodeKind::BinaryExpression]
    }

    fn on_enter(&mut self, node: &Node, ctx: &mut RuleContext<'_>) {
        let NodeData::BinaryExpression { operator, .. } = &node.data else {
            return;
        };
        let expected = match operator.as_str() {
            "==" => "===",
            "!=" => "!==",
            _ => return,
        };
        ctx.report(Report::new(format!(
            "Expected '{expected}' and instead saw '{operator}'."
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::run_rule;

    fn check(code: &str) -> Vec<String> {
        run_rule(&Eqeqeq::new(), "test.js", code)
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    #[test]
    fn loose_equality_is_reported() {
        let messages = check("if (a == b) {}\n");

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0], "Expected '===' and instead saw '=='.");
    }

    #[test]
    fn loose_inequality_is_reported() {
        let messages = check("if (a != b) {}\n");

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0], "Expected '!==' and instead saw '!='.");
    }

    #[test]
    fn strict_comparisons_are_fine() {
        assert!(check("if (a === b || a !== c) {}\n").is_empty());
    }

    #[test]
    fn other_binary_operators_are_fine() {
        assert!(check("const x = a + b < c;\n").is_empty());
    }

    #[test]
    fn nested_expressions_each_report() {
        let messages = check("if (a == b && c != d) {}\n");

        assert_eq!(messages.len(), 2);
    }
}

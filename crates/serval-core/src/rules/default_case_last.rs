//! default-case-last: enforce default clauses to be last in switch
//! statements.

use crate::context::{Report, RuleContext};
use crate::declare_rule;
use crate::rules::{Rule, RuleListeners, RuleMeta};
use crate::syntax::{Node, NodeData, NodeKind};

declare_rule!(
    DefaultCaseLast,
    name = "default-case-last",
    description = "Enforce default clauses to be last in switch statements.",
    recommended = true,
    default_severity = Error
);

impl Rule for DefaultCaseLast {
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
        &[NodeKind::SwitchStatement]
    }

    fn on_enter(&mut self, node: &Node, ctx: &mut RuleContext<'_>) {
        let NodeData::SwitchStatement { cases, .. } = &node.data else {
            return;
        };
        if cases.is_empty() {
            return;
        }

        let tree = ctx.tree();
        let default_index = cases.iter().position(|case| {
            matches!(
                &tree.get(*case).data,
                NodeData::SwitchCase { test: None, .. }
            )
        });

        if let Some(index) = default_index {
            if index != cases.len() - 1 {
                ctx.report(
                    Report::new("Default clause should be the last case.").on(cases[index]),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::run_rule;

    fn check(code: &str) -> Vec<String> {
        run_rule(&DefaultCaseLast::new(), "test.js", code)
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    #[test]
    fn default_in_the_middle_is_reported() {
        let messages =
            check("switch (x) { case 1: break; default: break; case 2: break; }\nvar x;\n");

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0], "Default clause should be the last case.");
    }

    #[test]
    fn default_first_is_reported() {
        assert_eq!(
            check("switch (x) { default: break; case 1: break; }\nvar x;\n").len(),
            1
        );
    }

    #[test]
    fn default_last_is_fine() {
        assert!(check("switch (x) { case 1: break; default: break; }\nvar x;\n").is_empty());
    }

    #[test]
    fn no_default_is_fine() {
        assert!(check("switch (x) { case 1: break; case 2: break; }\nvar x;\n").is_empty());
    }

    #[test]
    fn empty_switch_is_fine() {
        assert!(check("switch (x) {}\nvar x;\n").is_empty());
    }
}

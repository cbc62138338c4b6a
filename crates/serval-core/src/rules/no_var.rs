//! no-var: disallow `var` declarations.

use crate::context::{Report, RuleContext};
use crate::declare_rule;
use crate::rules::{Rule, RuleListeners, RuleMeta};
use crate::syntax::{Node, NodeData, NodeKind, VarKind};

declare_rule!(
    NoVar,
    name = "no-var",
    description = "Disallow var declarations.",
    recommended = true,
    default_severity = Error
);

impl Rule for NoVar {
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
        &[NodeKind::VariableDeclaration]
    }

    fn on_enter(&mut self, node: &Node, ctx: &mut RuleContext<'_>) {
        if let NodeData::VariableDeclaration {
            kind: VarKind::Var, ..
        } = &node.data
        {
            ctx.report(Report::new("Unexpected var, use 'let' or 'const' instead."));
        }
    }
}

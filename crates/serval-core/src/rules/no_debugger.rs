//! no-debugger: disallow `debugger` statements.

use crate::context::{Report, RuleContext};
use crate::declare_rule;
use crate::rules::{Rule, RuleListeners, RuleMeta};
use crate::syntax::{Node, NodeKind};

declare_rule!(
    NoDebugger,
    name = "no-debugger",
    description = "Disallow debugger statements.",
    recommended = true,
    default_severity = Error
);

impl Rule for NoDebugger {
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
        &[NodeKind::DebuggerStatement]
    }

    fn on_enter(&mut self, _node: &Node, ctx: &mut RuleContext<'_>) {
        ctx.report(Report::new("Unexpected debugger statement."));
    }
}

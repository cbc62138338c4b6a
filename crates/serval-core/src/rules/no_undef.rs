//! no-undef: disallow use of undeclared variables.
//!
//! Same deferred shape as no-use-before-define: candidate references are
//! collected with their active scope during the walk, and the verdict waits
//! for the complete scope tree at Program exit. A name that resolves at any
//! offset is declared somewhere; only names with no declaration at all are
//! reported.

use crate::context::{Report, RuleContext};
use crate::declare_rule;
use crate::rules::{Rule, RuleListeners, RuleMeta};
use crate::semantic::{ScopeId, is_read_reference};
use crate::syntax::{Node, NodeId, NodeKind};

const ALWAYS_ALLOWED: &[&str] = &["undefined", "NaN", "Infinity", "arguments"];

declare_rule!(
    NoUndef,
    name = "no-undef",
    description = "Disallow use of undeclared variables.",
    recommended = true,
    default_severity = Error
);

impl Rule for NoUndef {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn create(&self) -> Box<dyn RuleListeners> {
        Box::new(Listeners::default())
    }
}

struct PendingReference {
    node: NodeId,
    scope: ScopeId,
}

#[derive(Default)]
struct Listeners {
    pending: Vec<PendingReference>,
}

impl RuleListeners for Listeners {
    fn enter_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Identifier]
    }

    fn exit_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Program]
    }

    fn on_enter(&mut self, node: &Node, ctx: &mut RuleContext<'_>) {
        if !is_read_reference(ctx.tree(), node.id, ctx.ancestors()) {
            return;
        }
        let Some(name) = node.identifier_name() else {
            return;
        };
        if ALWAYS_ALLOWED.contains(&name) || ctx.is_global(name) {
            return;
        }
        self.pending.push(PendingReference {
            node: node.id,
            scope: ctx.current_scope(),
        });
    }

    fn on_exit(&mut self, _node: &Node, ctx: &mut RuleContext<'_>) {
        for reference in &self.pending {
            let tree = ctx.tree();
            let Some(name) = tree.identifier_name(reference.node) else {
                continue;
            };
            let use_offset = tree.get(reference.node).start;
            if ctx
                .resolve_from(reference.scope, name, Some(use_offset))
                .is_some()
            {
                continue;
            }
            // Declared later in the file is no-use-before-define territory,
            // not an undefined name.
            if ctx.resolve_from(reference.scope, name, None).is_none() {
                ctx.report(Report::new(format!("'{name}' is not defined.")).on(reference.node));
            }
        }
    }
}

//! no-use-before-define: disallow using variables before they are defined.
//!
//! References cannot be judged at first sight: the binding they resolve to
//! may not be declared yet. Candidates are collected during the walk with
//! the scope that was active at the time, and resolution happens in the
//! Program exit listener against the finished scope tree.

use crate::context::{Report, RuleContext};
use crate::declare_rule;
use crate::rules::{Rule, RuleListeners, RuleMeta};
use crate::semantic::{ScopeId, is_read_reference};
use crate::syntax::{Node, NodeId, NodeKind, SyntaxTree};

const ALWAYS_ALLOWED: &[&str] = &["undefined", "NaN", "Infinity", "arguments"];

declare_rule!(
    NoUseBeforeDefine,
    name = "no-use-before-define",
    description = "Disallow using variables before they are defined.",
    recommended = true,
    default_severity = Error
);

impl Rule for NoUseBeforeDefine {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn create(&self) -> Box<dyn RuleListeners> {
        Box::new(Listeners::default())
    }
}

struct PendingReference {
    node: NodeId,
    ancestors: Vec<NodeId>,
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
            ancestors: ctx.ancestors().to_vec(),
            scope: ctx.current_scope(),
        });
    }

    fn on_exit(&mut self, _node: &Node, ctx: &mut RuleContext<'_>) {
        for reference in &self.pending {
            let tree = ctx.tree();
            let Some(name) = tree.identifier_name(reference.node) else {
                continue;
            };
            let Some(resolved) = ctx.resolve_from(reference.scope, name, None) else {
                continue;
            };
            if resolved.hoisted {
                continue;
            }
            // A read inside a function that does not contain the declaration
            // runs after the declaration has been evaluated; calling it
            // earlier is the caller's hazard, not this reference's.
            if is_deferred_reference(tree, &reference.ancestors, resolved.node) {
                continue;
            }
            if resolved.available_from <= tree.get(reference.node).start {
                continue;
            }
            ctx.report(
                Report::new(format!("'{name}' was used before it was defined."))
                    .on(reference.node),
            );
        }
    }
}

fn is_deferred_reference(tree: &SyntaxTree, ancestors: &[NodeId], declaration: NodeId) -> bool {
    let decl = tree.get(declaration);
    for &ancestor in ancestors.iter().rev() {
        let node = tree.get(ancestor);
        if node.kind().is_function_like() && !(node.start <= decl.start && decl.end <= node.end) {
            return true;
        }
    }
    false
}

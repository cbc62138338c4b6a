//! no-unused-vars: disallow unused variables.
//!
//! Bindings and uses are collected name-wise during the walk and compared in
//! the Program exit listener. Exemptions: underscore-prefixed names,
//! exported bindings, function-expression names passed as callbacks or
//! assigned to CommonJS exports, and destructured names whose pattern also
//! binds a rest element (they exist to omit properties from the rest).

use std::collections::HashSet;

use crate::context::{Report, RuleContext};
use crate::declare_rule;
use crate::rules::{Rule, RuleListeners, RuleMeta};
use crate::semantic::is_read_reference;
use crate::syntax::{Node, NodeData, NodeId, NodeKind, SyntaxTree};

declare_rule!(
    NoUnusedVars,
    name = "no-unused-vars",
    description = "Disallow unused variables.",
    recommended = true,
    default_severity = Error
);

impl Rule for NoUnusedVars {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn create(&self) -> Box<dyn RuleListeners> {
        Box::new(Listeners::default())
    }
}

#[derive(Default)]
struct Listeners {
    defined: Vec<(String, NodeId)>,
    seen: HashSet<NodeId>,
    used: HashSet<String>,
}

impl Listeners {
    fn define(&mut self, name: &str, node: NodeId) {
        if self.seen.insert(node) {
            self.defined.push((name.to_string(), node));
        }
        if name.starts_with('_') {
            self.used.insert(name.to_string());
        }
    }

    fn mark_used(&mut self, name: &str) {
        self.used.insert(name.to_string());
    }

    fn define_pattern(&mut self, tree: &SyntaxTree, pattern: NodeId) {
        for binding in pattern_identifiers(tree, pattern) {
            self.define(&binding.name, binding.node);
            if binding.rest_sibling {
                self.mark_used(&binding.name);
            }
        }
    }
}

impl RuleListeners for Listeners {
    fn enter_kinds(&self) -> &'static [NodeKind] {
        &[
            NodeKind::VariableDeclarator,
            NodeKind::FunctionDeclaration,
            NodeKind::FunctionExpression,
            NodeKind::ArrowFunctionExpression,
            NodeKind::Identifier,
            NodeKind::ExportNamedDeclaration,
            NodeKind::ExportDefaultDeclaration,
        ]
    }

    fn exit_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Program]
    }

    fn on_enter(&mut self, node: &Node, ctx: &mut RuleContext<'_>) {
        let tree = ctx.tree();
        match &node.data {
            NodeData::VariableDeclarator { id, .. } => {
                let exported = is_exported_declarator(tree, ctx.ancestors());
                for binding in pattern_identifiers(tree, *id) {
                    self.define(&binding.name, binding.node);
                    if binding.rest_sibling || exported {
                        self.mark_used(&binding.name);
                    }
                }
            }
            NodeData::FunctionDeclaration { id, params, .. } => {
                if let Some(id) = id {
                    if let Some(name) = tree.identifier_name(*id) {
                        self.define(name, *id);
                        if is_export_parent(tree, ctx.parent_id()) {
                            self.mark_used(name);
                        }
                    }
                }
                for param in params {
                    self.define_pattern(tree, *param);
                }
            }
            NodeData::FunctionExpression { id, params, .. } => {
                if let Some(id) = id {
                    if let Some(name) = tree.identifier_name(*id) {
                        self.define(name, *id);
                        if is_callback_argument(tree, ctx.parent_id(), node.id)
                            || is_commonjs_exported(tree, ctx.ancestors(), node.id)
                        {
                            self.mark_used(name);
                        }
                    }
                }
                for param in params {
                    self.define_pattern(tree, *param);
                }
            }
            NodeData::ArrowFunctionExpression { params, .. } => {
                for param in params {
                    self.define_pattern(tree, *param);
                }
            }
            NodeData::Identifier { name } => {
                if is_read_reference(tree, node.id, ctx.ancestors()) {
                    self.mark_used(name);
                }
            }
            NodeData::ExportNamedDeclaration {
                declaration,
                specifiers,
                ..
            } => {
                if let Some(declaration) = declaration {
                    match &tree.get(*declaration).data {
                        NodeData::FunctionDeclaration { id: Some(id), .. } => {
                            if let Some(name) = tree.identifier_name(*id) {
                                self.mark_used(name);
                            }
                        }
                        NodeData::VariableDeclaration { declarations, .. } => {
                            for declarator in declarations {
                                if let NodeData::VariableDeclarator { id, .. } =
                                    &tree.get(*declarator).data
                                {
                                    for binding in pattern_identifiers(tree, *id) {
                                        self.mark_used(&binding.name);
                                    }
                                }
                            }
                        }
                        _ => {}
                    }
                }
                for specifier in specifiers {
                    if let NodeData::ExportSpecifier { local } = &tree.get(*specifier).data {
                        if let Some(name) = tree.identifier_name(*local) {
                            self.mark_used(name);
                        }
                    }
                }
            }
            NodeData::ExportDefaultDeclaration { declaration } => {
                match &tree.get(*declaration).data {
                    NodeData::Identifier { name } => self.mark_used(name),
                    NodeData::FunctionDeclaration { id: Some(id), .. }
                    | NodeData::ClassDeclaration { id: Some(id), .. } => {
                        if let Some(name) = tree.identifier_name(*id) {
                            self.mark_used(name);
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn on_exit(&mut self, _node: &Node, ctx: &mut RuleContext<'_>) {
        for (name, node) in &self.defined {
            if self.used.contains(name) {
                continue;
            }
            ctx.report(Report::new(format!("'{name}' is defined but never used.")).on(*node));
        }
    }
}

struct PatternIdentifier {
    name: String,
    node: NodeId,
    /// Bound next to a `...rest` element in the same object pattern.
    rest_sibling: bool,
}

fn pattern_identifiers(tree: &SyntaxTree, pattern: NodeId) -> Vec<PatternIdentifier> {
    let mut out = Vec::new();
    collect_identifiers(tree, pattern, false, &mut out);
    out
}

fn collect_identifiers(
    tree: &SyntaxTree,
    pattern: NodeId,
    rest_sibling: bool,
    out: &mut Vec<PatternIdentifier>,
) {
    match &tree.get(pattern).data {
        NodeData::Identifier { name } => out.push(PatternIdentifier {
            name: name.clone(),
            node: pattern,
            rest_sibling,
        }),
        NodeData::RestElement { argument } => {
            collect_identifiers(tree, *argument, false, out);
        }
        NodeData::AssignmentPattern { left, .. } => {
            collect_identifiers(tree, *left, rest_sibling, out);
        }
        NodeData::ArrayPattern { elements } => {
            for element in elements.iter().flatten() {
                collect_identifiers(tree, *element, false, out);
            }
        }
        NodeData::ObjectPattern { properties } => {
            let has_rest = properties
                .iter()
                .any(|p| tree.kind(*p) == NodeKind::RestElement);
            for property in properties {
                match &tree.get(*property).data {
                    NodeData::RestElement { argument } => {
                        collect_identifiers(tree, *argument, false, out);
                    }
                    NodeData::Property { value, .. } => {
                        collect_identifiers(tree, *value, has_rest, out);
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

fn is_exported_declarator(tree: &SyntaxTree, ancestors: &[NodeId]) -> bool {
    // declarator → VariableDeclaration → ExportNamedDeclaration
    ancestors
        .len()
        .checked_sub(2)
        .map(|index| tree.kind(ancestors[index]) == NodeKind::ExportNamedDeclaration)
        .unwrap_or(false)
}

fn is_export_parent(tree: &SyntaxTree, parent: Option<NodeId>) -> bool {
    parent.is_some_and(|p| {
        matches!(
            tree.kind(p),
            NodeKind::ExportNamedDeclaration | NodeKind::ExportDefaultDeclaration
        )
    })
}

/// A named function expression passed directly as a call argument keeps its
/// name for stack traces; treat it as used.
fn is_callback_argument(tree: &SyntaxTree, parent: Option<NodeId>, node: NodeId) -> bool {
    let Some(parent) = parent else {
        return false;
    };
    match &tree.get(parent).data {
        NodeData::CallExpression { arguments, .. } | NodeData::NewExpression { arguments, .. } => {
            arguments.contains(&node)
        }
        _ => false,
    }
}

fn is_commonjs_exported(tree: &SyntaxTree, ancestors: &[NodeId], node: NodeId) -> bool {
    let Some(&parent) = ancestors.last() else {
        return false;
    };

    if let NodeData::AssignmentExpression { left, right, .. } = &tree.get(parent).data {
        if *right == node {
            return is_commonjs_export_target(tree, *left);
        }
    }

    // `module.exports = { handler: function handler() {} }`
    if let NodeData::Property { value, .. } = &tree.get(parent).data {
        if *value == node {
            let object = ancestors.len().checked_sub(2).map(|i| ancestors[i]);
            let container = ancestors.len().checked_sub(3).map(|i| ancestors[i]);
            if let (Some(object), Some(container)) = (object, container) {
                if tree.kind(object) == NodeKind::ObjectExpression {
                    if let NodeData::AssignmentExpression { left, right, .. } =
                        &tree.get(container).data
                    {
                        if *right == object {
                            return is_commonjs_export_target(tree, *left);
                        }
                    }
                }
            }
        }
    }

    false
}

fn is_commonjs_export_target(tree: &SyntaxTree, node: NodeId) -> bool {
    match &tree.get(node).data {
        NodeData::Identifier { name } => name == "exports",
        NodeData::MemberExpression { object, .. } => {
            is_module_exports(tree, node) || is_commonjs_export_target(tree, *object)
        }
        _ => false,
    }
}

fn is_module_exports(tree: &SyntaxTree, node: NodeId) -> bool {
    let NodeData::MemberExpression {
        object,
        property,
        computed,
        ..
    } = &tree.get(node).data
    else {
        return false;
    };

    let object_is_module = tree
        .identifier_name(*object)
        .is_some_and(|name| name == "module");
    if object_is_module && property_matches(tree, *property, "exports", *computed) {
        return true;
    }
    is_module_exports(tree, *object)
}

fn property_matches(tree: &SyntaxTree, property: NodeId, name: &str, computed: bool) -> bool {
    if computed {
        matches!(
            &tree.get(property).data,
            NodeData::Literal {
                value: crate::syntax::LiteralValue::String(s)
            } if s == name
        )
    } else {
        tree.identifier_name(property).is_some_and(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::run_rule;

    fn check(code: &str) -> Vec<String> {
        run_rule(&NoUnusedVars::new(), "test.js", code)
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    #[test]
    fn unused_const_is_reported() {
        let messages = check("const unused = 1\n");

        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("'unused'"));
        assert!(messages[0].contains("never used"));
    }

    #[test]
    fn used_variable_is_not_reported() {
        assert!(check("const x = 1;\nconsole.log(x);\n").is_empty());
    }

    #[test]
    fn underscore_prefix_is_exempt() {
        assert!(check("const _unused = 1;\n").is_empty());
        assert!(check("function f(_ignored) { return 1; }\nf(2);\n").is_empty());
    }

    #[test]
    fn exported_bindings_are_exempt() {
        assert!(check("export const answer = 42;\n").is_empty());
        assert!(check("export function helper() {}\n").is_empty());
        assert!(check("export default function main() {}\n").is_empty());
        assert!(check("const internal = 1;\nexport { internal };\n").is_empty());
    }

    #[test]
    fn unused_parameter_is_reported() {
        let messages = check("function f(a, b) { return a; }\nf(1, 2);\n");

        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("'b'"));
    }

    #[test]
    fn rest_sibling_exemption_holds() {
        // a and b exist only to omit properties from rest.
        let code = "const obj = { a: 1, b: 2, c: 3 };\nconst { a, b, ...rest } = obj;\nconsole.log(rest);\n";
        assert!(check(code).is_empty());
    }

    #[test]
    fn rest_param_pattern_with_all_names_used() {
        let code =
            "function demo({a, ...rest}) { console.log(a); return rest.length }\ndemo({a:1})\n";
        assert!(check(code).is_empty());
    }

    #[test]
    fn unused_rest_binding_is_reported() {
        let code = "const { a, ...rest } = src();\nconsole.log(a);\nfunction src() { return {}; }\n";
        let messages = check(code);

        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("'rest'"));
    }

    #[test]
    fn closure_use_counts() {
        let code = "function outer() {\n  const value = 42;\n  return () => value * 2;\n}\nouter();\n";
        assert!(check(code).is_empty());
    }

    #[test]
    fn named_callback_function_is_exempt() {
        assert!(check("list.forEach(function each(item) { console.log(item); });\n/* globals list */\n").is_empty());
    }

    #[test]
    fn commonjs_export_assignment_is_exempt() {
        assert!(check("module.exports.run = function run() {};\n").is_empty());
        assert!(check("exports.start = function start() {};\n").is_empty());
    }

    #[test]
    fn multiple_unused_bindings_each_report() {
        let messages = check("const a = 1;\nlet b = 2;\nvar c = 3;\n");

        assert_eq!(messages.len(), 3);
    }

    #[test]
    fn destructured_defaults_do_not_mask_uses() {
        let code = "const { retries = 3 } = options();\nconsole.log(retries);\nfunction options() { return {}; }\n";
        assert!(check(code).is_empty());
    }
}

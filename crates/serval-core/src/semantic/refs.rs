//! Read-reference classification and pattern binding extraction
//!
//! An identifier occurrence is either a binding position (declarator ids,
//! import specifiers, non-computed member properties, `typeof` operands,
//! TypeScript declaration heads) or a read reference. The distinction is a
//! purely syntactic table keyed on the parent node, consulted once per
//! identifier during the main walk and shared by every rule that needs it.

use crate::syntax::{NodeData, NodeId, NodeKind, SyntaxTree};

/// Whether `node` is an identifier in a read position, judging by its
/// ancestor path (`ancestors` excludes `node` itself).
pub fn is_read_reference(tree: &SyntaxTree, node: NodeId, ancestors: &[NodeId]) -> bool {
    if tree.kind(node) != NodeKind::Identifier {
        return false;
    }
    let Some(&parent) = ancestors.last() else {
        return true;
    };
    let grandparent = ancestors
        .len()
        .checked_sub(2)
        .map(|index| ancestors[index]);

    match &tree.get(parent).data {
        NodeData::VariableDeclarator { id, .. } => *id != node,
        NodeData::FunctionDeclaration { id, .. } | NodeData::FunctionExpression { id, .. } => {
            *id != Some(node)
        }
        NodeData::ClassDeclaration { id, .. } | NodeData::ClassExpression { id, .. } => {
            *id != Some(node)
        }
        NodeData::ImportSpecifier { .. }
        | NodeData::ImportDefaultSpecifier { .. }
        | NodeData::ImportNamespaceSpecifier { .. } => false,
        NodeData::ExportSpecifier { .. }
        | NodeData::ExportNamedDeclaration { .. }
        | NodeData::ExportDefaultDeclaration { .. } => false,
        NodeData::LabeledStatement { .. } => false,
        NodeData::BreakStatement { .. } | NodeData::ContinueStatement { .. } => false,
        NodeData::CatchClause { param, .. } => *param != Some(node),
        NodeData::MemberExpression {
            object, computed, ..
        } => *object == node || *computed,
        NodeData::Property {
            key,
            value,
            computed,
            shorthand,
        } => {
            if grandparent.is_some_and(|gp| tree.kind(gp) == NodeKind::ObjectPattern) {
                return false;
            }
            if *shorthand && *value == node {
                return true;
            }
            if *computed && *key == node {
                return true;
            }
            *key != node
        }
        NodeData::PropertyDefinition { key, computed, .. }
        | NodeData::MethodDefinition { key, computed, .. } => {
            if *computed && *key == node {
                return true;
            }
            *key != node
        }
        NodeData::RestElement { .. } => false,
        NodeData::UnaryExpression { operator, .. } => operator != "typeof",
        NodeData::ArrayPattern { .. } | NodeData::ObjectPattern { .. } => false,
        NodeData::AssignmentPattern { left, .. } => *left != node,
        NodeData::TsEnumDeclaration { .. }
        | NodeData::TsModuleDeclaration { .. }
        | NodeData::TsImportEqualsDeclaration { .. }
        | NodeData::TsTypeAliasDeclaration { .. }
        | NodeData::TsInterfaceDeclaration { .. } => false,
        _ => true,
    }
}

/// One identifier bound by a pattern. `available_at` carries the enclosing
/// pattern element's end offset for destructuring elements; a plain
/// identifier binding leaves it unset and the caller falls back to the
/// declarator heuristic.
#[derive(Debug, Clone)]
pub struct PatternBinding {
    pub name: String,
    pub node: NodeId,
    pub available_at: Option<usize>,
}

/// All identifiers bound by `pattern`, in source order.
pub fn pattern_bindings(tree: &SyntaxTree, pattern: NodeId) -> Vec<PatternBinding> {
    let mut out = Vec::new();
    collect_bindings(tree, pattern, None, &mut out);
    out
}

fn collect_bindings(
    tree: &SyntaxTree,
    pattern: NodeId,
    container_end: Option<usize>,
    out: &mut Vec<PatternBinding>,
) {
    let node = tree.get(pattern);
    match &node.data {
        NodeData::Identifier { name } => out.push(PatternBinding {
            name: name.clone(),
            node: pattern,
            available_at: container_end,
        }),
        NodeData::RestElement { argument } => {
            collect_bindings(tree, *argument, container_end.or(Some(node.end)), out);
        }
        NodeData::AssignmentPattern { left, .. } => {
            collect_bindings(tree, *left, container_end.or(Some(node.end)), out);
        }
        NodeData::ArrayPattern { elements } => {
            for element in elements.iter().flatten() {
                let end = tree.get(*element).end;
                collect_bindings(tree, *element, Some(end), out);
            }
        }
        NodeData::ObjectPattern { properties } => {
            for property in properties {
                let prop_node = tree.get(*property);
                match &prop_node.data {
                    NodeData::RestElement { argument } => {
                        collect_bindings(tree, *argument, Some(prop_node.end), out);
                    }
                    NodeData::Property { value, .. } => {
                        collect_bindings(tree, *value, Some(prop_node.end), out);
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

/// The availability-offset heuristic for a `let`/`const` declarator: a later
/// same-scope read may see the binding from the initializer's end offset, or
/// from a function-valued initializer's start offset (calling the function
/// before the declaration still resolves the binding by then). Not
/// spec-accurate temporal-dead-zone semantics; this approximation is the
/// documented contract.
pub fn tdz_availability(tree: &SyntaxTree, declarator: NodeId) -> Option<usize> {
    let NodeData::VariableDeclarator { init, .. } = &tree.get(declarator).data else {
        return None;
    };
    let init = (*init)?;
    let init_node = tree.get(init);
    match init_node.kind() {
        NodeKind::FunctionExpression | NodeKind::ArrowFunctionExpression => Some(init_node.start),
        _ => Some(init_node.end),
    }
}

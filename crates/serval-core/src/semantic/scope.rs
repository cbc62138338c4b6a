//! Scope analysis for variable bindings and references
//!
//! The scope tree is arena-allocated and owned by [`ScopeModel`] for the
//! lifetime of one file's analysis. `exit_scope` only moves the current
//! pointer back to the parent; a popped [`Scope`] stays in the arena, so a
//! rule that captured a [`ScopeId`] during the walk can still resolve
//! against it from its Program exit listener. That retention is what makes
//! the deferred-resolution pattern sound.

use std::collections::HashMap;

use id_arena::{Arena, Id};

use crate::syntax::NodeId;

pub type ScopeId = Id<Scope>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Program,
    Function,
    Block,
    Class,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Var,
    Let,
    Const,
    Function,
    Param,
    Catch,
    Class,
    Import,
    TypeAlias,
    Enum,
    Namespace,
}

/// One declaration of a name inside a scope.
///
/// If `hoisted` is true the declaration is visible anywhere in its scope and
/// `available_from` is ignored by resolution; otherwise a lookup at offset
/// `k` only matches when `available_from <= k`.
#[derive(Debug, Clone)]
pub struct DeclarationInfo {
    pub name: String,
    pub node: NodeId,
    pub kind: DeclarationKind,
    pub hoisted: bool,
    pub available_from: usize,
}

/// A read reference recorded against the scope that was active when the
/// identifier was visited.
#[derive(Debug, Clone)]
pub struct Reference {
    pub name: String,
    pub node: NodeId,
}

#[derive(Debug)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub node: NodeId,
    declarations: HashMap<String, Vec<DeclarationInfo>>,
    references: Vec<Reference>,
}

impl Scope {
    pub fn declarations_of(&self, name: &str) -> &[DeclarationInfo] {
        self.declarations.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn declared_names(&self) -> impl Iterator<Item = &str> {
        self.declarations.keys().map(String::as_str)
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    fn declare(&mut self, info: DeclarationInfo) {
        self.declarations.entry(info.name.clone()).or_default().push(info);
    }
}

/// Where `declare` inserts a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoistTarget {
    /// The current scope.
    #[default]
    None,
    /// The nearest enclosing Function or Program scope.
    Function,
}

pub struct ScopeModel {
    arena: Arena<Scope>,
    root: Option<ScopeId>,
    current: Option<ScopeId>,
}

impl Default for ScopeModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeModel {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            current: None,
        }
    }

    pub fn enter_scope(&mut self, kind: ScopeKind, node: NodeId) -> ScopeId {
        let parent = self.current;
        let id = self.arena.alloc_with_id(|id| Scope {
            id,
            kind,
            parent,
            children: Vec::new(),
            node,
            declarations: HashMap::new(),
            references: Vec::new(),
        });

        if let Some(parent_id) = parent {
            self.arena[parent_id].children.push(id);
        }
        if self.root.is_none() {
            self.root = Some(id);
        }
        self.current = Some(id);
        id
    }

    /// Pop to the parent scope. The popped scope is retained in the arena.
    pub fn exit_scope(&mut self) {
        if let Some(current) = self.current {
            self.current = self.arena[current].parent;
        }
    }

    pub fn current(&self) -> Option<ScopeId> {
        self.current
    }

    pub fn root(&self) -> Option<ScopeId> {
        self.root
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.arena[id]
    }

    /// Insert a declaration into the current scope, or into the nearest
    /// Function/Program scope for `HoistTarget::Function`. The walk always
    /// terminates at the Program root, so hoisting cannot fail.
    pub fn declare(&mut self, info: DeclarationInfo, hoist_to: HoistTarget) {
        let current = self.current.expect("declare without an active scope");
        let target = match hoist_to {
            HoistTarget::None => current,
            HoistTarget::Function => self.hoisting_scope(current),
        };
        self.arena[target].declare(info);
    }

    fn hoisting_scope(&self, from: ScopeId) -> ScopeId {
        let mut scope = from;
        loop {
            match self.arena[scope].kind {
                ScopeKind::Function | ScopeKind::Program => return scope,
                _ => match self.arena[scope].parent {
                    Some(parent) => scope = parent,
                    None => return scope,
                },
            }
        }
    }

    pub fn add_reference(&mut self, reference: Reference) {
        let current = self.current.expect("reference without an active scope");
        self.arena[current].references.push(reference);
    }

    pub fn references(&self, scope: ScopeId) -> &[Reference] {
        self.arena[scope].references()
    }

    /// Resolve from the current scope. `before` of `None` accepts any
    /// availability offset.
    pub fn resolve(&self, name: &str, before: Option<usize>) -> Option<&DeclarationInfo> {
        self.current
            .and_then(|scope| self.resolve_from(scope, name, before))
    }

    /// Resolve by walking from `scope` upward through its parents. At each
    /// scope the first matching declaration wins, so the nearest enclosing
    /// scope beats an earlier offset. Program-kind scopes treat every
    /// declaration as visible unconditionally; module top-level bindings are
    /// not offset-checked.
    pub fn resolve_from(
        &self,
        scope: ScopeId,
        name: &str,
        before: Option<usize>,
    ) -> Option<&DeclarationInfo> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            let scope = &self.arena[id];
            let found = scope.declarations_of(name).iter().find(|decl| {
                if scope.kind == ScopeKind::Program {
                    return true;
                }
                if decl.hoisted {
                    return true;
                }
                match before {
                    None => true,
                    Some(before) => decl.available_from <= before,
                }
            });
            if found.is_some() {
                return found;
            }
            cursor = scope.parent;
        }
        None
    }

    pub fn ancestors(&self, id: ScopeId) -> AncestorIter<'_> {
        AncestorIter {
            model: self,
            current: Some(id),
        }
    }
}

pub struct AncestorIter<'a> {
    model: &'a ScopeModel,
    current: Option<ScopeId>,
}

impl<'a> Iterator for AncestorIter<'a> {
    type Item = &'a Scope;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        let scope = &self.model.arena[current];
        self.current = scope.parent;
        Some(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{NodeData, SyntaxTree};

    fn dummy_node(tree: &mut SyntaxTree) -> NodeId {
        tree.alloc(0, 0, NodeData::Program { body: Vec::new() })
    }

    fn decl(name: &str, node: NodeId, hoisted: bool, available_from: usize) -> DeclarationInfo {
        DeclarationInfo {
            name: name.to_string(),
            node,
            kind: if hoisted {
                DeclarationKind::Var
            } else {
                DeclarationKind::Let
            },
            hoisted,
            available_from,
        }
    }

    struct Fixture {
        model: ScopeModel,
        node: NodeId,
    }

    fn fixture() -> Fixture {
        let mut tree = SyntaxTree::new();
        let node = dummy_node(&mut tree);
        Fixture {
            model: ScopeModel::new(),
            node,
        }
    }

    #[test]
    fn enter_creates_nested_scopes() {
        let Fixture { mut model, node } = fixture();

        let program = model.enter_scope(ScopeKind::Program, node);
        let function = model.enter_scope(ScopeKind::Function, node);
        let block = model.enter_scope(ScopeKind::Block, node);

        assert_eq!(model.root(), Some(program));
        assert_eq!(model.current(), Some(block));
        assert_eq!(model.get(block).parent, Some(function));
        assert_eq!(model.get(function).parent, Some(program));
        assert_eq!(model.get(program).children, vec![function]);
    }

    #[test]
    fn exit_retains_popped_scope() {
        let Fixture { mut model, node } = fixture();

        model.enter_scope(ScopeKind::Program, node);
        let block = model.enter_scope(ScopeKind::Block, node);
        model.declare(decl("x", node, false, 10), HoistTarget::None);
        model.exit_scope();

        // The popped scope is still addressable and resolvable.
        assert_eq!(model.get(block).declarations_of("x").len(), 1);
        assert!(model.resolve_from(block, "x", Some(10)).is_some());
        assert_ne!(model.current(), Some(block));
    }

    #[test]
    fn hoisted_declaration_visible_at_any_offset() {
        let Fixture { mut model, node } = fixture();

        model.enter_scope(ScopeKind::Program, node);
        let function = model.enter_scope(ScopeKind::Function, node);
        model.declare(decl("v", node, true, 500), HoistTarget::None);

        for offset in [0, 100, 499, 500, 10_000] {
            assert!(
                model.resolve_from(function, "v", Some(offset)).is_some(),
                "hoisted declaration should resolve at offset {offset}"
            );
        }
    }

    #[test]
    fn non_hoisted_declaration_gated_by_offset() {
        let Fixture { mut model, node } = fixture();

        model.enter_scope(ScopeKind::Program, node);
        let function = model.enter_scope(ScopeKind::Function, node);
        model.declare(decl("x", node, false, 42), HoistTarget::None);

        assert!(model.resolve_from(function, "x", Some(41)).is_none());
        assert!(model.resolve_from(function, "x", Some(42)).is_some());
        assert!(model.resolve_from(function, "x", Some(100)).is_some());
        assert!(model.resolve_from(function, "x", None).is_some());
    }

    #[test]
    fn program_scope_ignores_offsets() {
        let Fixture { mut model, node } = fixture();

        let program = model.enter_scope(ScopeKind::Program, node);
        model.declare(decl("x", node, false, 42), HoistTarget::None);

        assert!(model.resolve_from(program, "x", Some(0)).is_some());
    }

    #[test]
    fn nearest_scope_wins_over_earliest_offset() {
        let Fixture { mut model, node } = fixture();

        model.enter_scope(ScopeKind::Program, node);
        model.declare(decl("x", node, false, 0), HoistTarget::None);
        let function = model.enter_scope(ScopeKind::Function, node);
        model.declare(decl("x", node, false, 90), HoistTarget::None);

        let resolved = model.resolve_from(function, "x", Some(100)).unwrap();
        assert_eq!(resolved.available_from, 90, "inner scope shadows outer");
    }

    #[test]
    fn resolution_falls_back_to_parent_scope() {
        let Fixture { mut model, node } = fixture();

        model.enter_scope(ScopeKind::Program, node);
        model.declare(decl("outer", node, true, 0), HoistTarget::None);
        let block = model.enter_scope(ScopeKind::Block, node);

        assert!(model.resolve_from(block, "outer", Some(0)).is_some());
        assert!(model.resolve_from(block, "missing", None).is_none());
    }

    #[test]
    fn function_hoisting_skips_block_scopes() {
        let Fixture { mut model, node } = fixture();

        model.enter_scope(ScopeKind::Program, node);
        let function = model.enter_scope(ScopeKind::Function, node);
        model.enter_scope(ScopeKind::Block, node);
        model.enter_scope(ScopeKind::Block, node);
        model.declare(decl("v", node, true, 0), HoistTarget::Function);

        assert_eq!(model.get(function).declarations_of("v").len(), 1);
    }

    #[test]
    fn function_hoisting_reaches_program_scope() {
        let Fixture { mut model, node } = fixture();

        let program = model.enter_scope(ScopeKind::Program, node);
        model.enter_scope(ScopeKind::Block, node);
        model.declare(decl("v", node, true, 0), HoistTarget::Function);

        assert_eq!(model.get(program).declarations_of("v").len(), 1);
    }

    #[test]
    fn references_attach_to_active_scope() {
        let Fixture { mut model, node } = fixture();

        model.enter_scope(ScopeKind::Program, node);
        let block = model.enter_scope(ScopeKind::Block, node);
        model.add_reference(Reference {
            name: "x".to_string(),
            node,
        });
        model.exit_scope();

        assert_eq!(model.references(block).len(), 1);
        assert_eq!(model.references(block)[0].name, "x");
        assert!(model.references(model.root().unwrap()).is_empty());
    }

    #[test]
    fn duplicate_declarations_keep_order() {
        let Fixture { mut model, node } = fixture();

        model.enter_scope(ScopeKind::Program, node);
        let function = model.enter_scope(ScopeKind::Function, node);
        model.declare(decl("x", node, false, 5), HoistTarget::None);
        model.declare(decl("x", node, false, 20), HoistTarget::None);

        let declarations = model.get(function).declarations_of("x");
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[0].available_from, 5);

        // First list entry that passes the gate wins.
        let resolved = model.resolve_from(function, "x", Some(25)).unwrap();
        assert_eq!(resolved.available_from, 5);
    }

    #[test]
    fn ancestors_iterate_to_root() {
        let Fixture { mut model, node } = fixture();

        model.enter_scope(ScopeKind::Program, node);
        model.enter_scope(ScopeKind::Function, node);
        let block = model.enter_scope(ScopeKind::Block, node);

        let kinds: Vec<ScopeKind> = model.ancestors(block).map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![ScopeKind::Block, ScopeKind::Function, ScopeKind::Program]
        );
    }
}

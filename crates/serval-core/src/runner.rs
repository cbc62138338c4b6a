//! Single-pass rule dispatch engine
//!
//! One depth-first pre/post-order walk over the syntax tree drives
//! everything: scope opening and closing, scope-entry hoisting, node-local
//! declarations, read-reference recording, and listener dispatch. Rules that
//! cannot decide at first sight of a node capture `(node, ancestors, scope)`
//! and finish in their Program exit listener, which runs after the whole
//! scope tree exists but before the Program scope is exited.

use std::collections::{HashMap, HashSet};

use crate::context::RuleContext;
use crate::diagnostic::{Diagnostic, Severity};
use crate::directives::InlineDirectives;
use crate::parser::LineIndex;
use crate::rules::RuleListeners;
use crate::semantic::{
    DeclarationInfo, DeclarationKind, HoistTarget, Reference, ScopeKind, ScopeModel,
    is_read_reference, pattern_bindings, tdz_availability,
};
use crate::syntax::{NodeData, NodeId, NodeKind, SyntaxTree, VarKind};

/// A rule activated for one analysis pass: resolved severity plus fresh
/// listener state.
pub struct ActiveRule {
    pub id: String,
    pub severity: Severity,
    pub listeners: Box<dyn RuleListeners>,
}

pub struct RunParams<'a> {
    pub tree: &'a SyntaxTree,
    pub source: &'a str,
    pub lines: &'a LineIndex,
    pub file_path: &'a str,
    pub globals: &'a HashSet<String>,
    pub directives: &'a InlineDirectives,
}

pub fn run_rules(params: RunParams<'_>, rules: Vec<ActiveRule>) -> Vec<Diagnostic> {
    let Some(root) = params.tree.root() else {
        return Vec::new();
    };

    let mut configs = Vec::with_capacity(rules.len());
    let mut listeners = Vec::with_capacity(rules.len());
    let mut enter_index: HashMap<NodeKind, Vec<usize>> = HashMap::new();
    let mut exit_index: HashMap<NodeKind, Vec<usize>> = HashMap::new();

    for (slot, rule) in rules.into_iter().enumerate() {
        for kind in rule.listeners.enter_kinds() {
            enter_index.entry(*kind).or_default().push(slot);
        }
        for kind in rule.listeners.exit_kinds() {
            exit_index.entry(*kind).or_default().push(slot);
        }
        configs.push(RuleSlot {
            id: rule.id,
            severity: rule.severity,
        });
        listeners.push(rule.listeners);
    }

    let mut walker = Walker {
        tree: params.tree,
        source: params.source,
        lines: params.lines,
        file_path: params.file_path,
        globals: params.globals,
        directives: params.directives,
        scopes: ScopeModel::new(),
        configs,
        listeners,
        enter_index,
        exit_index,
        ancestors: Vec::new(),
        diagnostics: Vec::new(),
    };

    walker.traverse(root);
    walker.diagnostics
}

struct RuleSlot {
    id: String,
    severity: Severity,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Enter,
    Exit,
}

struct Walker<'a> {
    tree: &'a SyntaxTree,
    source: &'a str,
    lines: &'a LineIndex,
    file_path: &'a str,
    globals: &'a HashSet<String>,
    directives: &'a InlineDirectives,
    scopes: ScopeModel,
    configs: Vec<RuleSlot>,
    listeners: Vec<Box<dyn RuleListeners>>,
    enter_index: HashMap<NodeKind, Vec<usize>>,
    exit_index: HashMap<NodeKind, Vec<usize>>,
    ancestors: Vec<NodeId>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Walker<'a> {
    fn traverse(&mut self, node: NodeId) {
        let scope_kind = scope_kind_for(self.tree, node);
        if let Some(kind) = scope_kind {
            self.scopes.enter_scope(kind, node);
            if kind == ScopeKind::Program {
                self.hoist_program_declarations(node);
            }
            self.hoist_body_function_declarations(node);
            self.handle_scope_introductions(node);
        }

        self.handle_in_scope_declarations(node);

        if is_read_reference(self.tree, node, &self.ancestors) {
            if let Some(name) = self.tree.identifier_name(node) {
                self.scopes.add_reference(Reference {
                    name: name.to_string(),
                    node,
                });
            }
        }

        self.notify(Phase::Enter, node);

        self.ancestors.push(node);
        for child in self.tree.children(node) {
            self.traverse(child);
        }
        self.ancestors.pop();

        self.notify(Phase::Exit, node);

        if scope_kind.is_some() {
            self.scopes.exit_scope();
        }
    }

    fn notify(&mut self, phase: Phase, node: NodeId) {
        let kind = self.tree.kind(node);
        let index = match phase {
            Phase::Enter => &self.enter_index,
            Phase::Exit => &self.exit_index,
        };
        let Some(slots) = index.get(&kind) else {
            return;
        };
        // Registration order; the listing is tiny, cloning keeps the borrow
        // on the index map out of the dispatch loop.
        let slots = slots.clone();

        for slot in slots {
            let config = &self.configs[slot];
            let mut ctx = RuleContext {
                file_path: self.file_path,
                source: self.source,
                tree: self.tree,
                scopes: &self.scopes,
                lines: self.lines,
                globals: self.globals,
                directives: self.directives,
                diagnostics: &mut self.diagnostics,
                rule_id: &config.id,
                severity: config.severity,
                node,
                ancestors: &self.ancestors,
            };
            let node_ref = self.tree.get(node);
            match phase {
                Phase::Enter => self.listeners[slot].on_enter(node_ref, &mut ctx),
                Phase::Exit => self.listeners[slot].on_exit(node_ref, &mut ctx),
            }
        }
    }

    // ---- hoisting --------------------------------------------------------

    /// Program entry: every top-level binding becomes visible before any
    /// statement runs. `var` and function declarations hoist; `let`/`const`
    /// and classes are declared with their textual offsets (the Program
    /// scope ignores offsets during resolution anyway).
    fn hoist_program_declarations(&mut self, program: NodeId) {
        let NodeData::Program { body } = &self.tree.get(program).data else {
            return;
        };

        for &statement in body {
            match &self.tree.get(statement).data {
                NodeData::VariableDeclaration {
                    kind,
                    declarations,
                } => {
                    let is_var = *kind == VarKind::Var;
                    for &declarator in declarations {
                        self.declare_declarator_bindings(declarator, *kind, is_var, false);
                    }
                }
                NodeData::FunctionDeclaration { id: Some(id), .. } => {
                    self.declare_hoisted_function(*id);
                }
                NodeData::ClassDeclaration { id: Some(id), .. } => {
                    self.declare_class(*id);
                }
                NodeData::ExportNamedDeclaration {
                    declaration: Some(declaration),
                    ..
                }
                | NodeData::ExportDefaultDeclaration { declaration } => {
                    if let NodeData::ClassDeclaration { id: Some(id), .. } =
                        &self.tree.get(*declaration).data
                    {
                        self.declare_class(*id);
                    }
                }
                _ => {}
            }
        }
    }

    /// Hoist the function declarations of this node's own statement list
    /// into the nearest function scope.
    fn hoist_body_function_declarations(&mut self, node: NodeId) {
        let Some(body) = body_statements(self.tree, node) else {
            return;
        };

        for &statement in body {
            match &self.tree.get(statement).data {
                NodeData::FunctionDeclaration { id: Some(id), .. } => {
                    self.declare_hoisted_function(*id);
                }
                NodeData::ExportNamedDeclaration {
                    declaration: Some(declaration),
                    ..
                }
                | NodeData::ExportDefaultDeclaration { declaration } => {
                    match &self.tree.get(*declaration).data {
                        NodeData::FunctionDeclaration { id: Some(id), .. } => {
                            self.declare_hoisted_function(*id);
                        }
                        NodeData::ClassDeclaration { id: Some(id), .. } => {
                            self.declare_class(*id);
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }
    }

    /// Declarations introduced by entering the scope itself: parameters, a
    /// named function expression's own name, the caught parameter, a class
    /// expression's name.
    fn handle_scope_introductions(&mut self, node: NodeId) {
        match &self.tree.get(node).data {
            NodeData::FunctionDeclaration { id, params, .. }
            | NodeData::FunctionExpression { id, params, .. } => {
                let is_expression = self.tree.kind(node) == NodeKind::FunctionExpression;
                let own_name = if is_expression { *id } else { None };
                for &param in params {
                    self.declare_params(param);
                }
                if let Some(id) = own_name {
                    self.declare_hoisted_function(id);
                }
            }
            NodeData::ArrowFunctionExpression { params, .. } => {
                for &param in params {
                    self.declare_params(param);
                }
            }
            NodeData::CatchClause {
                param: Some(param), ..
            } => {
                for binding in pattern_bindings(self.tree, *param) {
                    self.scopes.declare(
                        DeclarationInfo {
                            name: binding.name,
                            node: binding.node,
                            kind: DeclarationKind::Catch,
                            hoisted: true,
                            available_from: self.tree.get(binding.node).start,
                        },
                        HoistTarget::None,
                    );
                }
            }
            NodeData::ClassExpression { id: Some(id), .. } => {
                self.declare_class(*id);
            }
            _ => {}
        }
    }

    /// Node-local declarations that are not scope-entry hoisted.
    fn handle_in_scope_declarations(&mut self, node: NodeId) {
        match &self.tree.get(node).data {
            NodeData::VariableDeclaration {
                kind,
                declarations,
            } => {
                let is_var = *kind == VarKind::Var;
                for &declarator in declarations {
                    self.declare_declarator_bindings(declarator, *kind, is_var, true);
                }
            }
            NodeData::ImportDeclaration {
                specifiers,
                type_only,
                ..
            } => {
                if *type_only {
                    return;
                }
                for &specifier in specifiers {
                    let local = match &self.tree.get(specifier).data {
                        NodeData::ImportSpecifier {
                            local,
                            type_only: false,
                        } => Some(*local),
                        NodeData::ImportSpecifier { type_only: true, .. } => None,
                        NodeData::ImportDefaultSpecifier { local }
                        | NodeData::ImportNamespaceSpecifier { local } => Some(*local),
                        _ => None,
                    };
                    if let Some(local) = local {
                        self.declare_import(local);
                    }
                }
            }
            NodeData::ClassDeclaration { id: Some(id), .. } => {
                self.declare_class(*id);
            }
            NodeData::TsImportEqualsDeclaration {
                id,
                type_only: false,
            } => {
                self.declare_import(*id);
            }
            NodeData::TsEnumDeclaration { id, declare: false } => {
                self.declare_named(*id, DeclarationKind::Enum, false);
            }
            NodeData::TsModuleDeclaration {
                id: Some(id),
                declare: false,
            } => {
                self.declare_named(*id, DeclarationKind::Namespace, false);
            }
            NodeData::TsTypeAliasDeclaration { id } => {
                self.declare_named(*id, DeclarationKind::TypeAlias, true);
            }
            NodeData::TsInterfaceDeclaration { id } => {
                self.declare_named(*id, DeclarationKind::TypeAlias, true);
            }
            _ => {}
        }
    }

    /// Declare every binding of one declarator. Non-hoisted bindings get an
    /// availability offset: the pattern element's container end when the
    /// binding came from a destructuring element, otherwise the declarator's
    /// initializer heuristic, falling back to the binding's own offset.
    fn declare_declarator_bindings(
        &mut self,
        declarator: NodeId,
        kind: VarKind,
        hoisted: bool,
        use_tdz_heuristic: bool,
    ) {
        let NodeData::VariableDeclarator { id, .. } = &self.tree.get(declarator).data else {
            return;
        };
        let pattern = *id;
        let decl_kind = match kind {
            VarKind::Var => DeclarationKind::Var,
            VarKind::Let => DeclarationKind::Let,
            VarKind::Const => DeclarationKind::Const,
        };
        let hoist_to = if hoisted {
            HoistTarget::Function
        } else {
            HoistTarget::None
        };

        for binding in pattern_bindings(self.tree, pattern) {
            let node_start = self.tree.get(binding.node).start;
            let available_from = if hoisted {
                node_start
            } else if use_tdz_heuristic {
                binding
                    .available_at
                    .or_else(|| tdz_availability(self.tree, declarator))
                    .unwrap_or(node_start)
            } else {
                node_start
            };
            self.scopes.declare(
                DeclarationInfo {
                    name: binding.name,
                    node: binding.node,
                    kind: decl_kind,
                    hoisted,
                    available_from,
                },
                hoist_to,
            );
        }
    }

    fn declare_params(&mut self, param: NodeId) {
        for binding in pattern_bindings(self.tree, param) {
            self.scopes.declare(
                DeclarationInfo {
                    name: binding.name,
                    node: binding.node,
                    kind: DeclarationKind::Param,
                    hoisted: true,
                    available_from: self.tree.get(binding.node).start,
                },
                HoistTarget::None,
            );
        }
    }

    fn declare_hoisted_function(&mut self, id: NodeId) {
        if let Some(name) = self.tree.identifier_name(id) {
            self.scopes.declare(
                DeclarationInfo {
                    name: name.to_string(),
                    node: id,
                    kind: DeclarationKind::Function,
                    hoisted: true,
                    available_from: self.tree.get(id).start,
                },
                HoistTarget::Function,
            );
        }
    }

    /// Classes are not hoisted; the name becomes resolvable at its textual
    /// position.
    fn declare_class(&mut self, id: NodeId) {
        self.declare_named(id, DeclarationKind::Class, false);
    }

    fn declare_import(&mut self, local: NodeId) {
        self.declare_named(local, DeclarationKind::Import, true);
    }

    fn declare_named(&mut self, id: NodeId, kind: DeclarationKind, hoisted: bool) {
        if let Some(name) = self.tree.identifier_name(id) {
            self.scopes.declare(
                DeclarationInfo {
                    name: name.to_string(),
                    node: id,
                    kind,
                    hoisted,
                    available_from: self.tree.get(id).start,
                },
                HoistTarget::None,
            );
        }
    }
}

fn scope_kind_for(tree: &SyntaxTree, node: NodeId) -> Option<ScopeKind> {
    match tree.kind(node) {
        NodeKind::Program => Some(ScopeKind::Program),
        NodeKind::FunctionDeclaration
        | NodeKind::FunctionExpression
        | NodeKind::ArrowFunctionExpression => Some(ScopeKind::Function),
        NodeKind::BlockStatement
        | NodeKind::CatchClause
        | NodeKind::ForInStatement
        | NodeKind::ForOfStatement => Some(ScopeKind::Block),
        NodeKind::ClassExpression => Some(ScopeKind::Class),
        _ => None,
    }
}

fn body_statements(tree: &SyntaxTree, node: NodeId) -> Option<&[NodeId]> {
    match &tree.get(node).data {
        NodeData::Program { body } | NodeData::BlockStatement { body } => Some(body),
        NodeData::FunctionDeclaration { body: Some(body), .. }
        | NodeData::FunctionExpression { body: Some(body), .. } => {
            match &tree.get(*body).data {
                NodeData::BlockStatement { body } => Some(body),
                _ => None,
            }
        }
        NodeData::ArrowFunctionExpression { body, .. } => match &tree.get(*body).data {
            NodeData::BlockStatement { body } => Some(body),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Report;
    use crate::parser::ParsedFile;
    use crate::syntax::Node;

    fn run_with(file: &ParsedFile, rules: Vec<ActiveRule>) -> Vec<Diagnostic> {
        run_rules(
            RunParams {
                tree: file.tree().expect("parse failed"),
                source: file.source(),
                lines: file.lines(),
                file_path: &file.metadata().filename,
                globals: file.file_globals(),
                directives: file.directives(),
            },
            rules,
        )
    }

    /// Counts enter/exit invocations for one node kind.
    struct CountingListeners {
        kind: NodeKind,
        enters: usize,
        exits: usize,
    }

    impl RuleListeners for CountingListeners {
        fn enter_kinds(&self) -> &'static [NodeKind] {
            &[NodeKind::Identifier]
        }

        fn exit_kinds(&self) -> &'static [NodeKind] {
            &[NodeKind::Identifier]
        }

        fn on_enter(&mut self, node: &Node, ctx: &mut RuleContext<'_>) {
            assert_eq!(node.kind(), self.kind);
            self.enters += 1;
            if self.enters == 1 {
                ctx.report(Report::new("first identifier"));
            }
        }

        fn on_exit(&mut self, _node: &Node, _ctx: &mut RuleContext<'_>) {
            self.exits += 1;
        }
    }

    #[test]
    fn listeners_fire_for_matching_kinds() {
        let file = ParsedFile::from_source("test.js", "const a = b;");
        let diagnostics = run_with(
            &file,
            vec![ActiveRule {
                id: "test-rule".to_string(),
                severity: Severity::Warning,
                listeners: Box::new(CountingListeners {
                    kind: NodeKind::Identifier,
                    enters: 0,
                    exits: 0,
                }),
            }],
        );

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule_id.as_deref(), Some("test-rule"));
        assert_eq!(diagnostics[0].severity, Severity::Warning);
    }

    /// Observes the scope and reference state at Program exit and smuggles
    /// it out through a diagnostic message.
    struct ReportingProbe;

    impl RuleListeners for ReportingProbe {
        fn exit_kinds(&self) -> &'static [NodeKind] {
            &[NodeKind::Program]
        }

        fn on_exit(&mut self, _node: &Node, ctx: &mut RuleContext<'_>) {
            let scope = ctx.current_scope();
            let names: Vec<String> = ctx
                .references(scope)
                .iter()
                .map(|r| r.name.clone())
                .collect();
            let hoisted = ctx.resolve_from(scope, "hoisted", Some(0)).is_some();
            ctx.report(Report::new(format!(
                "refs={} hoisted={}",
                names.join(","),
                hoisted
            )));
        }
    }

    #[test]
    fn program_exit_sees_full_scope_tree() {
        // The Program exit listener runs before the Program scope is
        // exited; the probe must observe the references and hoisted
        // declarations recorded during the walk.
        let file = ParsedFile::from_source("test.js", "use(hoisted);\nvar hoisted = 1;\n");

        let diagnostics = run_with(
            &file,
            vec![ActiveRule {
                id: "probe".to_string(),
                severity: Severity::Warning,
                listeners: Box::new(ReportingProbe),
            }],
        );

        assert_eq!(diagnostics.len(), 1);
        let message = &diagnostics[0].message;
        assert!(message.contains("hoisted=true"), "got: {message}");
        assert!(message.contains("use"), "got: {message}");
        assert!(message.contains("hoisted"), "got: {message}");
    }

    #[test]
    fn rules_run_in_registration_order() {
        struct Tagger(&'static str);
        impl RuleListeners for Tagger {
            fn enter_kinds(&self) -> &'static [NodeKind] {
                &[NodeKind::DebuggerStatement]
            }
            fn on_enter(&mut self, _node: &Node, ctx: &mut RuleContext<'_>) {
                ctx.report(Report::new(self.0));
            }
        }

        let file = ParsedFile::from_source("test.js", "debugger;");
        let diagnostics = run_with(
            &file,
            vec![
                ActiveRule {
                    id: "first".to_string(),
                    severity: Severity::Error,
                    listeners: Box::new(Tagger("from first")),
                },
                ActiveRule {
                    id: "second".to_string(),
                    severity: Severity::Error,
                    listeners: Box::new(Tagger("from second")),
                },
            ],
        );

        let order: Vec<&str> = diagnostics
            .iter()
            .map(|d| d.rule_id.as_deref().unwrap())
            .collect();
        assert_eq!(order, vec!["first", "second"]);
    }

    #[test]
    fn suppressed_report_is_never_queued() {
        struct AlwaysReport;
        impl RuleListeners for AlwaysReport {
            fn enter_kinds(&self) -> &'static [NodeKind] {
                &[NodeKind::DebuggerStatement]
            }
            fn on_enter(&mut self, _node: &Node, ctx: &mut RuleContext<'_>) {
                ctx.report(Report::new("boom"));
            }
        }

        let file = ParsedFile::from_source(
            "test.js",
            "// serval-disable-next-line probe\ndebugger;\n",
        );
        let diagnostics = run_with(
            &file,
            vec![ActiveRule {
                id: "probe".to_string(),
                severity: Severity::Error,
                listeners: Box::new(AlwaysReport),
            }],
        );

        assert!(diagnostics.is_empty());
    }
}

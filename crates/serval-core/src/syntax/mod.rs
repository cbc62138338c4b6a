//! Lowered syntax tree for JavaScript/TypeScript source
//!
//! The parser produces a [`SyntaxTree`]: an arena of [`Node`]s tagged with a
//! [`NodeKind`] and carrying 0-based byte offsets into the source text.
//! Child enumeration is an exhaustive match over [`NodeData`], so traversal
//! never relies on reflection-style field walking and new node shapes fail
//! to compile until every consumer handles them.

pub mod lower;

use id_arena::{Arena, Id};

pub type NodeId = Id<Node>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    VariableDeclaration,
    VariableDeclarator,
    FunctionDeclaration,
    FunctionExpression,
    ArrowFunctionExpression,
    ClassDeclaration,
    ClassExpression,
    ClassBody,
    MethodDefinition,
    PropertyDefinition,
    StaticBlock,
    BlockStatement,
    ExpressionStatement,
    IfStatement,
    ForStatement,
    ForInStatement,
    ForOfStatement,
    WhileStatement,
    DoWhileStatement,
    SwitchStatement,
    SwitchCase,
    ReturnStatement,
    ThrowStatement,
    TryStatement,
    CatchClause,
    LabeledStatement,
    BreakStatement,
    ContinueStatement,
    EmptyStatement,
    DebuggerStatement,
    WithStatement,
    ImportDeclaration,
    ImportSpecifier,
    ImportDefaultSpecifier,
    ImportNamespaceSpecifier,
    ExportNamedDeclaration,
    ExportDefaultDeclaration,
    ExportAllDeclaration,
    ExportSpecifier,
    Identifier,
    PrivateIdentifier,
    Literal,
    TemplateLiteral,
    TaggedTemplateExpression,
    ThisExpression,
    Super,
    MetaProperty,
    ArrayExpression,
    ObjectExpression,
    Property,
    SpreadElement,
    UnaryExpression,
    UpdateExpression,
    BinaryExpression,
    LogicalExpression,
    AssignmentExpression,
    ConditionalExpression,
    CallExpression,
    NewExpression,
    MemberExpression,
    SequenceExpression,
    AwaitExpression,
    YieldExpression,
    ObjectPattern,
    ArrayPattern,
    RestElement,
    AssignmentPattern,
    JsxElement,
    TsEnumDeclaration,
    TsModuleDeclaration,
    TsImportEqualsDeclaration,
    TsTypeAliasDeclaration,
    TsInterfaceDeclaration,
}

impl NodeKind {
    /// ESTree-style kind name, used in messages and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Program => "Program",
            NodeKind::VariableDeclaration => "VariableDeclaration",
            NodeKind::VariableDeclarator => "VariableDeclarator",
            NodeKind::FunctionDeclaration => "FunctionDeclaration",
            NodeKind::FunctionExpression => "FunctionExpression",
            NodeKind::ArrowFunctionExpression => "ArrowFunctionExpression",
            NodeKind::ClassDeclaration => "ClassDeclaration",
            NodeKind::ClassExpression => "ClassExpression",
            NodeKind::ClassBody => "ClassBody",
            NodeKind::MethodDefinition => "MethodDefinition",
            NodeKind::PropertyDefinition => "PropertyDefinition",
            NodeKind::StaticBlock => "StaticBlock",
            NodeKind::BlockStatement => "BlockStatement",
            NodeKind::ExpressionStatement => "ExpressionStatement",
            NodeKind::IfStatement => "IfStatement",
            NodeKind::ForStatement => "ForStatement",
            NodeKind::ForInStatement => "ForInStatement",
            NodeKind::ForOfStatement => "ForOfStatement",
            NodeKind::WhileStatement => "WhileStatement",
            NodeKind::DoWhileStatement => "DoWhileStatement",
            NodeKind::SwitchStatement => "SwitchStatement",
            NodeKind::SwitchCase => "SwitchCase",
            NodeKind::ReturnStatement => "ReturnStatement",
            NodeKind::ThrowStatement => "ThrowStatement",
            NodeKind::TryStatement => "TryStatement",
            NodeKind::CatchClause => "CatchClause",
            NodeKind::LabeledStatement => "LabeledStatement",
            NodeKind::BreakStatement => "BreakStatement",
            NodeKind::ContinueStatement => "ContinueStatement",
            NodeKind::EmptyStatement => "EmptyStatement",
            NodeKind::DebuggerStatement => "DebuggerStatement",
            NodeKind::WithStatement => "WithStatement",
            NodeKind::ImportDeclaration => "ImportDeclaration",
            NodeKind::ImportSpecifier => "ImportSpecifier",
            NodeKind::ImportDefaultSpecifier => "ImportDefaultSpecifier",
            NodeKind::ImportNamespaceSpecifier => "ImportNamespaceSpecifier",
            NodeKind::ExportNamedDeclaration => "ExportNamedDeclaration",
            NodeKind::ExportDefaultDeclaration => "ExportDefaultDeclaration",
            NodeKind::ExportAllDeclaration => "ExportAllDeclaration",
            NodeKind::ExportSpecifier => "ExportSpecifier",
            NodeKind::Identifier => "Identifier",
            NodeKind::PrivateIdentifier => "PrivateIdentifier",
            NodeKind::Literal => "Literal",
            NodeKind::TemplateLiteral => "TemplateLiteral",
            NodeKind::TaggedTemplateExpression => "TaggedTemplateExpression",
            NodeKind::ThisExpression => "ThisExpression",
            NodeKind::Super => "Super",
            NodeKind::MetaProperty => "MetaProperty",
            NodeKind::ArrayExpression => "ArrayExpression",
            NodeKind::ObjectExpression => "ObjectExpression",
            NodeKind::Property => "Property",
            NodeKind::SpreadElement => "SpreadElement",
            NodeKind::UnaryExpression => "UnaryExpression",
            NodeKind::UpdateExpression => "UpdateExpression",
            NodeKind::BinaryExpression => "BinaryExpression",
            NodeKind::LogicalExpression => "LogicalExpression",
            NodeKind::AssignmentExpression => "AssignmentExpression",
            NodeKind::ConditionalExpression => "ConditionalExpression",
            NodeKind::CallExpression => "CallExpression",
            NodeKind::NewExpression => "NewExpression",
            NodeKind::MemberExpression => "MemberExpression",
            NodeKind::SequenceExpression => "SequenceExpression",
            NodeKind::AwaitExpression => "AwaitExpression",
            NodeKind::YieldExpression => "YieldExpression",
            NodeKind::ObjectPattern => "ObjectPattern",
            NodeKind::ArrayPattern => "ArrayPattern",
            NodeKind::RestElement => "RestElement",
            NodeKind::AssignmentPattern => "AssignmentPattern",
            NodeKind::JsxElement => "JSXElement",
            NodeKind::TsEnumDeclaration => "TSEnumDeclaration",
            NodeKind::TsModuleDeclaration => "TSModuleDeclaration",
            NodeKind::TsImportEqualsDeclaration => "TSImportEqualsDeclaration",
            NodeKind::TsTypeAliasDeclaration => "TSTypeAliasDeclaration",
            NodeKind::TsInterfaceDeclaration => "TSInterfaceDeclaration",
        }
    }

    pub fn is_function_like(&self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDeclaration
                | NodeKind::FunctionExpression
                | NodeKind::ArrowFunctionExpression
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

impl VarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    BigInt(String),
    Regex { pattern: String, flags: String },
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Program {
        body: Vec<NodeId>,
    },
    VariableDeclaration {
        kind: VarKind,
        declarations: Vec<NodeId>,
    },
    VariableDeclarator {
        id: NodeId,
        init: Option<NodeId>,
    },
    FunctionDeclaration {
        id: Option<NodeId>,
        params: Vec<NodeId>,
        body: Option<NodeId>,
    },
    FunctionExpression {
        id: Option<NodeId>,
        params: Vec<NodeId>,
        body: Option<NodeId>,
    },
    ArrowFunctionExpression {
        params: Vec<NodeId>,
        body: NodeId,
    },
    ClassDeclaration {
        id: Option<NodeId>,
        super_class: Option<NodeId>,
        body: NodeId,
    },
    ClassExpression {
        id: Option<NodeId>,
        super_class: Option<NodeId>,
        body: NodeId,
    },
    ClassBody {
        body: Vec<NodeId>,
    },
    MethodDefinition {
        key: NodeId,
        value: NodeId,
        computed: bool,
        is_static: bool,
    },
    PropertyDefinition {
        key: NodeId,
        value: Option<NodeId>,
        computed: bool,
        is_static: bool,
    },
    StaticBlock {
        body: Vec<NodeId>,
    },
    BlockStatement {
        body: Vec<NodeId>,
    },
    ExpressionStatement {
        expression: NodeId,
    },
    IfStatement {
        test: NodeId,
        consequent: NodeId,
        alternate: Option<NodeId>,
    },
    ForStatement {
        init: Option<NodeId>,
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    },
    ForInStatement {
        left: NodeId,
        right: NodeId,
        body: NodeId,
    },
    ForOfStatement {
        left: NodeId,
        right: NodeId,
        body: NodeId,
    },
    WhileStatement {
        test: NodeId,
        body: NodeId,
    },
    DoWhileStatement {
        body: NodeId,
        test: NodeId,
    },
    SwitchStatement {
        discriminant: NodeId,
        cases: Vec<NodeId>,
    },
    SwitchCase {
        test: Option<NodeId>,
        consequent: Vec<NodeId>,
    },
    ReturnStatement {
        argument: Option<NodeId>,
    },
    ThrowStatement {
        argument: NodeId,
    },
    TryStatement {
        block: NodeId,
        handler: Option<NodeId>,
        finalizer: Option<NodeId>,
    },
    CatchClause {
        param: Option<NodeId>,
        body: NodeId,
    },
    LabeledStatement {
        label: NodeId,
        body: NodeId,
    },
    BreakStatement {
        label: Option<NodeId>,
    },
    ContinueStatement {
        label: Option<NodeId>,
    },
    EmptyStatement,
    DebuggerStatement,
    WithStatement {
        object: NodeId,
        body: NodeId,
    },
    ImportDeclaration {
        specifiers: Vec<NodeId>,
        source: NodeId,
        type_only: bool,
    },
    ImportSpecifier {
        local: NodeId,
        type_only: bool,
    },
    ImportDefaultSpecifier {
        local: NodeId,
    },
    ImportNamespaceSpecifier {
        local: NodeId,
    },
    ExportNamedDeclaration {
        declaration: Option<NodeId>,
        specifiers: Vec<NodeId>,
        source: Option<NodeId>,
    },
    ExportDefaultDeclaration {
        declaration: NodeId,
    },
    ExportAllDeclaration {
        source: NodeId,
    },
    ExportSpecifier {
        local: NodeId,
    },
    Identifier {
        name: String,
    },
    PrivateIdentifier {
        name: String,
    },
    Literal {
        value: LiteralValue,
    },
    TemplateLiteral {
        quasis: Vec<String>,
        expressions: Vec<NodeId>,
    },
    TaggedTemplateExpression {
        tag: NodeId,
        quasi: NodeId,
    },
    ThisExpression,
    Super,
    MetaProperty {
        meta: String,
        property: String,
    },
    ArrayExpression {
        elements: Vec<Option<NodeId>>,
    },
    ObjectExpression {
        properties: Vec<NodeId>,
    },
    Property {
        key: NodeId,
        value: NodeId,
        computed: bool,
        shorthand: bool,
    },
    SpreadElement {
        argument: NodeId,
    },
    UnaryExpression {
        operator: String,
        argument: NodeId,
    },
    UpdateExpression {
        operator: String,
        argument: NodeId,
        prefix: bool,
    },
    BinaryExpression {
        operator: String,
        left: NodeId,
        right: NodeId,
    },
    LogicalExpression {
        operator: String,
        left: NodeId,
        right: NodeId,
    },
    AssignmentExpression {
        operator: String,
        left: NodeId,
        right: NodeId,
    },
    ConditionalExpression {
        test: NodeId,
        consequent: NodeId,
        alternate: NodeId,
    },
    CallExpression {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    NewExpression {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    MemberExpression {
        object: NodeId,
        property: NodeId,
        computed: bool,
        optional: bool,
    },
    SequenceExpression {
        expressions: Vec<NodeId>,
    },
    AwaitExpression {
        argument: NodeId,
    },
    YieldExpression {
        argument: Option<NodeId>,
        delegate: bool,
    },
    ObjectPattern {
        properties: Vec<NodeId>,
    },
    ArrayPattern {
        elements: Vec<Option<NodeId>>,
    },
    RestElement {
        argument: NodeId,
    },
    AssignmentPattern {
        left: NodeId,
        right: NodeId,
    },
    /// JSX element or fragment, flattened to the parts that can reference
    /// JavaScript bindings: an uppercase component name, attribute and spread
    /// expressions, and expression children.
    JsxElement {
        parts: Vec<NodeId>,
    },
    TsEnumDeclaration {
        id: NodeId,
        declare: bool,
    },
    TsModuleDeclaration {
        id: Option<NodeId>,
        declare: bool,
    },
    TsImportEqualsDeclaration {
        id: NodeId,
        type_only: bool,
    },
    TsTypeAliasDeclaration {
        id: NodeId,
    },
    TsInterfaceDeclaration {
        id: NodeId,
    },
}

#[derive(Debug)]
pub struct Node {
    pub id: NodeId,
    /// 0-based byte offset of the first character of the node.
    pub start: usize,
    /// 0-based byte offset one past the last character of the node.
    pub end: usize,
    pub data: NodeData,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match &self.data {
            NodeData::Program { .. } => NodeKind::Program,
            NodeData::VariableDeclaration { .. } => NodeKind::VariableDeclaration,
            NodeData::VariableDeclarator { .. } => NodeKind::VariableDeclarator,
            NodeData::FunctionDeclaration { .. } => NodeKind::FunctionDeclaration,
            NodeData::FunctionExpression { .. } => NodeKind::FunctionExpression,
            NodeData::ArrowFunctionExpression { .. } => NodeKind::ArrowFunctionExpression,
            NodeData::ClassDeclaration { .. } => NodeKind::ClassDeclaration,
            NodeData::ClassExpression { .. } => NodeKind::ClassExpression,
            NodeData::ClassBody { .. } => NodeKind::ClassBody,
            NodeData::MethodDefinition { .. } => NodeKind::MethodDefinition,
            NodeData::PropertyDefinition { .. } => NodeKind::PropertyDefinition,
            NodeData::StaticBlock { .. } => NodeKind::StaticBlock,
            NodeData::BlockStatement { .. } => NodeKind::BlockStatement,
            NodeData::ExpressionStatement { .. } => NodeKind::ExpressionStatement,
            NodeData::IfStatement { .. } => NodeKind::IfStatement,
            NodeData::ForStatement { .. } => NodeKind::ForStatement,
            NodeData::ForInStatement { .. } => NodeKind::ForInStatement,
            NodeData::ForOfStatement { .. } => NodeKind::ForOfStatement,
            NodeData::WhileStatement { .. } => NodeKind::WhileStatement,
            NodeData::DoWhileStatement { .. } => NodeKind::DoWhileStatement,
            NodeData::SwitchStatement { .. } => NodeKind::SwitchStatement,
            NodeData::SwitchCase { .. } => NodeKind::SwitchCase,
            NodeData::ReturnStatement { .. } => NodeKind::ReturnStatement,
            NodeData::ThrowStatement { .. } => NodeKind::ThrowStatement,
            NodeData::TryStatement { .. } => NodeKind::TryStatement,
            NodeData::CatchClause { .. } => NodeKind::CatchClause,
            NodeData::LabeledStatement { .. } => NodeKind::LabeledStatement,
            NodeData::BreakStatement { .. } => NodeKind::BreakStatement,
            NodeData::ContinueStatement { .. } => NodeKind::ContinueStatement,
            NodeData::EmptyStatement => NodeKind::EmptyStatement,
            NodeData::DebuggerStatement => NodeKind::DebuggerStatement,
            NodeData::WithStatement { .. } => NodeKind::WithStatement,
            NodeData::ImportDeclaration { .. } => NodeKind::ImportDeclaration,
            NodeData::ImportSpecifier { .. } => NodeKind::ImportSpecifier,
            NodeData::ImportDefaultSpecifier { .. } => NodeKind::ImportDefaultSpecifier,
            NodeData::ImportNamespaceSpecifier { .. } => NodeKind::ImportNamespaceSpecifier,
            NodeData::ExportNamedDeclaration { .. } => NodeKind::ExportNamedDeclaration,
            NodeData::ExportDefaultDeclaration { .. } => NodeKind::ExportDefaultDeclaration,
            NodeData::ExportAllDeclaration { .. } => NodeKind::ExportAllDeclaration,
            NodeData::ExportSpecifier { .. } => NodeKind::ExportSpecifier,
            NodeData::Identifier { .. } => NodeKind::Identifier,
            NodeData::PrivateIdentifier { .. } => NodeKind::PrivateIdentifier,
            NodeData::Literal { .. } => NodeKind::Literal,
            NodeData::TemplateLiteral { .. } => NodeKind::TemplateLiteral,
            NodeData::TaggedTemplateExpression { .. } => NodeKind::TaggedTemplateExpression,
            NodeData::ThisExpression => NodeKind::ThisExpression,
            NodeData::Super => NodeKind::Super,
            NodeData::MetaProperty { .. } => NodeKind::MetaProperty,
            NodeData::ArrayExpression { .. } => NodeKind::ArrayExpression,
            NodeData::ObjectExpression { .. } => NodeKind::ObjectExpression,
            NodeData::Property { .. } => NodeKind::Property,
            NodeData::SpreadElement { .. } => NodeKind::SpreadElement,
            NodeData::UnaryExpression { .. } => NodeKind::UnaryExpression,
            NodeData::UpdateExpression { .. } => NodeKind::UpdateExpression,
            NodeData::BinaryExpression { .. } => NodeKind::BinaryExpression,
            NodeData::LogicalExpression { .. } => NodeKind::LogicalExpression,
            NodeData::AssignmentExpression { .. } => NodeKind::AssignmentExpression,
            NodeData::ConditionalExpression { .. } => NodeKind::ConditionalExpression,
            NodeData::CallExpression { .. } => NodeKind::CallExpression,
            NodeData::NewExpression { .. } => NodeKind::NewExpression,
            NodeData::MemberExpression { .. } => NodeKind::MemberExpression,
            NodeData::SequenceExpression { .. } => NodeKind::SequenceExpression,
            NodeData::AwaitExpression { .. } => NodeKind::AwaitExpression,
            NodeData::YieldExpression { .. } => NodeKind::YieldExpression,
            NodeData::ObjectPattern { .. } => NodeKind::ObjectPattern,
            NodeData::ArrayPattern { .. } => NodeKind::ArrayPattern,
            NodeData::RestElement { .. } => NodeKind::RestElement,
            NodeData::AssignmentPattern { .. } => NodeKind::AssignmentPattern,
            NodeData::JsxElement { .. } => NodeKind::JsxElement,
            NodeData::TsEnumDeclaration { .. } => NodeKind::TsEnumDeclaration,
            NodeData::TsModuleDeclaration { .. } => NodeKind::TsModuleDeclaration,
            NodeData::TsImportEqualsDeclaration { .. } => NodeKind::TsImportEqualsDeclaration,
            NodeData::TsTypeAliasDeclaration { .. } => NodeKind::TsTypeAliasDeclaration,
            NodeData::TsInterfaceDeclaration { .. } => NodeKind::TsInterfaceDeclaration,
        }
    }

    /// The identifier name, for `Identifier` nodes.
    pub fn identifier_name(&self) -> Option<&str> {
        match &self.data {
            NodeData::Identifier { name } => Some(name),
            _ => None,
        }
    }
}

pub struct SyntaxTree {
    arena: Arena<Node>,
    root: Option<NodeId>,
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    pub fn alloc(&mut self, start: usize, end: usize, data: NodeData) -> NodeId {
        self.arena.alloc_with_id(|id| Node {
            id,
            start,
            end,
            data,
        })
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.arena[id]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.arena[id].kind()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    pub fn identifier_name(&self, id: NodeId) -> Option<&str> {
        self.arena[id].identifier_name()
    }

    /// Structural children of `id`, in syntactic order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_children(id, &mut out);
        out
    }

    fn collect_children(&self, id: NodeId, out: &mut Vec<NodeId>) {
        fn push(out: &mut Vec<NodeId>, id: NodeId) {
            out.push(id);
        }
        fn push_opt(out: &mut Vec<NodeId>, id: &Option<NodeId>) {
            if let Some(id) = id {
                out.push(*id);
            }
        }
        fn push_all(out: &mut Vec<NodeId>, ids: &[NodeId]) {
            out.extend_from_slice(ids);
        }
        fn push_sparse(out: &mut Vec<NodeId>, ids: &[Option<NodeId>]) {
            out.extend(ids.iter().flatten().copied());
        }

        match &self.arena[id].data {
            NodeData::Program { body } => push_all(out, body),
            NodeData::VariableDeclaration { declarations, .. } => push_all(out, declarations),
            NodeData::VariableDeclarator { id, init } => {
                push(out, *id);
                push_opt(out, init);
            }
            NodeData::FunctionDeclaration { id, params, body }
            | NodeData::FunctionExpression { id, params, body } => {
                push_opt(out, id);
                push_all(out, params);
                push_opt(out, body);
            }
            NodeData::ArrowFunctionExpression { params, body } => {
                push_all(out, params);
                push(out, *body);
            }
            NodeData::ClassDeclaration {
                id,
                super_class,
                body,
            }
            | NodeData::ClassExpression {
                id,
                super_class,
                body,
            } => {
                push_opt(out, id);
                push_opt(out, super_class);
                push(out, *body);
            }
            NodeData::ClassBody { body } => push_all(out, body),
            NodeData::MethodDefinition { key, value, .. } => {
                push(out, *key);
                push(out, *value);
            }
            NodeData::PropertyDefinition { key, value, .. } => {
                push(out, *key);
                push_opt(out, value);
            }
            NodeData::StaticBlock { body } => push_all(out, body),
            NodeData::BlockStatement { body } => push_all(out, body),
            NodeData::ExpressionStatement { expression } => push(out, *expression),
            NodeData::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                push(out, *test);
                push(out, *consequent);
                push_opt(out, alternate);
            }
            NodeData::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                push_opt(out, init);
                push_opt(out, test);
                push_opt(out, update);
                push(out, *body);
            }
            NodeData::ForInStatement { left, right, body }
            | NodeData::ForOfStatement { left, right, body } => {
                push(out, *left);
                push(out, *right);
                push(out, *body);
            }
            NodeData::WhileStatement { test, body } => {
                push(out, *test);
                push(out, *body);
            }
            NodeData::DoWhileStatement { body, test } => {
                push(out, *body);
                push(out, *test);
            }
            NodeData::SwitchStatement {
                discriminant,
                cases,
            } => {
                push(out, *discriminant);
                push_all(out, cases);
            }
            NodeData::SwitchCase { test, consequent } => {
                push_opt(out, test);
                push_all(out, consequent);
            }
            NodeData::ReturnStatement { argument } => push_opt(out, argument),
            NodeData::ThrowStatement { argument } => push(out, *argument),
            NodeData::TryStatement {
                block,
                handler,
                finalizer,
            } => {
                push(out, *block);
                push_opt(out, handler);
                push_opt(out, finalizer);
            }
            NodeData::CatchClause { param, body } => {
                push_opt(out, param);
                push(out, *body);
            }
            NodeData::LabeledStatement { label, body } => {
                push(out, *label);
                push(out, *body);
            }
            NodeData::BreakStatement { label } | NodeData::ContinueStatement { label } => {
                push_opt(out, label)
            }
            NodeData::EmptyStatement | NodeData::DebuggerStatement => {}
            NodeData::WithStatement { object, body } => {
                push(out, *object);
                push(out, *body);
            }
            NodeData::ImportDeclaration {
                specifiers, source, ..
            } => {
                push_all(out, specifiers);
                push(out, *source);
            }
            NodeData::ImportSpecifier { local, .. }
            | NodeData::ImportDefaultSpecifier { local }
            | NodeData::ImportNamespaceSpecifier { local } => push(out, *local),
            NodeData::ExportNamedDeclaration {
                declaration,
                specifiers,
                source,
            } => {
                push_opt(out, declaration);
                push_all(out, specifiers);
                push_opt(out, source);
            }
            NodeData::ExportDefaultDeclaration { declaration } => push(out, *declaration),
            NodeData::ExportAllDeclaration { source } => push(out, *source),
            NodeData::ExportSpecifier { local } => push(out, *local),
            NodeData::Identifier { .. }
            | NodeData::PrivateIdentifier { .. }
            | NodeData::Literal { .. }
            | NodeData::ThisExpression
            | NodeData::Super
            | NodeData::MetaProperty { .. } => {}
            NodeData::TemplateLiteral { expressions, .. } => push_all(out, expressions),
            NodeData::TaggedTemplateExpression { tag, quasi } => {
                push(out, *tag);
                push(out, *quasi);
            }
            NodeData::ArrayExpression { elements } => push_sparse(out, elements),
            NodeData::ObjectExpression { properties } => push_all(out, properties),
            NodeData::Property { key, value, .. } => {
                push(out, *key);
                push(out, *value);
            }
            NodeData::SpreadElement { argument } => push(out, *argument),
            NodeData::UnaryExpression { argument, .. }
            | NodeData::UpdateExpression { argument, .. }
            | NodeData::AwaitExpression { argument } => push(out, *argument),
            NodeData::BinaryExpression { left, right, .. }
            | NodeData::LogicalExpression { left, right, .. }
            | NodeData::AssignmentExpression { left, right, .. } => {
                push(out, *left);
                push(out, *right);
            }
            NodeData::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                push(out, *test);
                push(out, *consequent);
                push(out, *alternate);
            }
            NodeData::CallExpression { callee, arguments }
            | NodeData::NewExpression { callee, arguments } => {
                push(out, *callee);
                push_all(out, arguments);
            }
            NodeData::MemberExpression {
                object, property, ..
            } => {
                push(out, *object);
                push(out, *property);
            }
            NodeData::SequenceExpression { expressions } => push_all(out, expressions),
            NodeData::YieldExpression { argument, .. } => push_opt(out, argument),
            NodeData::ObjectPattern { properties } => push_all(out, properties),
            NodeData::ArrayPattern { elements } => push_sparse(out, elements),
            NodeData::RestElement { argument } => push(out, *argument),
            NodeData::AssignmentPattern { left, right } => {
                push(out, *left);
                push(out, *right);
            }
            NodeData::JsxElement { parts } => push_all(out, parts),
            NodeData::TsEnumDeclaration { id, .. } => push(out, *id),
            NodeData::TsModuleDeclaration { id, .. } => push_opt(out, id),
            NodeData::TsImportEqualsDeclaration { id, .. } => push(out, *id),
            NodeData::TsTypeAliasDeclaration { id } => push(out, *id),
            NodeData::TsInterfaceDeclaration { id } => push(out, *id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(tree: &mut SyntaxTree, start: usize, name: &str) -> NodeId {
        tree.alloc(
            start,
            start + name.len(),
            NodeData::Identifier {
                name: name.to_string(),
            },
        )
    }

    #[test]
    fn kind_matches_data() {
        let mut tree = SyntaxTree::new();
        let id = ident(&mut tree, 0, "x");

        assert_eq!(tree.kind(id), NodeKind::Identifier);
        assert_eq!(tree.get(id).identifier_name(), Some("x"));
        assert_eq!(tree.kind(id).as_str(), "Identifier");
    }

    #[test]
    fn children_follow_syntactic_order() {
        let mut tree = SyntaxTree::new();
        let id = ident(&mut tree, 6, "x");
        let init = tree.alloc(
            10,
            11,
            NodeData::Literal {
                value: LiteralValue::Number(1.0),
            },
        );
        let declarator = tree.alloc(
            6,
            11,
            NodeData::VariableDeclarator {
                id,
                init: Some(init),
            },
        );
        let decl = tree.alloc(
            0,
            12,
            NodeData::VariableDeclaration {
                kind: VarKind::Const,
                declarations: vec![declarator],
            },
        );

        assert_eq!(tree.children(decl), vec![declarator]);
        assert_eq!(tree.children(declarator), vec![id, init]);
        assert!(tree.children(id).is_empty());
    }

    #[test]
    fn sparse_array_elements_skip_holes() {
        let mut tree = SyntaxTree::new();
        let a = ident(&mut tree, 1, "a");
        let b = ident(&mut tree, 6, "b");
        let arr = tree.alloc(
            0,
            8,
            NodeData::ArrayExpression {
                elements: vec![Some(a), None, Some(b)],
            },
        );

        assert_eq!(tree.children(arr), vec![a, b]);
    }

    #[test]
    fn root_is_tracked() {
        let mut tree = SyntaxTree::new();
        assert!(tree.root().is_none());

        let program = tree.alloc(0, 0, NodeData::Program { body: Vec::new() });
        tree.set_root(program);

        assert_eq!(tree.root(), Some(program));
        assert_eq!(tree.kind(program), NodeKind::Program);
    }

    #[test]
    fn function_like_kinds() {
        assert!(NodeKind::FunctionDeclaration.is_function_like());
        assert!(NodeKind::FunctionExpression.is_function_like());
        assert!(NodeKind::ArrowFunctionExpression.is_function_like());
        assert!(!NodeKind::ClassDeclaration.is_function_like());
        assert!(!NodeKind::BlockStatement.is_function_like());
    }
}

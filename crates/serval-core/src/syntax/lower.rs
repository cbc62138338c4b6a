//! Lowering from the SWC AST into the serval syntax tree
//!
//! SWC spans are absolute positions inside a `SourceMap`; lowering rebases
//! them against the file's start position so every [`Node`] carries plain
//! 0-based byte offsets into the source text. Parenthesized expressions and
//! TypeScript assertion wrappers are unwrapped (the tree does not encode
//! them; rules that care slice the source text). Type annotations are not
//! lowered at all, which keeps TypeScript type-only positions out of the
//! reference tracker by construction.

use swc_common::{BytePos, Span, Spanned};
use swc_ecma_ast as ast;

use super::{LiteralValue, NodeData, NodeId, SyntaxTree, VarKind};

pub fn lower_module(module: &ast::Module, base: BytePos) -> SyntaxTree {
    let mut lower = Lower {
        tree: SyntaxTree::new(),
        base,
    };

    let mut body = Vec::with_capacity(module.body.len());
    for item in &module.body {
        if let Some(id) = lower.module_item(item) {
            body.push(id);
        }
    }

    let (start, end) = lower.range(module.span);
    let root = lower.tree.alloc(start, end, NodeData::Program { body });
    lower.tree.set_root(root);
    lower.tree
}

struct Lower {
    tree: SyntaxTree,
    base: BytePos,
}

impl Lower {
    fn range(&self, span: Span) -> (usize, usize) {
        (
            span.lo.0.saturating_sub(self.base.0) as usize,
            span.hi.0.saturating_sub(self.base.0) as usize,
        )
    }

    fn alloc(&mut self, span: Span, data: NodeData) -> NodeId {
        let (start, end) = self.range(span);
        self.tree.alloc(start, end, data)
    }

    fn ident(&mut self, ident: &ast::Ident) -> NodeId {
        self.alloc(
            ident.span,
            NodeData::Identifier {
                name: ident.sym.to_string(),
            },
        )
    }

    fn ident_name(&mut self, ident: &ast::IdentName) -> NodeId {
        self.alloc(
            ident.span,
            NodeData::Identifier {
                name: ident.sym.to_string(),
            },
        )
    }

    fn private_name(&mut self, name: &ast::PrivateName) -> NodeId {
        self.alloc(
            name.span,
            NodeData::PrivateIdentifier {
                name: name.name.to_string(),
            },
        )
    }

    fn str_lit(&mut self, s: &ast::Str) -> NodeId {
        self.alloc(
            s.span,
            NodeData::Literal {
                value: LiteralValue::String(s.value.to_string()),
            },
        )
    }

    // ---- module items ----------------------------------------------------

    fn module_item(&mut self, item: &ast::ModuleItem) -> Option<NodeId> {
        match item {
            ast::ModuleItem::ModuleDecl(decl) => self.module_decl(decl),
            ast::ModuleItem::Stmt(stmt) => Some(self.stmt(stmt)),
        }
    }

    fn module_decl(&mut self, decl: &ast::ModuleDecl) -> Option<NodeId> {
        match decl {
            ast::ModuleDecl::Import(import) => Some(self.import_decl(import)),
            ast::ModuleDecl::ExportDecl(export) => {
                let declaration = self.decl(&export.decl);
                Some(self.alloc(
                    export.span,
                    NodeData::ExportNamedDeclaration {
                        declaration: Some(declaration),
                        specifiers: Vec::new(),
                        source: None,
                    },
                ))
            }
            ast::ModuleDecl::ExportNamed(named) => {
                let mut specifiers = Vec::new();
                for spec in &named.specifiers {
                    if let ast::ExportSpecifier::Named(spec) = spec {
                        if let ast::ModuleExportName::Ident(orig) = &spec.orig {
                            let local = self.ident(orig);
                            specifiers
                                .push(self.alloc(spec.span, NodeData::ExportSpecifier { local }));
                        }
                    }
                }
                let source = named.src.as_ref().map(|src| self.str_lit(src));
                Some(self.alloc(
                    named.span,
                    NodeData::ExportNamedDeclaration {
                        declaration: None,
                        specifiers,
                        source,
                    },
                ))
            }
            ast::ModuleDecl::ExportDefaultDecl(export) => {
                let declaration = match &export.decl {
                    ast::DefaultDecl::Fn(fn_expr) => {
                        let id = fn_expr.ident.as_ref().map(|i| self.ident(i));
                        self.function(fn_expr.function.span, id, &fn_expr.function, true)
                    }
                    ast::DefaultDecl::Class(class_expr) => {
                        let id = class_expr.ident.as_ref().map(|i| self.ident(i));
                        self.class(class_expr.class.span, id, &class_expr.class, true)
                    }
                    ast::DefaultDecl::TsInterfaceDecl(interface) => {
                        let id = self.ident(&interface.id);
                        self.alloc(interface.span, NodeData::TsInterfaceDeclaration { id })
                    }
                };
                Some(self.alloc(
                    export.span,
                    NodeData::ExportDefaultDeclaration { declaration },
                ))
            }
            ast::ModuleDecl::ExportDefaultExpr(export) => {
                let declaration = self.expr(&export.expr);
                Some(self.alloc(
                    export.span,
                    NodeData::ExportDefaultDeclaration { declaration },
                ))
            }
            ast::ModuleDecl::ExportAll(export) => {
                let source = self.str_lit(&export.src);
                Some(self.alloc(export.span, NodeData::ExportAllDeclaration { source }))
            }
            ast::ModuleDecl::TsImportEquals(import) => {
                let id = self.ident(&import.id);
                Some(self.alloc(
                    import.span,
                    NodeData::TsImportEqualsDeclaration {
                        id,
                        type_only: import.is_type_only,
                    },
                ))
            }
            ast::ModuleDecl::TsExportAssignment(_) | ast::ModuleDecl::TsNamespaceExport(_) => None,
        }
    }

    fn import_decl(&mut self, import: &ast::ImportDecl) -> NodeId {
        let mut specifiers = Vec::with_capacity(import.specifiers.len());
        for spec in &import.specifiers {
            let id = match spec {
                ast::ImportSpecifier::Named(named) => {
                    let local = self.ident(&named.local);
                    self.alloc(
                        named.span,
                        NodeData::ImportSpecifier {
                            local,
                            type_only: named.is_type_only,
                        },
                    )
                }
                ast::ImportSpecifier::Default(default) => {
                    let local = self.ident(&default.local);
                    self.alloc(default.span, NodeData::ImportDefaultSpecifier { local })
                }
                ast::ImportSpecifier::Namespace(ns) => {
                    let local = self.ident(&ns.local);
                    self.alloc(ns.span, NodeData::ImportNamespaceSpecifier { local })
                }
            };
            specifiers.push(id);
        }
        let source = self.str_lit(&import.src);
        self.alloc(
            import.span,
            NodeData::ImportDeclaration {
                specifiers,
                source,
                type_only: import.type_only,
            },
        )
    }

    // ---- declarations ----------------------------------------------------

    fn decl(&mut self, decl: &ast::Decl) -> NodeId {
        match decl {
            ast::Decl::Var(var) => self.var_decl(var),
            ast::Decl::Fn(fn_decl) => {
                let id = self.ident(&fn_decl.ident);
                self.function(fn_decl.function.span, Some(id), &fn_decl.function, true)
            }
            ast::Decl::Class(class_decl) => {
                let id = self.ident(&class_decl.ident);
                self.class(class_decl.class.span, Some(id), &class_decl.class, true)
            }
            ast::Decl::Using(using) => {
                let mut declarations = Vec::with_capacity(using.decls.len());
                for declarator in &using.decls {
                    declarations.push(self.var_declarator(declarator));
                }
                self.alloc(
                    using.span,
                    NodeData::VariableDeclaration {
                        kind: VarKind::Const,
                        declarations,
                    },
                )
            }
            ast::Decl::TsInterface(interface) => {
                let id = self.ident(&interface.id);
                self.alloc(interface.span, NodeData::TsInterfaceDeclaration { id })
            }
            ast::Decl::TsTypeAlias(alias) => {
                let id = self.ident(&alias.id);
                self.alloc(alias.span, NodeData::TsTypeAliasDeclaration { id })
            }
            ast::Decl::TsEnum(ts_enum) => {
                let id = self.ident(&ts_enum.id);
                self.alloc(
                    ts_enum.span,
                    NodeData::TsEnumDeclaration {
                        id,
                        declare: ts_enum.declare,
                    },
                )
            }
            ast::Decl::TsModule(module) => {
                let id = match &module.id {
                    ast::TsModuleName::Ident(ident) => Some(self.ident(ident)),
                    ast::TsModuleName::Str(_) => None,
                };
                self.alloc(
                    module.span,
                    NodeData::TsModuleDeclaration {
                        id,
                        declare: module.declare,
                    },
                )
            }
        }
    }

    fn var_decl(&mut self, var: &ast::VarDecl) -> NodeId {
        let kind = match var.kind {
            ast::VarDeclKind::Var => VarKind::Var,
            ast::VarDeclKind::Let => VarKind::Let,
            ast::VarDeclKind::Const => VarKind::Const,
        };
        let mut declarations = Vec::with_capacity(var.decls.len());
        for declarator in &var.decls {
            declarations.push(self.var_declarator(declarator));
        }
        self.alloc(
            var.span,
            NodeData::VariableDeclaration { kind, declarations },
        )
    }

    fn var_declarator(&mut self, declarator: &ast::VarDeclarator) -> NodeId {
        let id = self.pat(&declarator.name);
        let init = declarator.init.as_ref().map(|init| self.expr(init));
        self.alloc(declarator.span, NodeData::VariableDeclarator { id, init })
    }

    fn function(
        &mut self,
        span: Span,
        id: Option<NodeId>,
        function: &ast::Function,
        is_declaration: bool,
    ) -> NodeId {
        let mut params = Vec::with_capacity(function.params.len());
        for param in &function.params {
            params.push(self.pat(&param.pat));
        }
        let body = function.body.as_ref().map(|body| self.block(body));
        let data = if is_declaration {
            NodeData::FunctionDeclaration { id, params, body }
        } else {
            NodeData::FunctionExpression { id, params, body }
        };
        self.alloc(span, data)
    }

    fn class(
        &mut self,
        span: Span,
        id: Option<NodeId>,
        class: &ast::Class,
        is_declaration: bool,
    ) -> NodeId {
        let super_class = class.super_class.as_ref().map(|s| self.expr(s));
        let mut members = Vec::new();
        for member in &class.body {
            if let Some(id) = self.class_member(member) {
                members.push(id);
            }
        }
        let body = self.alloc(span, NodeData::ClassBody { body: members });
        let data = if is_declaration {
            NodeData::ClassDeclaration {
                id,
                super_class,
                body,
            }
        } else {
            NodeData::ClassExpression {
                id,
                super_class,
                body,
            }
        };
        self.alloc(span, data)
    }

    fn class_member(&mut self, member: &ast::ClassMember) -> Option<NodeId> {
        match member {
            ast::ClassMember::Constructor(ctor) => {
                let key = self.prop_name(&ctor.key);
                let mut params = Vec::with_capacity(ctor.params.len());
                for param in &ctor.params {
                    match param {
                        ast::ParamOrTsParamProp::Param(p) => params.push(self.pat(&p.pat)),
                        ast::ParamOrTsParamProp::TsParamProp(ts_param) => match &ts_param.param {
                            ast::TsParamPropParam::Ident(binding) => {
                                params.push(self.binding_ident(binding));
                            }
                            ast::TsParamPropParam::Assign(assign) => {
                                params.push(self.assign_pat(assign));
                            }
                        },
                    }
                }
                let body = ctor.body.as_ref().map(|b| self.block(b));
                let value = self.alloc(
                    ctor.span,
                    NodeData::FunctionExpression {
                        id: None,
                        params,
                        body,
                    },
                );
                Some(self.alloc(
                    ctor.span,
                    NodeData::MethodDefinition {
                        key,
                        value,
                        computed: false,
                        is_static: false,
                    },
                ))
            }
            ast::ClassMember::Method(method) => {
                let computed = matches!(method.key, ast::PropName::Computed(_));
                let key = self.prop_name(&method.key);
                let value = self.function(method.function.span, None, &method.function, false);
                Some(self.alloc(
                    method.span,
                    NodeData::MethodDefinition {
                        key,
                        value,
                        computed,
                        is_static: method.is_static,
                    },
                ))
            }
            ast::ClassMember::PrivateMethod(method) => {
                let key = self.private_name(&method.key);
                let value = self.function(method.function.span, None, &method.function, false);
                Some(self.alloc(
                    method.span,
                    NodeData::MethodDefinition {
                        key,
                        value,
                        computed: false,
                        is_static: method.is_static,
                    },
                ))
            }
            ast::ClassMember::ClassProp(prop) => {
                let computed = matches!(prop.key, ast::PropName::Computed(_));
                let key = self.prop_name(&prop.key);
                let value = prop.value.as_ref().map(|v| self.expr(v));
                Some(self.alloc(
                    prop.span,
                    NodeData::PropertyDefinition {
                        key,
                        value,
                        computed,
                        is_static: prop.is_static,
                    },
                ))
            }
            ast::ClassMember::PrivateProp(prop) => {
                let key = self.private_name(&prop.key);
                let value = prop.value.as_ref().map(|v| self.expr(v));
                Some(self.alloc(
                    prop.span,
                    NodeData::PropertyDefinition {
                        key,
                        value,
                        computed: false,
                        is_static: prop.is_static,
                    },
                ))
            }
            ast::ClassMember::StaticBlock(block) => {
                let mut body = Vec::with_capacity(block.body.stmts.len());
                for stmt in &block.body.stmts {
                    body.push(self.stmt(stmt));
                }
                Some(self.alloc(block.span, NodeData::StaticBlock { body }))
            }
            ast::ClassMember::TsIndexSignature(_)
            | ast::ClassMember::AutoAccessor(_)
            | ast::ClassMember::Empty(_) => None,
        }
    }

    // ---- statements ------------------------------------------------------

    fn block(&mut self, block: &ast::BlockStmt) -> NodeId {
        let mut body = Vec::with_capacity(block.stmts.len());
        for stmt in &block.stmts {
            body.push(self.stmt(stmt));
        }
        self.alloc(block.span, NodeData::BlockStatement { body })
    }

    fn stmt(&mut self, stmt: &ast::Stmt) -> NodeId {
        match stmt {
            ast::Stmt::Block(block) => self.block(block),
            ast::Stmt::Empty(empty) => self.alloc(empty.span, NodeData::EmptyStatement),
            ast::Stmt::Debugger(debugger) => self.alloc(debugger.span, NodeData::DebuggerStatement),
            ast::Stmt::With(with) => {
                let object = self.expr(&with.obj);
                let body = self.stmt(&with.body);
                self.alloc(with.span, NodeData::WithStatement { object, body })
            }
            ast::Stmt::Return(ret) => {
                let argument = ret.arg.as_ref().map(|arg| self.expr(arg));
                self.alloc(ret.span, NodeData::ReturnStatement { argument })
            }
            ast::Stmt::Labeled(labeled) => {
                let label = self.ident(&labeled.label);
                let body = self.stmt(&labeled.body);
                self.alloc(labeled.span, NodeData::LabeledStatement { label, body })
            }
            ast::Stmt::Break(brk) => {
                let label = brk.label.as_ref().map(|l| self.ident(l));
                self.alloc(brk.span, NodeData::BreakStatement { label })
            }
            ast::Stmt::Continue(cont) => {
                let label = cont.label.as_ref().map(|l| self.ident(l));
                self.alloc(cont.span, NodeData::ContinueStatement { label })
            }
            ast::Stmt::If(if_stmt) => {
                let test = self.expr(&if_stmt.test);
                let consequent = self.stmt(&if_stmt.cons);
                let alternate = if_stmt.alt.as_ref().map(|alt| self.stmt(alt));
                self.alloc(
                    if_stmt.span,
                    NodeData::IfStatement {
                        test,
                        consequent,
                        alternate,
                    },
                )
            }
            ast::Stmt::Switch(switch) => {
                let discriminant = self.expr(&switch.discriminant);
                let mut cases = Vec::with_capacity(switch.cases.len());
                for case in &switch.cases {
                    let test = case.test.as_ref().map(|t| self.expr(t));
                    let mut consequent = Vec::with_capacity(case.cons.len());
                    for stmt in &case.cons {
                        consequent.push(self.stmt(stmt));
                    }
                    cases.push(self.alloc(case.span, NodeData::SwitchCase { test, consequent }));
                }
                self.alloc(
                    switch.span,
                    NodeData::SwitchStatement {
                        discriminant,
                        cases,
                    },
                )
            }
            ast::Stmt::Throw(throw) => {
                let argument = self.expr(&throw.arg);
                self.alloc(throw.span, NodeData::ThrowStatement { argument })
            }
            ast::Stmt::Try(try_stmt) => {
                let block = self.block(&try_stmt.block);
                let handler = try_stmt.handler.as_ref().map(|catch| {
                    let param = catch.param.as_ref().map(|p| self.pat(p));
                    let body = self.block(&catch.body);
                    self.alloc(catch.span, NodeData::CatchClause { param, body })
                });
                let finalizer = try_stmt.finalizer.as_ref().map(|f| self.block(f));
                self.alloc(
                    try_stmt.span,
                    NodeData::TryStatement {
                        block,
                        handler,
                        finalizer,
                    },
                )
            }
            ast::Stmt::While(while_stmt) => {
                let test = self.expr(&while_stmt.test);
                let body = self.stmt(&while_stmt.body);
                self.alloc(while_stmt.span, NodeData::WhileStatement { test, body })
            }
            ast::Stmt::DoWhile(do_while) => {
                let body = self.stmt(&do_while.body);
                let test = self.expr(&do_while.test);
                self.alloc(do_while.span, NodeData::DoWhileStatement { body, test })
            }
            ast::Stmt::For(for_stmt) => {
                let init = for_stmt.init.as_ref().map(|init| match init {
                    ast::VarDeclOrExpr::VarDecl(var) => self.var_decl(var),
                    ast::VarDeclOrExpr::Expr(expr) => self.expr(expr),
                });
                let test = for_stmt.test.as_ref().map(|t| self.expr(t));
                let update = for_stmt.update.as_ref().map(|u| self.expr(u));
                let body = self.stmt(&for_stmt.body);
                self.alloc(
                    for_stmt.span,
                    NodeData::ForStatement {
                        init,
                        test,
                        update,
                        body,
                    },
                )
            }
            ast::Stmt::ForIn(for_in) => {
                let left = self.for_head(&for_in.left);
                let right = self.expr(&for_in.right);
                let body = self.stmt(&for_in.body);
                self.alloc(
                    for_in.span,
                    NodeData::ForInStatement { left, right, body },
                )
            }
            ast::Stmt::ForOf(for_of) => {
                let left = self.for_head(&for_of.left);
                let right = self.expr(&for_of.right);
                let body = self.stmt(&for_of.body);
                self.alloc(
                    for_of.span,
                    NodeData::ForOfStatement { left, right, body },
                )
            }
            ast::Stmt::Decl(decl) => self.decl(decl),
            ast::Stmt::Expr(expr_stmt) => {
                let expression = self.expr(&expr_stmt.expr);
                self.alloc(expr_stmt.span, NodeData::ExpressionStatement { expression })
            }
        }
    }

    fn for_head(&mut self, head: &ast::ForHead) -> NodeId {
        match head {
            ast::ForHead::VarDecl(var) => self.var_decl(var),
            ast::ForHead::UsingDecl(using) => {
                let mut declarations = Vec::with_capacity(using.decls.len());
                for declarator in &using.decls {
                    declarations.push(self.var_declarator(declarator));
                }
                self.alloc(
                    using.span,
                    NodeData::VariableDeclaration {
                        kind: VarKind::Const,
                        declarations,
                    },
                )
            }
            ast::ForHead::Pat(pat) => self.pat(pat),
        }
    }

    // ---- patterns --------------------------------------------------------

    fn binding_ident(&mut self, binding: &ast::BindingIdent) -> NodeId {
        self.ident(&binding.id)
    }

    fn assign_pat(&mut self, assign: &ast::AssignPat) -> NodeId {
        let left = self.pat(&assign.left);
        let right = self.expr(&assign.right);
        self.alloc(assign.span, NodeData::AssignmentPattern { left, right })
    }

    fn pat(&mut self, pat: &ast::Pat) -> NodeId {
        match pat {
            ast::Pat::Ident(binding) => self.binding_ident(binding),
            ast::Pat::Array(array) => {
                let mut elements = Vec::with_capacity(array.elems.len());
                for elem in &array.elems {
                    elements.push(elem.as_ref().map(|p| self.pat(p)));
                }
                self.alloc(array.span, NodeData::ArrayPattern { elements })
            }
            ast::Pat::Rest(rest) => {
                let argument = self.pat(&rest.arg);
                self.alloc(rest.span, NodeData::RestElement { argument })
            }
            ast::Pat::Object(object) => {
                let mut properties = Vec::with_capacity(object.props.len());
                for prop in &object.props {
                    properties.push(self.object_pat_prop(prop));
                }
                self.alloc(object.span, NodeData::ObjectPattern { properties })
            }
            ast::Pat::Assign(assign) => self.assign_pat(assign),
            ast::Pat::Expr(expr) => self.expr(expr),
            ast::Pat::Invalid(invalid) => self.alloc(
                invalid.span,
                NodeData::Literal {
                    value: LiteralValue::Null,
                },
            ),
        }
    }

    fn object_pat_prop(&mut self, prop: &ast::ObjectPatProp) -> NodeId {
        match prop {
            ast::ObjectPatProp::KeyValue(kv) => {
                let computed = matches!(kv.key, ast::PropName::Computed(_));
                let key = self.prop_name(&kv.key);
                let value = self.pat(&kv.value);
                let span = Span::new(kv.key.span().lo, kv.value.span().hi);
                self.alloc(
                    span,
                    NodeData::Property {
                        key,
                        value,
                        computed,
                        shorthand: false,
                    },
                )
            }
            ast::ObjectPatProp::Assign(assign) => {
                let key = self.ident(&assign.key.id);
                let value = match &assign.value {
                    Some(default) => {
                        let left = self.ident(&assign.key.id);
                        let right = self.expr(default);
                        self.alloc(assign.span, NodeData::AssignmentPattern { left, right })
                    }
                    None => self.ident(&assign.key.id),
                };
                self.alloc(
                    assign.span,
                    NodeData::Property {
                        key,
                        value,
                        computed: false,
                        shorthand: true,
                    },
                )
            }
            ast::ObjectPatProp::Rest(rest) => {
                let argument = self.pat(&rest.arg);
                self.alloc(rest.span, NodeData::RestElement { argument })
            }
        }
    }

    // ---- expressions -----------------------------------------------------

    fn prop_name(&mut self, name: &ast::PropName) -> NodeId {
        match name {
            ast::PropName::Ident(ident) => self.ident_name(ident),
            ast::PropName::Str(s) => self.str_lit(s),
            ast::PropName::Num(num) => self.alloc(
                num.span,
                NodeData::Literal {
                    value: LiteralValue::Number(num.value),
                },
            ),
            ast::PropName::BigInt(bigint) => self.alloc(
                bigint.span,
                NodeData::Literal {
                    value: LiteralValue::BigInt(bigint.value.to_string()),
                },
            ),
            ast::PropName::Computed(computed) => self.expr(&computed.expr),
        }
    }

    fn lit(&mut self, lit: &ast::Lit) -> NodeId {
        let (span, value) = match lit {
            ast::Lit::Str(s) => (s.span, LiteralValue::String(s.value.to_string())),
            ast::Lit::Bool(b) => (b.span, LiteralValue::Boolean(b.value)),
            ast::Lit::Null(n) => (n.span, LiteralValue::Null),
            ast::Lit::Num(n) => (n.span, LiteralValue::Number(n.value)),
            ast::Lit::BigInt(b) => (b.span, LiteralValue::BigInt(b.value.to_string())),
            ast::Lit::Regex(r) => (
                r.span,
                LiteralValue::Regex {
                    pattern: r.exp.to_string(),
                    flags: r.flags.to_string(),
                },
            ),
            ast::Lit::JSXText(text) => (text.span, LiteralValue::String(text.value.to_string())),
        };
        self.alloc(span, NodeData::Literal { value })
    }

    fn args(&mut self, args: &[ast::ExprOrSpread]) -> Vec<NodeId> {
        args.iter().map(|arg| self.expr_or_spread(arg)).collect()
    }

    fn expr_or_spread(&mut self, arg: &ast::ExprOrSpread) -> NodeId {
        let expr = self.expr(&arg.expr);
        match arg.spread {
            Some(spread) => {
                let span = Span::new(spread.lo, arg.expr.span().hi);
                self.alloc(span, NodeData::SpreadElement { argument: expr })
            }
            None => expr,
        }
    }

    fn expr(&mut self, expr: &ast::Expr) -> NodeId {
        match expr {
            ast::Expr::This(this) => self.alloc(this.span, NodeData::ThisExpression),
            ast::Expr::Array(array) => {
                let mut elements = Vec::with_capacity(array.elems.len());
                for elem in &array.elems {
                    elements.push(elem.as_ref().map(|e| self.expr_or_spread(e)));
                }
                self.alloc(array.span, NodeData::ArrayExpression { elements })
            }
            ast::Expr::Object(object) => {
                let mut properties = Vec::with_capacity(object.props.len());
                for prop in &object.props {
                    properties.push(self.prop_or_spread(prop));
                }
                self.alloc(object.span, NodeData::ObjectExpression { properties })
            }
            ast::Expr::Fn(fn_expr) => {
                let id = fn_expr.ident.as_ref().map(|i| self.ident(i));
                self.function(fn_expr.function.span, id, &fn_expr.function, false)
            }
            ast::Expr::Unary(unary) => {
                let argument = self.expr(&unary.arg);
                self.alloc(
                    unary.span,
                    NodeData::UnaryExpression {
                        operator: unary_op_str(unary.op).to_string(),
                        argument,
                    },
                )
            }
            ast::Expr::Update(update) => {
                let argument = self.expr(&update.arg);
                self.alloc(
                    update.span,
                    NodeData::UpdateExpression {
                        operator: match update.op {
                            ast::UpdateOp::PlusPlus => "++".to_string(),
                            ast::UpdateOp::MinusMinus => "--".to_string(),
                        },
                        argument,
                        prefix: update.prefix,
                    },
                )
            }
            ast::Expr::Bin(bin) => {
                let left = self.expr(&bin.left);
                let right = self.expr(&bin.right);
                let operator = binary_op_str(bin.op).to_string();
                let data = if is_logical_op(bin.op) {
                    NodeData::LogicalExpression {
                        operator,
                        left,
                        right,
                    }
                } else {
                    NodeData::BinaryExpression {
                        operator,
                        left,
                        right,
                    }
                };
                self.alloc(bin.span, data)
            }
            ast::Expr::Assign(assign) => {
                let left = self.assign_target(&assign.left);
                let right = self.expr(&assign.right);
                self.alloc(
                    assign.span,
                    NodeData::AssignmentExpression {
                        operator: assign_op_str(assign.op).to_string(),
                        left,
                        right,
                    },
                )
            }
            ast::Expr::Member(member) => self.member(member, false),
            ast::Expr::SuperProp(super_prop) => {
                let object = self.alloc(super_prop.obj.span, NodeData::Super);
                let (property, computed) = match &super_prop.prop {
                    ast::SuperProp::Ident(ident) => (self.ident_name(ident), false),
                    ast::SuperProp::Computed(computed) => (self.expr(&computed.expr), true),
                };
                self.alloc(
                    super_prop.span,
                    NodeData::MemberExpression {
                        object,
                        property,
                        computed,
                        optional: false,
                    },
                )
            }
            ast::Expr::Cond(cond) => {
                let test = self.expr(&cond.test);
                let consequent = self.expr(&cond.cons);
                let alternate = self.expr(&cond.alt);
                self.alloc(
                    cond.span,
                    NodeData::ConditionalExpression {
                        test,
                        consequent,
                        alternate,
                    },
                )
            }
            ast::Expr::Call(call) => {
                let callee = match &call.callee {
                    ast::Callee::Expr(expr) => self.expr(expr),
                    ast::Callee::Super(sup) => self.alloc(sup.span, NodeData::Super),
                    // Dynamic `import(...)`; the callee is not a variable
                    // reference, so it lowers like `import.meta` does.
                    ast::Callee::Import(import) => self.alloc(
                        import.span,
                        NodeData::MetaProperty {
                            meta: "import".to_string(),
                            property: String::new(),
                        },
                    ),
                };
                let arguments = self.args(&call.args);
                self.alloc(call.span, NodeData::CallExpression { callee, arguments })
            }
            ast::Expr::New(new_expr) => {
                let callee = self.expr(&new_expr.callee);
                let arguments = new_expr
                    .args
                    .as_ref()
                    .map(|args| self.args(args))
                    .unwrap_or_default();
                self.alloc(
                    new_expr.span,
                    NodeData::NewExpression { callee, arguments },
                )
            }
            ast::Expr::Seq(seq) => {
                let expressions = seq.exprs.iter().map(|e| self.expr(e)).collect();
                self.alloc(seq.span, NodeData::SequenceExpression { expressions })
            }
            ast::Expr::Ident(ident) => self.ident(ident),
            ast::Expr::Lit(lit) => self.lit(lit),
            ast::Expr::Tpl(tpl) => self.tpl(tpl),
            ast::Expr::TaggedTpl(tagged) => {
                let tag = self.expr(&tagged.tag);
                let quasi = self.tpl(&tagged.tpl);
                self.alloc(
                    tagged.span,
                    NodeData::TaggedTemplateExpression { tag, quasi },
                )
            }
            ast::Expr::Arrow(arrow) => {
                let params = arrow.params.iter().map(|p| self.pat(p)).collect();
                let body = match &*arrow.body {
                    ast::BlockStmtOrExpr::BlockStmt(block) => self.block(block),
                    ast::BlockStmtOrExpr::Expr(expr) => self.expr(expr),
                };
                self.alloc(
                    arrow.span,
                    NodeData::ArrowFunctionExpression { params, body },
                )
            }
            ast::Expr::Class(class_expr) => {
                let id = class_expr.ident.as_ref().map(|i| self.ident(i));
                self.class(class_expr.class.span, id, &class_expr.class, false)
            }
            ast::Expr::Yield(yield_expr) => {
                let argument = yield_expr.arg.as_ref().map(|arg| self.expr(arg));
                self.alloc(
                    yield_expr.span,
                    NodeData::YieldExpression {
                        argument,
                        delegate: yield_expr.delegate,
                    },
                )
            }
            ast::Expr::MetaProp(meta) => {
                let (meta_name, property) = match meta.kind {
                    ast::MetaPropKind::NewTarget => ("new", "target"),
                    ast::MetaPropKind::ImportMeta => ("import", "meta"),
                };
                self.alloc(
                    meta.span,
                    NodeData::MetaProperty {
                        meta: meta_name.to_string(),
                        property: property.to_string(),
                    },
                )
            }
            ast::Expr::Await(await_expr) => {
                let argument = self.expr(&await_expr.arg);
                self.alloc(await_expr.span, NodeData::AwaitExpression { argument })
            }
            ast::Expr::Paren(paren) => self.expr(&paren.expr),
            ast::Expr::PrivateName(name) => self.private_name(name),
            ast::Expr::OptChain(opt_chain) => match &*opt_chain.base {
                ast::OptChainBase::Member(member) => self.member(member, true),
                ast::OptChainBase::Call(call) => {
                    let callee = self.expr(&call.callee);
                    let arguments = self.args(&call.args);
                    self.alloc(call.span, NodeData::CallExpression { callee, arguments })
                }
            },
            ast::Expr::JSXElement(element) => self.jsx_element(element),
            ast::Expr::JSXFragment(fragment) => {
                let mut parts = Vec::new();
                for child in &fragment.children {
                    self.jsx_child(child, &mut parts);
                }
                self.alloc(fragment.span, NodeData::JsxElement { parts })
            }
            // TypeScript assertion wrappers carry no runtime structure of
            // their own; lower the wrapped expression.
            ast::Expr::TsTypeAssertion(assertion) => self.expr(&assertion.expr),
            ast::Expr::TsConstAssertion(assertion) => self.expr(&assertion.expr),
            ast::Expr::TsNonNull(non_null) => self.expr(&non_null.expr),
            ast::Expr::TsAs(ts_as) => self.expr(&ts_as.expr),
            ast::Expr::TsInstantiation(inst) => self.expr(&inst.expr),
            ast::Expr::TsSatisfies(satisfies) => self.expr(&satisfies.expr),
            _ => self.alloc(
                expr.span(),
                NodeData::Literal {
                    value: LiteralValue::Null,
                },
            ),
        }
    }

    fn member(&mut self, member: &ast::MemberExpr, optional: bool) -> NodeId {
        let object = self.expr(&member.obj);
        let (property, computed) = match &member.prop {
            ast::MemberProp::Ident(ident) => (self.ident_name(ident), false),
            ast::MemberProp::PrivateName(name) => (self.private_name(name), false),
            ast::MemberProp::Computed(computed) => (self.expr(&computed.expr), true),
        };
        self.alloc(
            member.span,
            NodeData::MemberExpression {
                object,
                property,
                computed,
                optional,
            },
        )
    }

    fn tpl(&mut self, tpl: &ast::Tpl) -> NodeId {
        let quasis = tpl
            .quasis
            .iter()
            .map(|quasi| {
                quasi
                    .cooked
                    .as_ref()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| quasi.raw.to_string())
            })
            .collect();
        let expressions = tpl.exprs.iter().map(|e| self.expr(e)).collect();
        self.alloc(
            tpl.span,
            NodeData::TemplateLiteral {
                quasis,
                expressions,
            },
        )
    }

    fn prop_or_spread(&mut self, prop: &ast::PropOrSpread) -> NodeId {
        match prop {
            ast::PropOrSpread::Spread(spread) => {
                let argument = self.expr(&spread.expr);
                let span = Span::new(spread.dot3_token.lo, spread.expr.span().hi);
                self.alloc(span, NodeData::SpreadElement { argument })
            }
            ast::PropOrSpread::Prop(prop) => match prop.as_ref() {
                ast::Prop::Shorthand(ident) => {
                    let key = self.ident(ident);
                    let value = self.ident(ident);
                    self.alloc(
                        ident.span,
                        NodeData::Property {
                            key,
                            value,
                            computed: false,
                            shorthand: true,
                        },
                    )
                }
                ast::Prop::KeyValue(kv) => {
                    let computed = matches!(kv.key, ast::PropName::Computed(_));
                    let key = self.prop_name(&kv.key);
                    let value = self.expr(&kv.value);
                    let span = Span::new(kv.key.span().lo, kv.value.span().hi);
                    self.alloc(
                        span,
                        NodeData::Property {
                            key,
                            value,
                            computed,
                            shorthand: false,
                        },
                    )
                }
                ast::Prop::Assign(assign) => {
                    let key = self.ident(&assign.key);
                    let left = self.ident(&assign.key);
                    let right = self.expr(&assign.value);
                    let span = Span::new(assign.key.span.lo, assign.value.span().hi);
                    let value = self.alloc(span, NodeData::AssignmentPattern { left, right });
                    self.alloc(
                        span,
                        NodeData::Property {
                            key,
                            value,
                            computed: false,
                            shorthand: true,
                        },
                    )
                }
                ast::Prop::Getter(getter) => {
                    let computed = matches!(getter.key, ast::PropName::Computed(_));
                    let key = self.prop_name(&getter.key);
                    let body = getter.body.as_ref().map(|b| self.block(b));
                    let value = self.alloc(
                        getter.span,
                        NodeData::FunctionExpression {
                            id: None,
                            params: Vec::new(),
                            body,
                        },
                    );
                    self.alloc(
                        getter.span,
                        NodeData::Property {
                            key,
                            value,
                            computed,
                            shorthand: false,
                        },
                    )
                }
                ast::Prop::Setter(setter) => {
                    let computed = matches!(setter.key, ast::PropName::Computed(_));
                    let key = self.prop_name(&setter.key);
                    let param = self.pat(&setter.param);
                    let body = setter.body.as_ref().map(|b| self.block(b));
                    let value = self.alloc(
                        setter.span,
                        NodeData::FunctionExpression {
                            id: None,
                            params: vec![param],
                            body,
                        },
                    );
                    self.alloc(
                        setter.span,
                        NodeData::Property {
                            key,
                            value,
                            computed,
                            shorthand: false,
                        },
                    )
                }
                ast::Prop::Method(method) => {
                    let computed = matches!(method.key, ast::PropName::Computed(_));
                    let key = self.prop_name(&method.key);
                    let value =
                        self.function(method.function.span, None, &method.function, false);
                    let span = Span::new(method.key.span().lo, method.function.span.hi);
                    self.alloc(
                        span,
                        NodeData::Property {
                            key,
                            value,
                            computed,
                            shorthand: false,
                        },
                    )
                }
            },
        }
    }

    fn assign_target(&mut self, target: &ast::AssignTarget) -> NodeId {
        match target {
            ast::AssignTarget::Simple(simple) => match simple {
                ast::SimpleAssignTarget::Ident(binding) => self.binding_ident(binding),
                ast::SimpleAssignTarget::Member(member) => self.member(member, false),
                ast::SimpleAssignTarget::SuperProp(super_prop) => {
                    let object = self.alloc(super_prop.obj.span, NodeData::Super);
                    let (property, computed) = match &super_prop.prop {
                        ast::SuperProp::Ident(ident) => (self.ident_name(ident), false),
                        ast::SuperProp::Computed(computed) => (self.expr(&computed.expr), true),
                    };
                    self.alloc(
                        super_prop.span,
                        NodeData::MemberExpression {
                            object,
                            property,
                            computed,
                            optional: false,
                        },
                    )
                }
                ast::SimpleAssignTarget::Paren(paren) => self.expr(&paren.expr),
                ast::SimpleAssignTarget::OptChain(opt_chain) => match &*opt_chain.base {
                    ast::OptChainBase::Member(member) => self.member(member, true),
                    ast::OptChainBase::Call(call) => {
                        let callee = self.expr(&call.callee);
                        let arguments = self.args(&call.args);
                        self.alloc(call.span, NodeData::CallExpression { callee, arguments })
                    }
                },
                ast::SimpleAssignTarget::TsAs(ts_as) => self.expr(&ts_as.expr),
                ast::SimpleAssignTarget::TsSatisfies(satisfies) => self.expr(&satisfies.expr),
                ast::SimpleAssignTarget::TsNonNull(non_null) => self.expr(&non_null.expr),
                ast::SimpleAssignTarget::TsTypeAssertion(assertion) => self.expr(&assertion.expr),
                ast::SimpleAssignTarget::TsInstantiation(inst) => self.expr(&inst.expr),
                ast::SimpleAssignTarget::Invalid(invalid) => self.alloc(
                    invalid.span,
                    NodeData::Literal {
                        value: LiteralValue::Null,
                    },
                ),
            },
            ast::AssignTarget::Pat(pat) => match pat {
                ast::AssignTargetPat::Array(array) => {
                    let mut elements = Vec::with_capacity(array.elems.len());
                    for elem in &array.elems {
                        elements.push(elem.as_ref().map(|p| self.pat(p)));
                    }
                    self.alloc(array.span, NodeData::ArrayPattern { elements })
                }
                ast::AssignTargetPat::Object(object) => {
                    let mut properties = Vec::with_capacity(object.props.len());
                    for prop in &object.props {
                        properties.push(self.object_pat_prop(prop));
                    }
                    self.alloc(object.span, NodeData::ObjectPattern { properties })
                }
                ast::AssignTargetPat::Invalid(invalid) => self.alloc(
                    invalid.span,
                    NodeData::Literal {
                        value: LiteralValue::Null,
                    },
                ),
            },
        }
    }

    // ---- JSX -------------------------------------------------------------

    fn jsx_element(&mut self, element: &ast::JSXElement) -> NodeId {
        let mut parts = Vec::new();

        match &element.opening.name {
            ast::JSXElementName::Ident(ident) => {
                // Uppercase names are component references; lowercase names
                // are intrinsic elements and reference nothing.
                if ident.sym.chars().next().is_some_and(|c| c.is_uppercase()) {
                    let id = self.ident(ident);
                    parts.push(id);
                }
            }
            ast::JSXElementName::JSXMemberExpr(member) => {
                if let Some(id) = self.jsx_member_object(member) {
                    parts.push(id);
                }
            }
            ast::JSXElementName::JSXNamespacedName(_) => {}
        }

        for attr in &element.opening.attrs {
            match attr {
                ast::JSXAttrOrSpread::JSXAttr(attr) => {
                    if let Some(value) = &attr.value {
                        self.jsx_attr_value(value, &mut parts);
                    }
                }
                ast::JSXAttrOrSpread::SpreadElement(spread) => {
                    let id = self.expr(&spread.expr);
                    parts.push(id);
                }
            }
        }

        for child in &element.children {
            self.jsx_child(child, &mut parts);
        }

        self.alloc(element.span, NodeData::JsxElement { parts })
    }

    fn jsx_member_object(&mut self, member: &ast::JSXMemberExpr) -> Option<NodeId> {
        match &member.obj {
            ast::JSXObject::Ident(ident) => Some(self.ident(ident)),
            ast::JSXObject::JSXMemberExpr(nested) => self.jsx_member_object(nested),
        }
    }

    fn jsx_attr_value(&mut self, value: &ast::JSXAttrValue, parts: &mut Vec<NodeId>) {
        match value {
            ast::JSXAttrValue::Lit(_) => {}
            ast::JSXAttrValue::JSXExprContainer(container) => {
                if let ast::JSXExpr::Expr(expr) = &container.expr {
                    let id = self.expr(expr);
                    parts.push(id);
                }
            }
            ast::JSXAttrValue::JSXElement(element) => {
                let id = self.jsx_element(element);
                parts.push(id);
            }
            ast::JSXAttrValue::JSXFragment(fragment) => {
                let mut inner = Vec::new();
                for child in &fragment.children {
                    self.jsx_child(child, &mut inner);
                }
                let id = self.alloc(fragment.span, NodeData::JsxElement { parts: inner });
                parts.push(id);
            }
        }
    }

    fn jsx_child(&mut self, child: &ast::JSXElementChild, parts: &mut Vec<NodeId>) {
        match child {
            ast::JSXElementChild::JSXText(_) => {}
            ast::JSXElementChild::JSXExprContainer(container) => {
                if let ast::JSXExpr::Expr(expr) = &container.expr {
                    let id = self.expr(expr);
                    parts.push(id);
                }
            }
            ast::JSXElementChild::JSXSpreadChild(spread) => {
                let id = self.expr(&spread.expr);
                parts.push(id);
            }
            ast::JSXElementChild::JSXElement(element) => {
                let id = self.jsx_element(element);
                parts.push(id);
            }
            ast::JSXElementChild::JSXFragment(fragment) => {
                let mut inner = Vec::new();
                for nested in &fragment.children {
                    self.jsx_child(nested, &mut inner);
                }
                let id = self.alloc(fragment.span, NodeData::JsxElement { parts: inner });
                parts.push(id);
            }
        }
    }
}

fn is_logical_op(op: ast::BinaryOp) -> bool {
    matches!(
        op,
        ast::BinaryOp::LogicalAnd | ast::BinaryOp::LogicalOr | ast::BinaryOp::NullishCoalescing
    )
}

fn unary_op_str(op: ast::UnaryOp) -> &'static str {
    match op {
        ast::UnaryOp::Minus => "-",
        ast::UnaryOp::Plus => "+",
        ast::UnaryOp::Bang => "!",
        ast::UnaryOp::Tilde => "~",
        ast::UnaryOp::TypeOf => "typeof",
        ast::UnaryOp::Void => "void",
        ast::UnaryOp::Delete => "delete",
    }
}

fn binary_op_str(op: ast::BinaryOp) -> &'static str {
    match op {
        ast::BinaryOp::EqEq => "==",
        ast::BinaryOp::NotEq => "!=",
        ast::BinaryOp::EqEqEq => "===",
        ast::BinaryOp::NotEqEq => "!==",
        ast::BinaryOp::Lt => "<",
        ast::BinaryOp::LtEq => "<=",
        ast::BinaryOp::Gt => ">",
        ast::BinaryOp::GtEq => ">=",
        ast::BinaryOp::LShift => "<<",
        ast::BinaryOp::RShift => ">>",
        ast::BinaryOp::ZeroFillRShift => ">>>",
        ast::BinaryOp::Add => "+",
        ast::BinaryOp::Sub => "-",
        ast::BinaryOp::Mul => "*",
        ast::BinaryOp::Div => "/",
        ast::BinaryOp::Mod => "%",
        ast::BinaryOp::BitOr => "|",
        ast::BinaryOp::BitXor => "^",
        ast::BinaryOp::BitAnd => "&",
        ast::BinaryOp::LogicalOr => "||",
        ast::BinaryOp::LogicalAnd => "&&",
        ast::BinaryOp::In => "in",
        ast::BinaryOp::InstanceOf => "instanceof",
        ast::BinaryOp::Exp => "**",
        ast::BinaryOp::NullishCoalescing => "??",
    }
}

fn assign_op_str(op: ast::AssignOp) -> &'static str {
    match op {
        ast::AssignOp::Assign => "=",
        ast::AssignOp::AddAssign => "+=",
        ast::AssignOp::SubAssign => "-=",
        ast::AssignOp::MulAssign => "*=",
        ast::AssignOp::DivAssign => "/=",
        ast::AssignOp::ModAssign => "%=",
        ast::AssignOp::LShiftAssign => "<<=",
        ast::AssignOp::RShiftAssign => ">>=",
        ast::AssignOp::ZeroFillRShiftAssign => ">>>=",
        ast::AssignOp::BitOrAssign => "|=",
        ast::AssignOp::BitXorAssign => "^=",
        ast::AssignOp::BitAndAssign => "&=",
        ast::AssignOp::ExpAssign => "**=",
        ast::AssignOp::AndAssign => "&&=",
        ast::AssignOp::OrAssign => "||=",
        ast::AssignOp::NullishAssign => "??=",
    }
}

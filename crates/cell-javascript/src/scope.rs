//! Free identifier analysis.
//!
//! One traversal records every scope in an arena and every identifier
//! reference together with the scope it occurred in. References are resolved
//! afterwards by walking parent links, so a name declared after its use in
//! the same scope still binds it.

use itertools::Itertools;
use std::collections::HashSet;
use swc_ecma_ast::*;
use swc_ecma_visit::{Visit, VisitWith};
use thiserror::Error;

pub type ScopeId = usize;

const PROGRAM: ScopeId = 0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("Unrecognized pattern type: {0}")]
    UnsupportedPattern(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Program,
    /// A non-arrow function, which binds `this` and `arguments`.
    Function,
    Arrow,
    Block,
}

impl ScopeKind {
    /// Scopes that receive `var` and function declarations.
    fn is_hoisting_target(self) -> bool {
        !matches!(self, ScopeKind::Block)
    }

    fn binds_this(self) -> bool {
        matches!(self, ScopeKind::Function)
    }
}

#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    kind: ScopeKind,
    locals: HashSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Reference {
    Name(String),
    This,
}

#[derive(Debug)]
struct Candidate {
    reference: Reference,
    scope: ScopeId,
}

/// Scopes and references of one module.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    candidates: Vec<Candidate>,
}

impl ScopeTree {
    pub fn build(module: &Module) -> Result<Self, ScopeError> {
        let mut builder = ScopeBuilder {
            tree: ScopeTree {
                scopes: vec![Scope {
                    parent: None,
                    kind: ScopeKind::Program,
                    locals: HashSet::new(),
                }],
                candidates: Vec::new(),
            },
            current: PROGRAM,
            error: None,
        };
        module.visit_with(&mut builder);
        match builder.error {
            Some(err) => Err(err),
            None => Ok(builder.tree),
        }
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    fn chain(&self, start: ScopeId) -> impl Iterator<Item = &Scope> {
        std::iter::successors(self.scopes.get(start), |scope| {
            scope.parent.and_then(|parent| self.scopes.get(parent))
        })
    }

    fn is_bound(&self, candidate: &Candidate) -> bool {
        match &candidate.reference {
            Reference::This => self.chain(candidate.scope).any(|scope| scope.kind.binds_this()),
            Reference::Name(name) if name == "undefined" => true,
            Reference::Name(name) => self.chain(candidate.scope).any(|scope| {
                scope.locals.contains(name) || (name == "arguments" && scope.kind.binds_this())
            }),
        }
    }

    /// Unbound references not in `ignore`, in first-occurrence order.
    pub fn free_identifiers(&self, ignore: &HashSet<String>) -> Vec<String> {
        self.candidates
            .iter()
            .filter(|candidate| !self.is_bound(candidate))
            .map(|candidate| match &candidate.reference {
                Reference::Name(name) => name.as_str(),
                Reference::This => "this",
            })
            .filter(|name| !ignore.contains(*name))
            .unique()
            .map(str::to_string)
            .collect()
    }
}

pub fn find_free_identifiers(
    module: &Module,
    ignore: &HashSet<String>,
) -> Result<Vec<String>, ScopeError> {
    Ok(ScopeTree::build(module)?.free_identifiers(ignore))
}

struct ScopeBuilder {
    tree: ScopeTree,
    current: ScopeId,
    error: Option<ScopeError>,
}

impl ScopeBuilder {
    fn push_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let id = self.tree.scopes.len();
        self.tree.scopes.push(Scope {
            parent: Some(self.current),
            kind,
            locals: HashSet::new(),
        });
        self.current = id;
        id
    }

    fn pop_scope(&mut self) {
        if let Some(parent) = self.tree.scopes[self.current].parent {
            self.current = parent;
        }
    }

    fn in_scope(&mut self, kind: ScopeKind, f: impl FnOnce(&mut Self, ScopeId)) {
        let id = self.push_scope(kind);
        f(self, id);
        self.pop_scope();
    }

    fn hoisting_scope(&self) -> ScopeId {
        let mut id = self.current;
        loop {
            let scope = &self.tree.scopes[id];
            match scope.parent {
                Some(parent) if !scope.kind.is_hoisting_target() => id = parent,
                _ => return id,
            }
        }
    }

    fn declare(&mut self, scope: ScopeId, name: &str) {
        self.tree.scopes[scope].locals.insert(name.to_string());
    }

    fn declare_pattern(&mut self, pat: &Pat, scope: ScopeId) {
        match pat {
            Pat::Ident(binding) => self.declare(scope, &binding.id.sym),
            Pat::Array(array) => {
                for element in array.elems.iter().flatten() {
                    self.declare_pattern(element, scope);
                }
            }
            Pat::Object(object) => {
                for prop in &object.props {
                    match prop {
                        ObjectPatProp::KeyValue(kv) => self.declare_pattern(&kv.value, scope),
                        ObjectPatProp::Assign(assign) => self.declare(scope, &assign.key.id.sym),
                        ObjectPatProp::Rest(rest) => self.declare_pattern(&rest.arg, scope),
                    }
                }
            }
            Pat::Rest(rest) => self.declare_pattern(&rest.arg, scope),
            Pat::Assign(assign) => self.declare_pattern(&assign.left, scope),
            Pat::Expr(_) => self.fail(ScopeError::UnsupportedPattern("Expression")),
            Pat::Invalid(_) => self.fail(ScopeError::UnsupportedPattern("Invalid")),
        }
    }

    fn fail(&mut self, err: ScopeError) {
        self.error.get_or_insert(err);
    }

    fn capture(&mut self, reference: Reference) {
        self.tree.candidates.push(Candidate {
            reference,
            scope: self.current,
        });
    }

    /// Visit a named function or class expression, whose own name is only
    /// visible inside it.
    fn with_own_name(&mut self, name: Option<&Ident>, f: impl FnOnce(&mut Self)) {
        match name {
            Some(ident) => self.in_scope(ScopeKind::Block, |this, id| {
                this.declare(id, &ident.sym);
                f(this);
            }),
            None => f(self),
        }
    }
}

impl Visit for ScopeBuilder {
    fn visit_var_decl(&mut self, decl: &VarDecl) {
        let scope = match decl.kind {
            VarDeclKind::Var => self.hoisting_scope(),
            _ => self.current,
        };
        for declarator in &decl.decls {
            self.declare_pattern(&declarator.name, scope);
        }
        decl.visit_children_with(self);
    }

    fn visit_fn_decl(&mut self, decl: &FnDecl) {
        let scope = self.hoisting_scope();
        self.declare(scope, &decl.ident.sym);
        decl.function.visit_with(self);
    }

    fn visit_fn_expr(&mut self, expr: &FnExpr) {
        self.with_own_name(expr.ident.as_ref(), |this| expr.function.visit_with(this));
    }

    fn visit_function(&mut self, function: &Function) {
        self.in_scope(ScopeKind::Function, |this, id| {
            for param in &function.params {
                this.declare_pattern(&param.pat, id);
            }
            function.visit_children_with(this);
        });
    }

    fn visit_arrow_expr(&mut self, arrow: &ArrowExpr) {
        self.in_scope(ScopeKind::Arrow, |this, id| {
            for pat in &arrow.params {
                this.declare_pattern(pat, id);
            }
            arrow.visit_children_with(this);
        });
    }

    fn visit_constructor(&mut self, ctor: &Constructor) {
        self.in_scope(ScopeKind::Function, |this, id| {
            for param in &ctor.params {
                if let ParamOrTsParamProp::Param(param) = param {
                    this.declare_pattern(&param.pat, id);
                }
            }
            ctor.visit_children_with(this);
        });
    }

    fn visit_getter_prop(&mut self, getter: &GetterProp) {
        getter.key.visit_with(self);
        self.in_scope(ScopeKind::Function, |this, _| getter.body.visit_with(this));
    }

    fn visit_setter_prop(&mut self, setter: &SetterProp) {
        setter.key.visit_with(self);
        self.in_scope(ScopeKind::Function, |this, id| {
            this.declare_pattern(&setter.param, id);
            setter.param.visit_with(this);
            setter.body.visit_with(this);
        });
    }

    fn visit_class_decl(&mut self, decl: &ClassDecl) {
        let scope = self.hoisting_scope();
        self.declare(scope, &decl.ident.sym);
        decl.class.visit_with(self);
    }

    fn visit_class_expr(&mut self, expr: &ClassExpr) {
        self.with_own_name(expr.ident.as_ref(), |this| expr.class.visit_with(this));
    }

    fn visit_class(&mut self, class: &Class) {
        class.super_class.visit_with(self);
        class.decorators.visit_with(self);
        class.body.visit_with(self);
    }

    // Field initializers and static blocks run with the instance or class as
    // `this`.
    fn visit_class_prop(&mut self, prop: &ClassProp) {
        prop.decorators.visit_with(self);
        prop.key.visit_with(self);
        self.in_scope(ScopeKind::Function, |this, _| prop.value.visit_with(this));
    }

    fn visit_private_prop(&mut self, prop: &PrivateProp) {
        prop.decorators.visit_with(self);
        self.in_scope(ScopeKind::Function, |this, _| prop.value.visit_with(this));
    }

    fn visit_static_block(&mut self, block: &StaticBlock) {
        self.in_scope(ScopeKind::Function, |this, _| block.body.visit_with(this));
    }

    fn visit_block_stmt(&mut self, block: &BlockStmt) {
        self.in_scope(ScopeKind::Block, |this, _| block.visit_children_with(this));
    }

    fn visit_for_stmt(&mut self, stmt: &ForStmt) {
        self.in_scope(ScopeKind::Block, |this, _| stmt.visit_children_with(this));
    }

    fn visit_for_in_stmt(&mut self, stmt: &ForInStmt) {
        self.in_scope(ScopeKind::Block, |this, _| stmt.visit_children_with(this));
    }

    fn visit_for_of_stmt(&mut self, stmt: &ForOfStmt) {
        self.in_scope(ScopeKind::Block, |this, _| stmt.visit_children_with(this));
    }

    fn visit_catch_clause(&mut self, clause: &CatchClause) {
        self.in_scope(ScopeKind::Block, |this, id| {
            if let Some(param) = &clause.param {
                this.declare_pattern(param, id);
            }
            clause.visit_children_with(this);
        });
    }

    fn visit_switch_stmt(&mut self, stmt: &SwitchStmt) {
        stmt.discriminant.visit_with(self);
        self.in_scope(ScopeKind::Block, |this, _| stmt.cases.visit_with(this));
    }

    fn visit_import_decl(&mut self, import: &ImportDecl) {
        for specifier in &import.specifiers {
            let local = match specifier {
                ImportSpecifier::Named(named) => &named.local,
                ImportSpecifier::Default(default) => &default.local,
                ImportSpecifier::Namespace(namespace) => &namespace.local,
            };
            self.declare(PROGRAM, &local.sym);
        }
    }

    fn visit_export_specifier(&mut self, _: &ExportSpecifier) {}

    fn visit_member_expr(&mut self, expr: &MemberExpr) {
        expr.obj.visit_with(self);
        if let MemberProp::Computed(computed) = &expr.prop {
            computed.visit_with(self);
        }
    }

    fn visit_super_prop_expr(&mut self, expr: &SuperPropExpr) {
        if let SuperProp::Computed(computed) = &expr.prop {
            computed.visit_with(self);
        }
    }

    fn visit_prop_name(&mut self, name: &PropName) {
        if let PropName::Computed(computed) = name {
            computed.visit_with(self);
        }
    }

    fn visit_private_name(&mut self, _: &PrivateName) {}

    fn visit_labeled_stmt(&mut self, stmt: &LabeledStmt) {
        stmt.body.visit_with(self);
    }

    fn visit_break_stmt(&mut self, _: &BreakStmt) {}

    fn visit_continue_stmt(&mut self, _: &ContinueStmt) {}

    fn visit_ident(&mut self, ident: &Ident) {
        self.capture(Reference::Name(ident.sym.to_string()));
    }

    fn visit_this_expr(&mut self, _: &ThisExpr) {
        self.capture(Reference::This);
    }
}

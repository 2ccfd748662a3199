//! Compiling JavaScript cells.

use crate::function::{ExtractError, FunctionSpecExtractor};
use crate::globals::AnalyzerConfig;
use crate::parser::{parse_cell, ParsedSource};
use crate::printer::print_expr;
use crate::scope::{find_free_identifiers, ScopeError};
use cell_core::cell::{Cell, Input, Output};
use cell_core::diagnostics::{translate, ExecutionFailure, Message};
use cell_core::frontend::{CellFrontend, CompileOptions};
use swc_common::{Span, Spanned};
use swc_ecma_ast::*;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("Unhandled top-level construct: {0}")]
    UnsupportedTopLevel(&'static str),
    #[error("Failed to regenerate the trailing expression: {0}")]
    Codegen(String),
}

impl From<CompileError> for cell_core::Error {
    fn from(err: CompileError) -> Self {
        cell_core::Error::frontend(err)
    }
}

/// What the trailing statement of a cell exports.
#[derive(Default)]
struct TrailingOutput {
    output: Option<Output>,
    implicit_return: Option<String>,
    messages: Vec<Message>,
}

#[derive(Debug, Clone, Default)]
pub struct JavascriptCompiler {
    config: AnalyzerConfig,
}

impl JavascriptCompiler {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn compile(&self, source: &str, options: &CompileOptions) -> Result<Cell, CompileError> {
        let mut cell = Cell::new(source);
        let parsed = match parse_cell(source) {
            Ok(parsed) => parsed,
            Err(failure) => {
                debug!("cell failed to parse: {}", failure.message);
                cell.messages.push(translate(&failure.into()));
                return Ok(cell);
            }
        };

        cell.expr = is_simple_expression(&parsed.module);
        if options.expr && !cell.expr {
            let failure = ExecutionFailure::runtime("Error", "Code is not a single, simple expression");
            cell.messages.push(translate(&failure));
            return Ok(cell);
        }

        cell.inputs = find_free_identifiers(&parsed.module, &self.config.builtins)?
            .into_iter()
            .map(Input::new)
            .collect();

        let trailing = self.trailing_output(&parsed, &cell)?;
        cell.outputs.extend(trailing.output);
        cell.implicit_return = trailing.implicit_return;
        cell.messages.extend(trailing.messages);
        Ok(cell)
    }

    fn trailing_output(&self, parsed: &ParsedSource, cell: &Cell) -> Result<TrailingOutput, CompileError> {
        let Some(last) = parsed.module.body.last() else {
            return Ok(TrailingOutput::default());
        };
        let mut trailing = TrailingOutput::default();
        match last {
            ModuleItem::Stmt(Stmt::Decl(Decl::Fn(decl))) => {
                let name = decl.ident.sym.to_string();
                self.function_output(parsed, &name, &decl.function, last.span(), &mut trailing)?;
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => {
                if let DefaultDecl::Fn(FnExpr {
                    ident: Some(ident),
                    function,
                    ..
                }) = &export.decl
                {
                    let name = ident.sym.to_string();
                    self.function_output(parsed, &name, function, last.span(), &mut trailing)?;
                }
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(_)) => {}
            ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) => {
                if let Some(name) = var.decls.first().and_then(|decl| first_bound_name(&decl.name)) {
                    trailing.output = Some(Output::named(name.clone()));
                    trailing.implicit_return = Some(name);
                }
            }
            ModuleItem::Stmt(Stmt::Expr(stmt)) => {
                if let Expr::Ident(ident) = &*stmt.expr {
                    let name = ident.sym.to_string();
                    if !cell.input_names().any(|input| input == name) {
                        trailing.output = Some(Output::named(name));
                    }
                }
                let text = print_expr(parsed.cm.clone(), &stmt.expr)
                    .map_err(|err| CompileError::Codegen(format!("{err:#}")))?;
                trailing.implicit_return = Some(text);
            }
            ModuleItem::Stmt(Stmt::Block(_) | Stmt::If(_)) => {}
            other => return Err(CompileError::UnsupportedTopLevel(construct_name(other))),
        }
        Ok(trailing)
    }

    fn function_output(
        &self,
        parsed: &ParsedSource,
        name: &str,
        function: &Function,
        anchor: Span,
        trailing: &mut TrailingOutput,
    ) -> Result<(), CompileError> {
        let extracted = FunctionSpecExtractor::new(parsed).extract(name, function, anchor)?;
        trailing.output = Some(Output::function(extracted.spec));
        trailing.implicit_return = Some(name.to_string());
        trailing.messages = extracted.messages;
        Ok(())
    }
}

impl CellFrontend for JavascriptCompiler {
    fn language(&self) -> &'static str {
        "javascript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["js", "mjs"]
    }

    fn compile(&self, source: &str, options: &CompileOptions) -> cell_core::Result<Cell> {
        Ok(JavascriptCompiler::compile(self, source, options)?)
    }
}

/// Compile with the default set of ignored globals.
pub fn compile(source: &str, options: &CompileOptions) -> Result<Cell, CompileError> {
    JavascriptCompiler::default().compile(source, options)
}

/// An empty cell or a single expression statement that does not assign,
/// update, await or reach into `super`.
fn is_simple_expression(module: &Module) -> bool {
    match module.body.as_slice() {
        [] => true,
        [ModuleItem::Stmt(Stmt::Expr(stmt))] => !matches!(
            strip_parens(&stmt.expr),
            Expr::Assign(_) | Expr::Update(_) | Expr::Await(_) | Expr::SuperProp(_)
        ),
        _ => false,
    }
}

fn strip_parens(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => strip_parens(&paren.expr),
        other => other,
    }
}

fn first_bound_name(pat: &Pat) -> Option<String> {
    match pat {
        Pat::Ident(binding) => Some(binding.id.sym.to_string()),
        Pat::Array(array) => array.elems.iter().flatten().find_map(first_bound_name),
        Pat::Object(object) => object.props.iter().find_map(|prop| match prop {
            ObjectPatProp::KeyValue(kv) => first_bound_name(&kv.value),
            ObjectPatProp::Assign(assign) => Some(assign.key.id.sym.to_string()),
            ObjectPatProp::Rest(rest) => first_bound_name(&rest.arg),
        }),
        Pat::Rest(rest) => first_bound_name(&rest.arg),
        Pat::Assign(assign) => first_bound_name(&assign.left),
        Pat::Expr(_) | Pat::Invalid(_) => None,
    }
}

fn construct_name(item: &ModuleItem) -> &'static str {
    match item {
        ModuleItem::ModuleDecl(decl) => match decl {
            ModuleDecl::Import(_) => "ImportDeclaration",
            ModuleDecl::ExportDecl(_) => "ExportNamedDeclaration",
            ModuleDecl::ExportNamed(_) => "ExportNamedDeclaration",
            ModuleDecl::ExportAll(_) => "ExportAllDeclaration",
            _ => "ModuleDeclaration",
        },
        ModuleItem::Stmt(stmt) => match stmt {
            Stmt::Empty(_) => "EmptyStatement",
            Stmt::Debugger(_) => "DebuggerStatement",
            Stmt::With(_) => "WithStatement",
            Stmt::Return(_) => "ReturnStatement",
            Stmt::Labeled(_) => "LabeledStatement",
            Stmt::Break(_) => "BreakStatement",
            Stmt::Continue(_) => "ContinueStatement",
            Stmt::Switch(_) => "SwitchStatement",
            Stmt::Throw(_) => "ThrowStatement",
            Stmt::Try(_) => "TryStatement",
            Stmt::While(_) => "WhileStatement",
            Stmt::DoWhile(_) => "DoWhileStatement",
            Stmt::For(_) => "ForStatement",
            Stmt::ForIn(_) => "ForInStatement",
            Stmt::ForOf(_) => "ForOfStatement",
            Stmt::Decl(Decl::Class(_)) => "ClassDeclaration",
            _ => "Statement",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple(source: &str) -> bool {
        is_simple_expression(&parse_cell(source).expect("cell should parse").module)
    }

    #[test]
    fn recognises_simple_expressions() {
        assert!(simple(""));
        assert!(simple("42"));
        assert!(simple("x * 3"));
        assert!(simple("f(x)"));
        assert!(!simple("let y = x * 3"));
        assert!(!simple("y = x * 3"));
        assert!(!simple("(y = 1)"));
        assert!(!simple("x++"));
        assert!(!simple("y--"));
        assert!(!simple("await x"));
        assert!(!simple("1\n2"));
    }

    #[test]
    fn first_bound_name_walks_patterns() {
        let parsed = parse_cell("const [, {a: [b]}, c] = xs").expect("cell should parse");
        let ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) = &parsed.module.body[0] else {
            panic!("expected a variable declaration");
        };
        assert_eq!(first_bound_name(&var.decls[0].name).as_deref(), Some("b"));
    }
}

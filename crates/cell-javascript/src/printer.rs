//! Regenerating source text for expressions with swc's code generator.

use eyre::WrapErr;
use swc_common::{sync::Lrc, SourceMap, DUMMY_SP};
use swc_ecma_ast::{Expr, ExprStmt, Script, Stmt};
use swc_ecma_codegen::text_writer::JsWriter;
use swc_ecma_codegen::Emitter;

/// Print `expr` as it would appear in statement position, without the
/// trailing semicolon.
pub fn print_expr(cm: Lrc<SourceMap>, expr: &Expr) -> eyre::Result<String> {
    let script = Script {
        span: DUMMY_SP,
        body: vec![Stmt::Expr(ExprStmt {
            span: DUMMY_SP,
            expr: Box::new(expr.clone()),
        })],
        shebang: None,
    };
    let mut buf = Vec::new();
    {
        let mut emitter = Emitter {
            cfg: swc_ecma_codegen::Config::default(),
            cm: cm.clone(),
            comments: None,
            wr: JsWriter::new(cm, "\n", &mut buf, None),
        };
        emitter
            .emit_script(&script)
            .wrap_err("failed to emit expression")?;
    }
    let code = String::from_utf8(buf).wrap_err("emitted code is not UTF-8")?;
    Ok(code.trim_end().trim_end_matches(';').trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_cell;
    use swc_ecma_ast::{ModuleItem, Stmt};

    fn print_last(source: &str) -> String {
        let parsed = parse_cell(source).expect("cell should parse");
        match parsed.module.body.last() {
            Some(ModuleItem::Stmt(Stmt::Expr(stmt))) => {
                print_expr(parsed.cm.clone(), &stmt.expr).expect("should print")
            }
            other => panic!("expected trailing expression, found {other:?}"),
        }
    }

    #[test]
    fn prints_without_semicolon() {
        assert_eq!(print_last("let foo\nfoo * 3;"), "foo * 3");
    }
}

//! Parsing cell source into an swc module plus its block comments.

use cell_core::diagnostics::ExecutionFailure;
use cell_core::source_map::LineIndex;
use swc_common::comments::{CommentKind, SingleThreadedComments};
use swc_common::input::StringInput;
use swc_common::{sync::Lrc, BytePos, FileName, SourceMap, Span, Spanned};
use swc_ecma_ast::{EsVersion, Module, ModuleItem, Program};
use swc_ecma_parser::lexer::Lexer;
use swc_ecma_parser::{EsSyntax, Parser, Syntax};

/// A block comment, with byte offsets into the cell source covering the
/// delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocBlock {
    pub start: usize,
    pub end: usize,
    /// Comment body without the `/*` and `*/` delimiters.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxFailure {
    /// Parser message with a `(line:column)` suffix.
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl From<SyntaxFailure> for ExecutionFailure {
    fn from(failure: SyntaxFailure) -> Self {
        ExecutionFailure::syntax(failure.message, Some((failure.line, failure.column)))
    }
}

pub struct ParsedSource {
    pub module: Module,
    /// Block comments sorted by position.
    pub docs: Vec<DocBlock>,
    pub(crate) cm: Lrc<SourceMap>,
    start_pos: BytePos,
    lines: LineIndex,
}

impl ParsedSource {
    pub fn source(&self) -> &str {
        self.lines.source()
    }

    pub fn offset(&self, pos: BytePos) -> usize {
        pos.0.saturating_sub(self.start_pos.0) as usize
    }

    /// Source text covered by `span`, or the empty string for synthetic spans.
    pub fn snippet(&self, span: Span) -> &str {
        let (lo, hi) = (self.offset(span.lo), self.offset(span.hi));
        self.source().get(lo..hi).unwrap_or_default()
    }

    pub fn line_col(&self, offset: usize) -> (u32, u32) {
        self.lines.line_col(offset)
    }
}

pub fn parse_cell(source: &str) -> Result<ParsedSource, SyntaxFailure> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        FileName::Custom("cell.js".to_string()).into(),
        source.to_string(),
    );
    let comments = SingleThreadedComments::default();
    let syntax = Syntax::Es(EsSyntax {
        allow_return_outside_function: true,
        ..Default::default()
    });
    let lexer = Lexer::new(syntax, EsVersion::EsNext, StringInput::from(&*fm), Some(&comments));
    let mut parser = Parser::new_from(lexer);

    // Sloppy script unless the cell uses import or export.
    let program = parser.parse_program();
    let mut parse_errors = parser.take_errors();
    let lines = LineIndex::new(source);
    let start_pos = fm.start_pos;

    let module = match program {
        Ok(Program::Module(module)) => module,
        Ok(Program::Script(script)) => Module {
            span: script.span,
            body: script.body.into_iter().map(ModuleItem::Stmt).collect(),
            shebang: script.shebang,
        },
        Err(err) => {
            parse_errors.push(err);
            parse_errors.sort_by_key(|err| err.span().lo);
            return Err(syntax_failure(&parse_errors[0], start_pos, &lines));
        }
    };
    if let Some(err) = parse_errors.iter().min_by_key(|err| err.span().lo) {
        return Err(syntax_failure(err, start_pos, &lines));
    }

    let (leading, trailing) = comments.borrow_all();
    let mut docs: Vec<DocBlock> = leading
        .values()
        .chain(trailing.values())
        .flatten()
        .filter(|comment| comment.kind == CommentKind::Block)
        .map(|comment| {
            let start = comment.span.lo.0.saturating_sub(start_pos.0) as usize;
            let end = source
                .get(start..)
                .and_then(|rest| rest.find("*/"))
                .map(|idx| start + idx + 2)
                .unwrap_or_else(|| comment.span.hi.0.saturating_sub(start_pos.0) as usize);
            DocBlock {
                start,
                end,
                text: comment.text.to_string(),
            }
        })
        .collect();
    docs.sort_by_key(|doc| doc.start);
    docs.dedup_by_key(|doc| doc.start);

    Ok(ParsedSource {
        module,
        docs,
        cm,
        start_pos,
        lines,
    })
}

fn syntax_failure(
    err: &swc_ecma_parser::error::Error,
    start_pos: BytePos,
    lines: &LineIndex,
) -> SyntaxFailure {
    let (line, column) = lines.line_col(err.span().lo.0.saturating_sub(start_pos.0) as usize);
    SyntaxFailure {
        message: format!("{} ({line}:{column})", err.kind().msg()),
        line,
        column,
    }
}

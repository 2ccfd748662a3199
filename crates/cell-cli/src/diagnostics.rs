//! Rendering cell messages and CLI errors with miette.

use crate::Result;
use cell_core::diagnostics::{Message, MessageLevel};
use cell_core::source_map::LineIndex;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Set up miette as the global report handler
pub fn setup_error_reporting() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .map_err(|e| crate::CliError::Config(format!("Failed to setup error reporting: {}", e)))?;

    Ok(())
}

/// A cell message attached to the cell source.
#[derive(Error, Debug, Diagnostic)]
pub enum CellDiagnostic {
    #[error("{message}")]
    #[diagnostic(code(cell::error), severity(Error))]
    Error {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: Option<SourceSpan>,
    },

    #[error("{message}")]
    #[diagnostic(code(cell::warning), severity(Warning))]
    Warning {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: Option<SourceSpan>,
    },
}

impl CellDiagnostic {
    pub fn from_message(name: &str, source: &str, message: &Message) -> Self {
        let span = message_span(&LineIndex::new(source), message);
        let src = NamedSource::new(name, source.to_string());
        let text = message.message.clone();
        match message.level {
            MessageLevel::Error => CellDiagnostic::Error {
                message: text,
                src,
                span,
            },
            MessageLevel::Warning => CellDiagnostic::Warning {
                message: text,
                src,
                span,
            },
        }
    }

    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            CellDiagnostic::Error { span, .. } | CellDiagnostic::Warning { span, .. } => *span,
        }
    }
}

/// One character at the message location, or nothing when the message has
/// no location.
fn message_span(lines: &LineIndex, message: &Message) -> Option<SourceSpan> {
    let offset = lines.offset_for_line_col(message.line, message.column)?;
    let len = lines
        .source()
        .get(offset..)
        .and_then(|rest| rest.chars().next())
        .map(char::len_utf8)
        .unwrap_or(0);
    Some((offset, len).into())
}

/// Print every message of a cell to stderr.
pub fn report_messages(name: &str, source: &str, messages: &[Message]) {
    for message in messages {
        let report = miette::Report::new(CellDiagnostic::from_message(name, source, message));
        eprintln!("{:?}", report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn spans_point_at_the_message_location() {
        let source = "let x = 1\nfoo bar()";
        let message = Message::error("Syntax error in Javascript: Unexpected token (2:5)").at(2, 5);
        let diagnostic = CellDiagnostic::from_message("cell.js", source, &message);
        assert_eq!(diagnostic.span(), Some((14, 1).into()));
        assert!(matches!(diagnostic, CellDiagnostic::Error { .. }));
        assert_eq!(diagnostic.to_string(), message.message);
    }

    #[test]
    fn unlocated_messages_have_no_span() {
        let message = Message::warning("Documentation tag @title is given more than once");
        let diagnostic = CellDiagnostic::from_message("cell.js", "x", &message);
        assert_eq!(diagnostic.span(), None);
        assert!(matches!(diagnostic, CellDiagnostic::Warning { .. }));
    }

    #[test]
    fn locations_past_the_end_have_an_empty_span() {
        let message = Message::error("Unexpected eof").at(1, 4);
        let diagnostic = CellDiagnostic::from_message("cell.js", "for", &message);
        assert_eq!(diagnostic.span(), Some((3, 0).into()));
    }
}

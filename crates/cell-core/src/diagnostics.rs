//! Cell messages and translation of raw execution failures into them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Lines the evaluator prepends to a cell body before running it.
pub const WRAPPER_LINE_OFFSET: u32 = 2;

static STACK_FRAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<anonymous>:(\d+):(\d+)").expect("valid stack frame pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Error,
    Warning,
}

/// A diagnostic attached to a cell. Line and column are 1-based, or 0 when
/// no location is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub level: MessageLevel,
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl Message {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            message: message.into(),
            line: 0,
            column: 0,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            ..Self::error(message)
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == MessageLevel::Error
    }
}

/// A failure raised while parsing or running cell code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionFailure {
    Syntax {
        message: String,
        location: Option<(u32, u32)>,
    },
    Runtime {
        /// `Name: message` of the thrown error.
        message: String,
        stack: Option<String>,
    },
}

impl ExecutionFailure {
    pub fn syntax(message: impl Into<String>, location: Option<(u32, u32)>) -> Self {
        ExecutionFailure::Syntax {
            message: message.into(),
            location,
        }
    }

    pub fn runtime(name: &str, message: &str) -> Self {
        ExecutionFailure::Runtime {
            message: format!("{name}: {message}"),
            stack: None,
        }
    }

    pub fn with_stack(self, stack: impl Into<String>) -> Self {
        match self {
            ExecutionFailure::Runtime { message, .. } => ExecutionFailure::Runtime {
                message,
                stack: Some(stack.into()),
            },
            syntax => syntax,
        }
    }
}

pub fn translate(failure: &ExecutionFailure) -> Message {
    match failure {
        ExecutionFailure::Syntax { message, location } => {
            let (line, column) = location.unwrap_or((0, 0));
            Message::error(format!("Syntax error in Javascript: {message}")).at(line, column)
        }
        ExecutionFailure::Runtime { message, stack } => {
            let Some(stack) = stack else {
                return Message::error(message.clone());
            };
            let mut lines = stack.lines();
            let headline = lines
                .next()
                .filter(|line| !line.is_empty())
                .unwrap_or(message);
            let (line, column) = lines
                .next()
                .and_then(|frame| STACK_FRAME.captures(frame))
                .and_then(|captures| {
                    let line: u32 = captures[1].parse().ok()?;
                    let column: u32 = captures[2].parse().ok()?;
                    Some((line.saturating_sub(WRAPPER_LINE_OFFSET), column))
                })
                .unwrap_or((0, 0));
            Message::error(headline).at(line, column)
        }
    }
}

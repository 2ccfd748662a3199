//! JavaScript cells, analysed with the swc parser.

pub mod compiler;
pub mod doc;
pub mod function;
pub mod globals;
pub mod parser;
pub mod printer;
pub mod scope;

pub use compiler::{compile, CompileError, JavascriptCompiler};
pub use globals::{AnalyzerConfig, JS_GLOBALS};
pub use scope::{find_free_identifiers, ScopeError};

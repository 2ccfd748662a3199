//! Command line interface for the notebook cell compiler.
//!
//! The `cell` binary compiles a cell source file and prints the resulting
//! [`Cell`](cell_core::cell::Cell) as JSON, lists the free identifiers a cell
//! reads, or prints the function spec of a trailing function declaration.

pub mod commands;
pub mod config;
pub mod diagnostics;

pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum CliError {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("Configuration error: {0}")]
        Config(String),

        #[error("Compilation error: {0}")]
        Compilation(String),

        #[error("Invalid input: {0}")]
        InvalidInput(String),
    }

    impl From<cell_core::Error> for CliError {
        fn from(err: cell_core::Error) -> Self {
            CliError::Compilation(err.to_string())
        }
    }

    impl From<cell_javascript::CompileError> for CliError {
        fn from(err: cell_javascript::CompileError) -> Self {
            CliError::Compilation(err.to_string())
        }
    }

    impl From<cell_javascript::ScopeError> for CliError {
        fn from(err: cell_javascript::ScopeError) -> Self {
            CliError::Compilation(err.to_string())
        }
    }

    impl From<serde_json::Error> for CliError {
        fn from(err: serde_json::Error) -> Self {
            CliError::InvalidInput(format!("failed to serialize output: {err}"))
        }
    }

    pub type Result<T> = std::result::Result<T, CliError>;
}

pub use error::{CliError, Result};

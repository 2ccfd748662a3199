//! Command implementations for the cell CLI

pub mod compile;
pub mod globals;
pub mod spec;

pub use compile::compile_command;
pub use globals::globals_command;
pub use spec::spec_command;

use crate::{config::CliConfig, CliError, Result};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// Source text of a cell file; `-` reads standard input.
pub(crate) fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        return Ok(source);
    }
    if !path.exists() {
        return Err(CliError::InvalidInput(format!(
            "Input file {} does not exist",
            path.display()
        )));
    }
    Ok(std::fs::read_to_string(path)?)
}

pub(crate) fn display_name(path: &Path) -> String {
    if path == Path::new("-") {
        "<stdin>".to_string()
    } else {
        path.display().to_string()
    }
}

pub(crate) fn to_json<T: Serialize>(value: &T, pretty: bool, config: &CliConfig) -> Result<String> {
    let json = if pretty || config.output.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

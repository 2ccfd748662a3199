//! `cell spec`: print the spec of the function a cell defines.

use super::{display_name, read_source, to_json};
use crate::{config::CliConfig, diagnostics::report_messages, CliError, Result};
use cell_core::frontend::CompileOptions;
use cell_javascript::JavascriptCompiler;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct SpecArgs {
    /// Cell source file, or `-` for standard input
    pub input: PathBuf,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub fn spec_command(args: SpecArgs, config: &CliConfig) -> Result<()> {
    let source = read_source(&args.input)?;
    let name = display_name(&args.input);
    let cell = JavascriptCompiler::new(config.analyzer_config())
        .compile(&source, &CompileOptions::default())?;
    report_messages(&name, &source, &cell.messages);

    let spec = cell
        .output()
        .and_then(|output| output.spec.as_ref())
        .ok_or_else(|| {
            CliError::InvalidInput(format!("{name} does not end with a function declaration"))
        })?;
    println!("{}", to_json(spec, args.pretty, config)?);
    Ok(())
}

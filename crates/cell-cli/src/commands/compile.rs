//! `cell compile`: compile a cell and print it as JSON.

use super::{display_name, read_source, to_json};
use crate::{config::CliConfig, diagnostics::report_messages, CliError, Result};
use cell_core::frontend::{CompileOptions, FrontendRegistry};
use cell_javascript::JavascriptCompiler;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Args)]
pub struct CompileArgs {
    /// Cell source file, or `-` for standard input
    pub input: PathBuf,
    /// Require the cell to be a single, simple expression
    #[arg(long)]
    pub expr: bool,
    /// Additional names to treat as globals
    #[arg(long = "builtin", value_name = "NAME")]
    pub builtins: Vec<String>,
    /// Source language, overriding detection from the file extension
    #[arg(long)]
    pub language: Option<String>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
    /// Exit with an error when the cell has error messages
    #[arg(long)]
    pub strict: bool,
}

pub fn frontends(config: &CliConfig, builtins: &[String]) -> FrontendRegistry {
    let analyzer = config.analyzer_config().with_builtins(builtins.iter().cloned());
    let mut registry = FrontendRegistry::new();
    registry.register(Arc::new(JavascriptCompiler::new(analyzer)));
    registry
}

pub fn compile_command(args: CompileArgs, config: &CliConfig) -> Result<()> {
    let source = read_source(&args.input)?;
    let registry = frontends(config, &args.builtins);
    let frontend = match &args.language {
        Some(language) => registry.by_language(language).ok_or_else(|| {
            let known: Vec<&str> = registry.languages().collect();
            CliError::InvalidInput(format!(
                "Unknown cell language \"{language}\" (known: {})",
                known.join(", ")
            ))
        })?,
        None if args.input == Path::new("-") => registry
            .by_language("javascript")
            .ok_or_else(|| CliError::InvalidInput("No default cell language".to_string()))?,
        None => registry.for_path(&args.input)?,
    };
    debug!("compiling {} as {}", args.input.display(), frontend.language());

    let options = CompileOptions {
        expr: args.expr || config.compile.expr,
    };
    let cell = frontend.compile(&source, &options)?;
    report_messages(&display_name(&args.input), &source, &cell.messages);
    println!("{}", to_json(&cell, args.pretty, config)?);

    if args.strict && cell.has_errors() {
        return Err(CliError::Compilation(format!(
            "{} has errors",
            display_name(&args.input)
        )));
    }
    info!(
        "compiled {} ({} inputs, {} outputs)",
        display_name(&args.input),
        cell.inputs.len(),
        cell.outputs.len()
    );
    Ok(())
}

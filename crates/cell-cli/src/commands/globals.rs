//! `cell globals`: list the free identifiers a JavaScript cell reads.

use super::read_source;
use crate::{config::CliConfig, CliError, Result};
use cell_core::diagnostics::translate;
use cell_javascript::parser::parse_cell;
use cell_javascript::find_free_identifiers;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct GlobalsArgs {
    /// Cell source file, or `-` for standard input
    pub input: PathBuf,
    /// Additional names to treat as globals
    #[arg(long = "builtin", value_name = "NAME")]
    pub builtins: Vec<String>,
    /// Report every free name, including ES and Node.js built-ins
    #[arg(long)]
    pub all: bool,
}

pub fn free_names(source: &str, args: &GlobalsArgs, config: &CliConfig) -> Result<Vec<String>> {
    let parsed = parse_cell(source)
        .map_err(|failure| CliError::Compilation(translate(&failure.into()).message))?;
    let analyzer = if args.all {
        Default::default()
    } else {
        config.analyzer_config().with_builtins(args.builtins.iter().cloned()).builtins
    };
    Ok(find_free_identifiers(&parsed.module, &analyzer)?)
}

pub fn globals_command(args: GlobalsArgs, config: &CliConfig) -> Result<()> {
    let source = read_source(&args.input)?;
    for name in free_names(&source, &args, config)? {
        println!("{name}");
    }
    Ok(())
}

//! Notebook cell compiler CLI
//!
//! # Usage
//!
//! ```bash
//! # Compile a cell and print its inputs, outputs and messages as JSON
//! cell compile plot.js --pretty
//!
//! # Require a single expression
//! echo 'x * 3' | cell compile - --expr
//!
//! # List the names a cell reads from its environment
//! cell globals analysis.js
//!
//! # Print the spec of the function a cell defines
//! cell spec sum.js
//! ```

use cell_cli::{
    commands::{
        self, compile::CompileArgs, globals::GlobalsArgs, spec::SpecArgs,
    },
    config::CliConfig,
    diagnostics::setup_error_reporting,
    Result,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "cell",
    version = env!("CARGO_PKG_VERSION"),
    about = "Compile notebook cells: find their inputs, outputs and function specs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (use multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Set log level (overrides --verbose/--quiet)
    #[arg(long, global = true, value_enum)]
    log: Option<LogLevel>,

    /// Set log output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormat,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a cell and print it as JSON
    Compile(CompileArgs),

    /// List the free identifiers of a JavaScript cell
    Globals(GlobalsArgs),

    /// Print the spec of the function a cell ends with
    Spec(SpecArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_error_reporting()?;
    setup_logging(cli.verbose, cli.quiet, cli.log, cli.log_format);

    let result = CliConfig::load(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Compile(args) => commands::compile_command(args, &config),
        Commands::Globals(args) => commands::globals_command(args, &config),
        Commands::Spec(args) => commands::spec_command(args, &config),
    });

    match result {
        Ok(()) => {
            if cli.verbose > 0 {
                info!("Command completed successfully");
            }
            Ok(())
        }
        Err(e) => {
            use tracing::error;
            error!("{}", e);
            if cli.verbose > 0 {
                error!(?e, "detailed error context");
            }
            std::process::exit(1);
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool, log_level: Option<LogLevel>, log_format: LogFormat) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if let Some(level) = log_level {
        EnvFilter::new(match level {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        })
    } else if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // stdout carries the JSON output
    let formatter = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_level(true);

    match log_format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(formatter)
                .with(filter)
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(formatter.json())
                .with(filter)
                .init();
        }
    }
}

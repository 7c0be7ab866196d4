//! # formcheck CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use formcheck_cli::check::{run_check, CheckArgs};
use formcheck_cli::config::FormcheckConfig;
use formcheck_cli::schema::{run_schema, SchemaArgs};

/// formcheck — static validation of multi-step form configurations.
///
/// Checks form declarations against the allowed properties, types and
/// values of forms, steps and fields, without evaluating any code.
#[derive(Parser, Debug)]
#[command(name = "formcheck", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate form declarations in ESTree or JSON/YAML files.
    Check(CheckArgs),

    /// Print the effective schema tables.
    Schema(SchemaArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter_directive(cli.verbose, trace_requested(&cli))))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "formcheck starting");

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Check(args) => run_check(&args, config),
        Commands::Schema(args) => run_schema(&args, config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

/// Log filter for the given `-v` count. Element tracing needs the engine's
/// `debug` events, so it lifts `formcheck_schema` to at least `debug`.
fn filter_directive(verbose: u8, trace: bool) -> String {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    if trace && verbose < 2 {
        format!("{level},formcheck_schema=debug")
    } else {
        level.to_string()
    }
}

/// `--trace` on the command line, or `trace: true` in the config file.
fn trace_requested(cli: &Cli) -> bool {
    let Commands::Check(args) = &cli.command else {
        return false;
    };
    args.trace
        || FormcheckConfig::load_optional(cli.config.as_deref())
            .ok()
            .and_then(|config| config.trace)
            .unwrap_or(false)
}

//! Folio CLI - document pipeline.
//!
//! Provides commands for:
//! - `build`: Parse every document and write generated pages
//! - `nav`: Print the navigation tree of the source directory

mod commands;
mod error;
mod output;
mod sink;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::FromEnvError;

use commands::{BuildArgs, NavArgs};
use output::Output;

/// Folio - document pipeline.
#[derive(Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    /// Enable info-level logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build pages from the source directory.
    Build(BuildArgs),
    /// Print the navigation tree.
    Nav(NavArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose, EnvFilter::try_from_default_env()))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(&output),
        Commands::Nav(args) => args.execute(&output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}

/// `--verbose` forces INFO, otherwise `RUST_LOG` or the default WARN.
fn log_filter(verbose: bool, from_env: Result<EnvFilter, FromEnvError>) -> EnvFilter {
    if verbose {
        EnvFilter::new("info")
    } else {
        from_env.unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

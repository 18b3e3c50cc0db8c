//! RW CLI - OpenAPI reference documentation compiler.
//!
//! Provides commands for:
//! - `build`: Write the page tree, navigation, and text exports to disk
//! - `llms`: Print the plain-text export of the whole API or one page
//! - `nav`: Print the navigation tree as JSON

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, LlmsArgs, NavArgs};
use output::Output;

/// RW - OpenAPI reference documentation compiler.
#[derive(Parser)]
#[command(name = "rw", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the API reference into an output directory.
    Build(BuildArgs),
    /// Print the plain-text export for LLM consumption.
    Llms(LlmsArgs),
    /// Print the navigation tree as JSON.
    Nav(NavArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // Check if verbose flag is set for build command
    let verbose = matches!(&cli.command, Commands::Build(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Llms(args) => args.execute(),
        Commands::Nav(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

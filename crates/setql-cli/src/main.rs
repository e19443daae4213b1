//! Setql CLI - inspection and debugging tool for the Setql operator engine.
//!
//! Lists the operator catalog, shows how a call resolves, and evaluates
//! JSON expression documents against in-memory inputs.

mod commands;
mod document;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Setql operator engine tool.
///
/// A command-line interface for inspecting overload resolution and
/// evaluating set expressions.
#[derive(Parser)]
#[command(name = "setql")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "table")]
    format: OutputFormat,

    /// Suppress info messages
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

/// Output format options.
#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table format (default for TTY)
    #[default]
    Table,
    /// Machine-readable JSON format
    Json,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// List declared operator signatures
    Catalog {
        /// Only show overloads of this operator
        #[arg(long)]
        name: Option<String>,
    },

    /// Resolve a call against the catalog
    Resolve {
        /// Operator name (e.g. IN, ??)
        name: String,

        /// Argument element types (e.g. int32 decimal)
        types: Vec<String>,
    },

    /// Compile and evaluate a JSON expression document
    Eval {
        /// Path to the document
        file: PathBuf,

        /// Print the compiled fragment instead of evaluating it
        #[arg(long)]
        explain: bool,

        /// Disable constant folding
        #[arg(long)]
        no_fold: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    } else if !cli.quiet {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match cli.command {
        Commands::Catalog { name } => commands::catalog::run(name.as_deref(), cli.format, cli.quiet),
        Commands::Resolve { name, types } => {
            commands::resolve::run(&name, &types, cli.format, cli.quiet)
        }
        Commands::Eval {
            file,
            explain,
            no_fold,
        } => commands::eval::run(&file, explain, no_fold, cli.format, cli.quiet),
    };

    if let Err(e) = result {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

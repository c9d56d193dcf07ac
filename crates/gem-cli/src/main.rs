//! gem: command-line gemstone analysis for jewelry STL models.
//!
//! Loads a model, finds the metal body and the set stones, and reports the
//! cut of every stone. Suitable for batch checks over model libraries.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=gem_analysis=info` - One summary line per analysis
//! - `RUST_LOG=gem_analysis=debug` - Per-island decisions
//! - `RUST_LOG=gem_analysis::timing=debug` - Performance timing
//! - `RUST_LOG=debug` - All debug output
//!
//! # Example
//!
//! ```bash
//! # Which stones does this ring carry?
//! gem analyze ring.stl
//!
//! # Per-island report as JSON, with tuned thresholds
//! gem --format json --config gems.toml islands ring.stl
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{analyze, islands, params};

/// gem - Detect gemstones in jewelry models and name their cuts.
#[derive(Parser)]
#[command(name = "gem")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Analysis parameters file (TOML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether a model carries gems and which cuts they have
    Analyze {
        /// Input STL file
        input: PathBuf,
    },

    /// Show every island with its descriptor and classification
    Islands {
        /// Input STL file
        input: PathBuf,
    },

    /// Print the analysis parameters in effect
    Params,
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "gem_analysis=info,gem=info",
            2 => "gem_analysis=debug,gem=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    #[cfg(debug_assertions)]
    miette::set_panic_hook();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Analyze { input } => analyze::run(input, &cli),
        Commands::Islands { input } => islands::run(input, &cli),
        Commands::Params => params::run(&cli),
    };

    if let Err(e) = &result {
        if !cli.quiet {
            if let Some(gem_err) = e.downcast_ref::<gem_analysis::GemError>() {
                eprintln!("{}: {}", "Error".red().bold(), gem_err);
                eprintln!("  {}: {}", "Code".cyan(), gem_err.code());
                eprintln!(
                    "  {}: {}",
                    "Suggestion".green(),
                    gem_err.recovery_suggestion()
                );
            } else {
                eprintln!("{}: {}", "Error".red().bold(), e);
                for cause in e.chain().skip(1) {
                    eprintln!("  {}: {}", "Caused by".yellow(), cause);
                }
            }
        }
        std::process::exit(1);
    }

    Ok(())
}

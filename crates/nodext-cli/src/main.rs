//! # nodext-cli
//!
//! Resolves the dependency closure of the external node modules a packaged
//! application needs at runtime.
//!
//! This is the entry point of the `nodext` binary. It parses arguments, sets
//! up logging, and dispatches to the command handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use nodext_core::error::{NodextError, NodextResult};
use nodext_resolver::ResolverStrategy;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod commands;
mod npmrc;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Resolve the dependency closure of external node modules
#[derive(Parser)]
#[command(name = "nodext", version, about = "Resolve external node module closures")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Abort resolution after this many seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the closure of the configured externals
    Resolve {
        /// External modules (defaults to the configured modules)
        seeds: Vec<String>,
        /// Modules never included (comma separated)
        #[arg(long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,
        /// Resolution strategy: lock-graph or remote-listing
        #[arg(long)]
        strategy: Option<ResolverStrategy>,
        /// Extra externals file (JSON array of module names)
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
        /// Print the closure as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Print packaging patterns for the closure
    Patterns {
        /// Print the patterns as JSON
        #[arg(long)]
        json: bool,
    },
    /// Tell whether a module request is provided externally
    Check {
        /// Module request, e.g. `knex/lib/client`
        request: String,
    },
    /// Show version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    setup_panic_handler();

    debug!("Starting nodext v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", ErrorFormatter::new().format_error(&err));
            ExitCode::FAILURE
        },
    }
}

fn run_cli(cli: Cli) -> NodextResult<()> {
    // Resolution only overlaps I/O; one thread is enough
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| NodextError::io("Failed to create async runtime".to_string(), e))?;

    rt.block_on(async {
        let ctx = CommandContext::new(cli.root, cli.timeout)?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "nodext={level},nodext_config={level},nodext_registry={level},nodext_resolver={level}"
        ))
    });

    // Logs go to stderr so that stdout stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("nodext encountered an unexpected error: {}", panic_info);
        eprintln!("nodext crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/nodext/nodext/issues");
        eprintln!("Error: {}", panic_info);
    }));
}

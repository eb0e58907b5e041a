//! Tilestitch CLI - Command-line interface
//!
//! Fetches the web map tiles covering a lon/lat box and writes them as one
//! PNG with a JSON sidecar describing its projected extent.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::cache::CacheAction;
use commands::config::ConfigCommands;
use commands::fetch::FetchArgs;
use commands::tiles::TilesArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "tilestitch")]
#[command(version, about = "Stitch web map tiles covering a region into one image", long_about = None)]
struct Cli {
    /// Config file (default: ~/.tilestitch/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level to stderr and the log file
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and stitch the tiles covering a region
    Fetch(FetchArgs),

    /// List the tiles covering a region without downloading them
    Tiles(TilesArgs),

    /// Manage the tile cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let runner = CliRunner::new(cli.config, cli.verbose)?;
    match cli.command {
        Commands::Fetch(args) => commands::fetch::run(&runner, args),
        Commands::Tiles(args) => commands::tiles::run(&runner, args),
        Commands::Cache { action } => commands::cache::run(&runner, action),
        Commands::Config { command } => commands::config::run(&runner, command),
    }
}

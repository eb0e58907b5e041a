//! Cache management CLI commands.

use clap::Subcommand;
use tilestitch::cache::TileCache;
use tilestitch::provider::ProviderFactory;

use super::common::ProviderArgs;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Remove every cached tile of the configured provider
    Clear {
        #[command(flatten)]
        provider: ProviderArgs,
    },
    /// Show where the configured provider's tiles are cached and how many
    Info {
        #[command(flatten)]
        provider: ProviderArgs,
    },
}

/// Run a cache subcommand.
pub fn run(runner: &CliRunner, action: CacheAction) -> Result<(), CliError> {
    let provider_args = match &action {
        CacheAction::Clear { provider } | CacheAction::Info { provider } => provider,
    };
    let config = runner.effective_config(provider_args);
    let provider = ProviderFactory::create(&config.provider_config()?)?;
    let cache = TileCache::open(&config.cache.directory, &provider.cache_namespace())?;

    match action {
        CacheAction::Clear { .. } => {
            println!("Clearing tile cache at: {}", cache.directory().display());
            let removed = cache.clear()?;
            println!("Deleted {} tiles", removed);
        }
        CacheAction::Info { .. } => {
            println!("Provider:  {}", provider.name());
            println!("Directory: {}", cache.directory().display());
            println!("Tiles:     {}", cache.len());
            if !config.cache.enabled {
                println!("(caching is disabled in the config file)");
            }
        }
    }
    Ok(())
}

//! Configuration management CLI commands.

use clap::Subcommand;
use tilestitch::config::{ConfigFile, ConfigFileError};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Write a config file with every setting and its default
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(runner: &CliRunner, command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init { force } => run_init(runner, force),
        ConfigCommands::Show => run_show(runner),
        ConfigCommands::Path => {
            println!("{}", runner.config_path().display());
            Ok(())
        }
    }
}

fn run_init(runner: &CliRunner, force: bool) -> Result<(), CliError> {
    let path = runner.config_path();
    if path.exists() && !force {
        return Err(CliError::Config(ConfigFileError::WriteError(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ))));
    }
    ConfigFile::default().save_to(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn run_show(runner: &CliRunner) -> Result<(), CliError> {
    let config = runner.config();
    println!("# {}", runner.config_path().display());
    println!("[provider]");
    println!("type = {}", config.provider.provider_type);
    for (key, value) in [
        ("style", &config.provider.style),
        ("url", &config.provider.url),
        ("name", &config.provider.name),
        ("username", &config.provider.username),
        ("map_id", &config.provider.map_id),
        ("layer", &config.provider.layer),
        ("tileset_id", &config.provider.tileset_id),
        ("api_version", &config.provider.api_version),
    ] {
        if let Some(value) = value {
            println!("{} = {}", key, value);
        }
    }
    for (key, value) in [
        ("access_token", &config.provider.access_token),
        ("api_key", &config.provider.api_key),
    ] {
        if value.is_some() {
            println!("{} = ********", key);
        }
    }
    if let Some(addressing) = config.provider.addressing {
        println!("addressing = {}", addressing);
    }
    println!("y_axis = {:?}", config.provider.y_axis);
    println!();
    println!("[download]");
    println!("user_agent = {}", config.download.user_agent);
    println!("timeout = {}", config.download.timeout);
    println!("max_concurrent = {}", config.download.max_concurrent);
    println!();
    println!("[cache]");
    println!("enabled = {}", config.cache.enabled);
    println!("directory = {}", config.cache.directory.display());
    println!();
    println!("[raster]");
    match config.raster.color_mode {
        Some(mode) => println!("color_mode = {}", mode),
        None => println!("color_mode = (provider default)"),
    }
    Ok(())
}

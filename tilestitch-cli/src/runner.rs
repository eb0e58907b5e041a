//! CLI runner for common setup.
//!
//! Loads the config file, applies command-line overrides and keeps logging
//! alive for the duration of a command.

use std::path::{Path, PathBuf};

use tilestitch::config::{config_file_path, ConfigFile};
use tilestitch::logging::{default_log_dir, default_log_file, init_logging_with_level, LoggingGuard};

use crate::commands::common::ProviderArgs;
use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Keeps the file writer flushing while the runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
    config_path: PathBuf,
}

impl CliRunner {
    /// Loads the config (defaults if the file is missing) and initializes
    /// logging.
    pub fn new(config_path: Option<PathBuf>, verbose: bool) -> Result<Self, CliError> {
        let config_path = config_path.unwrap_or_else(config_file_path);
        let config = ConfigFile::load_from(&config_path)?;

        let level = if verbose { "debug" } else { "warn" };
        let logging_guard = init_logging_with_level(&default_log_dir(), default_log_file(), level)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            config_path,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The configuration with `--provider`, `--style` and `--url` applied.
    pub fn effective_config(&self, overrides: &ProviderArgs) -> ConfigFile {
        let mut config = self.config.clone();
        overrides.apply(&mut config);
        config
    }
}

//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use tilestitch::cache::CacheError;
use tilestitch::config::ConfigFileError;
use tilestitch::domain::DomainError;
use tilestitch::provider::ProviderError;
use tilestitch::service::ServiceError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be read, written or understood
    Config(ConfigFileError),
    /// Invalid command-line argument
    InvalidArgument(String),
    /// Provider could not be created
    Provider(ProviderError),
    /// Domain query failed
    Service(ServiceError),
    /// Cache maintenance failed
    Cache(CacheError),
    /// Failed to write an output file
    FileWrite { path: PathBuf, error: String },
}

impl CliError {
    /// Exit the process with an error message and code 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Provider(ProviderError::MissingSetting(_))
            | CliError::Config(ConfigFileError::MissingValue { .. }) => {
                eprintln!();
                eprintln!("Set the missing key in the [provider] section of the config file.");
                eprintln!("Run 'tilestitch config init' to create one with every key listed.");
            }
            CliError::Service(ServiceError::Cache(_)) => {
                eprintln!();
                eprintln!("Check [cache] directory in the config file, or pass --no-cache.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Provider(e) => write!(f, "Provider error: {}", e),
            CliError::Service(e) => write!(f, "{}", e),
            CliError::Cache(e) => write!(f, "Cache error: {}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Provider(e) => Some(e),
            CliError::Service(e) => Some(e),
            CliError::Cache(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::Provider(e)
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        CliError::Service(e)
    }
}

impl From<CacheError> for CliError {
    fn from(e: CacheError) -> Self {
        CliError::Cache(e)
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::InvalidArgument(e.to_string())
    }
}

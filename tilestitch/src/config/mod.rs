//! User configuration file
//!
//! `~/.tilestitch/config.ini` selects the provider and tunes downloading,
//! caching and the raster format. A missing file means defaults.
//!
//! # Example
//!
//! ```
//! use tilestitch::config::ConfigFile;
//! use tilestitch::provider::ProviderConfig;
//!
//! let config = ConfigFile::default();
//! assert_eq!(config.provider_config().unwrap(), ProviderConfig::Osm);
//! assert!(config.service_config().cache_enabled());
//! ```

mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    CacheSettings, ConfigFile, DownloadSettings, ProviderSettings, RasterSettings,
    DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_PROVIDER_TYPE, VALID_PROVIDER_TYPES,
};

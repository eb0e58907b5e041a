//! Settings structs for each section of the configuration file.

use std::path::PathBuf;
use std::time::Duration;

use super::file::ConfigFileError;
use crate::cache::default_cache_root;
use crate::coord::{Addressing, YAxis};
use crate::orchestrator::MAX_CONCURRENT_FETCHES;
use crate::provider::{ProviderConfig, DEFAULT_USER_AGENT};
use crate::raster::ColorMode;
use crate::service::ServiceConfig;

/// Default provider type.
pub const DEFAULT_PROVIDER_TYPE: &str = "osm";

/// Default HTTP timeout in seconds.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;

/// Provider types accepted by `[provider] type`.
pub const VALID_PROVIDER_TYPES: [&str; 8] = [
    "osm",
    "google",
    "mapbox",
    "mapbox_style",
    "quadtree",
    "azure",
    "ordnance_survey",
    "custom",
];

/// Parsed `config.ini`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub provider: ProviderSettings,
    pub download: DownloadSettings,
    pub cache: CacheSettings,
    pub raster: RasterSettings,
}

/// `[provider]` section.
///
/// Which keys matter depends on `provider_type`; unused keys are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub provider_type: String,
    /// Google style or Ordnance Survey layer name
    pub style: Option<String>,
    /// URL template for `google` (optional) and `custom` (required)
    pub url: Option<String>,
    /// Display name for `custom`
    pub name: Option<String>,
    pub access_token: Option<String>,
    pub username: Option<String>,
    pub map_id: Option<String>,
    pub api_key: Option<String>,
    pub layer: Option<String>,
    pub tileset_id: Option<String>,
    pub api_version: Option<String>,
    /// Overrides the provider's addressing during discovery
    pub addressing: Option<Addressing>,
    pub y_axis: YAxis,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            provider_type: DEFAULT_PROVIDER_TYPE.to_string(),
            style: None,
            url: None,
            name: None,
            access_token: None,
            username: None,
            map_id: None,
            api_key: None,
            layer: None,
            tileset_id: None,
            api_version: None,
            addressing: None,
            y_axis: YAxis::NorthOrigin,
        }
    }
}

/// `[download]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSettings {
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub timeout: u64,
    pub max_concurrent: usize,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            max_concurrent: MAX_CONCURRENT_FETCHES,
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    pub enabled: bool,
    pub directory: PathBuf,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: default_cache_root(),
        }
    }
}

/// `[raster]` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterSettings {
    /// Overrides the provider's color mode
    pub color_mode: Option<ColorMode>,
}

impl ConfigFile {
    /// Builds the provider configuration from `[provider]`.
    ///
    /// # Errors
    ///
    /// [`ConfigFileError::MissingValue`] when the selected provider needs a
    /// key that is not set.
    pub fn provider_config(&self) -> Result<ProviderConfig, ConfigFileError> {
        let p = &self.provider;
        let config = match p.provider_type.as_str() {
            "osm" => ProviderConfig::Osm,
            "google" => ProviderConfig::Google {
                style: p.style.clone().unwrap_or_else(|| "street".to_string()),
                url: p.url.clone(),
            },
            "mapbox" => ProviderConfig::Mapbox {
                access_token: required(&p.access_token, "access_token", "mapbox")?,
                map_id: required(&p.map_id, "map_id", "mapbox")?,
            },
            "mapbox_style" => ProviderConfig::MapboxStyle {
                access_token: required(&p.access_token, "access_token", "mapbox_style")?,
                username: required(&p.username, "username", "mapbox_style")?,
                map_id: required(&p.map_id, "map_id", "mapbox_style")?,
            },
            "quadtree" => ProviderConfig::Quadtree,
            "azure" => ProviderConfig::Azure {
                subscription_key: required(&p.api_key, "api_key", "azure")?,
                tileset_id: p.tileset_id.clone(),
                api_version: p.api_version.clone(),
            },
            "ordnance_survey" => ProviderConfig::OrdnanceSurvey {
                api_key: required(&p.api_key, "api_key", "ordnance_survey")?,
                layer: p.layer.clone().unwrap_or_else(|| "Road".to_string()),
            },
            "custom" => ProviderConfig::Custom {
                name: p.name.clone().unwrap_or_else(|| "custom".to_string()),
                url: required(&p.url, "url", "custom")?,
            },
            other => {
                return Err(ConfigFileError::InvalidValue {
                    section: "provider".to_string(),
                    key: "type".to_string(),
                    value: other.to_string(),
                    reason: format!("must be one of: {}", VALID_PROVIDER_TYPES.join(", ")),
                })
            }
        };
        Ok(config)
    }

    /// Builds the service configuration from `[download]`, `[cache]`,
    /// `[raster]` and the axis keys of `[provider]`.
    pub fn service_config(&self) -> ServiceConfig {
        let mut config = ServiceConfig::default()
            .with_user_agent(self.download.user_agent.clone())
            .with_timeout(Duration::from_secs(self.download.timeout))
            .with_max_concurrent(self.download.max_concurrent)
            .with_y_axis(self.provider.y_axis);

        config = if self.cache.enabled {
            config.with_cache_dir(self.cache.directory.clone())
        } else {
            config.without_cache()
        };
        if let Some(mode) = self.raster.color_mode {
            config = config.with_color_mode(mode);
        }
        if let Some(addressing) = self.provider.addressing {
            config = config.with_addressing(addressing);
        }
        config
    }
}

fn required(
    value: &Option<String>,
    key: &str,
    provider_type: &str,
) -> Result<String, ConfigFileError> {
    value
        .clone()
        .ok_or_else(|| ConfigFileError::MissingValue {
            section: "provider".to_string(),
            key: key.to_string(),
            reason: format!("required when type = {}", provider_type),
        })
}

//! Provider factory for centralized provider creation.
//!
//! Turns a [`ProviderConfig`] (usually read from the config file or the
//! command line) into a shared provider trait object.

use std::sync::Arc;

use super::azure::AzureMapsProvider;
use super::google::{GoogleStyle, GoogleTilesProvider};
use super::mapbox::{MapboxProvider, MapboxStyleProvider};
use super::ordnance::{OrdnanceSurveyProvider, OsLayer};
use super::osm::OsmProvider;
use super::quadtree::QuadtreeProvider;
use super::template::TemplateProvider;
use super::types::{Provider, ProviderError};

/// Configuration for creating a provider.
///
/// # Example
///
/// ```
/// use tilestitch::provider::{ProviderConfig, ProviderFactory};
///
/// let provider = ProviderFactory::create(&ProviderConfig::Osm).unwrap();
/// assert_eq!(provider.name(), "OpenStreetMap");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProviderConfig {
    /// OpenStreetMap standard layer. No key required.
    #[default]
    Osm,

    /// Google map layers, or any XYZ endpoint given as `url`.
    Google {
        /// One of `street`, `satellite`, `terrain`, `only_streets`
        style: String,
        /// Custom URL template
        url: Option<String>,
    },

    /// Mapbox-hosted style.
    Mapbox {
        access_token: String,
        map_id: String,
    },

    /// User-defined Mapbox Studio style.
    MapboxStyle {
        access_token: String,
        username: String,
        map_id: String,
    },

    /// Quadkey-addressed composition tiles.
    Quadtree,

    /// Azure Maps render tiles.
    Azure {
        subscription_key: String,
        tileset_id: Option<String>,
        api_version: Option<String>,
    },

    /// Ordnance Survey WMTS.
    OrdnanceSurvey {
        api_key: String,
        /// One of `Outdoor`, `Road`, `Light`, `Night`, `Leisure`
        layer: String,
    },

    /// Arbitrary URL template with `{x}/{y}/{z}` or `{quadkey}`.
    Custom { name: String, url: String },
}

impl ProviderConfig {
    /// Short type name, as written in the `[provider] type` config key.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Osm => "osm",
            Self::Google { .. } => "google",
            Self::Mapbox { .. } => "mapbox",
            Self::MapboxStyle { .. } => "mapbox_style",
            Self::Quadtree => "quadtree",
            Self::Azure { .. } => "azure",
            Self::OrdnanceSurvey { .. } => "ordnance_survey",
            Self::Custom { .. } => "custom",
        }
    }

    /// Returns whether this provider requires an API key or access token.
    pub fn requires_api_key(&self) -> bool {
        matches!(
            self,
            Self::Mapbox { .. }
                | Self::MapboxStyle { .. }
                | Self::Azure { .. }
                | Self::OrdnanceSurvey { .. }
        )
    }
}

/// Factory for creating provider instances.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown styles or layers, empty credentials, and
    /// templates without coordinate placeholders.
    pub fn create(config: &ProviderConfig) -> Result<Arc<dyn Provider>, ProviderError> {
        match config {
            ProviderConfig::Osm => Ok(Arc::new(OsmProvider::new())),
            ProviderConfig::Google { style, url } => {
                let mut provider = GoogleTilesProvider::new(style.parse::<GoogleStyle>()?);
                if let Some(url) = url {
                    provider = provider.with_url(url.clone());
                }
                Ok(Arc::new(provider))
            }
            ProviderConfig::Mapbox {
                access_token,
                map_id,
            } => {
                require("access_token", access_token)?;
                require("map_id", map_id)?;
                Ok(Arc::new(MapboxProvider::new(access_token, map_id)))
            }
            ProviderConfig::MapboxStyle {
                access_token,
                username,
                map_id,
            } => {
                require("access_token", access_token)?;
                require("username", username)?;
                require("map_id", map_id)?;
                Ok(Arc::new(MapboxStyleProvider::new(
                    access_token,
                    username,
                    map_id,
                )))
            }
            ProviderConfig::Quadtree => Ok(Arc::new(QuadtreeProvider::new())),
            ProviderConfig::Azure {
                subscription_key,
                tileset_id,
                api_version,
            } => {
                require("api_key", subscription_key)?;
                let mut provider = AzureMapsProvider::new(subscription_key);
                if let Some(tileset_id) = tileset_id {
                    provider = provider.with_tileset(tileset_id);
                }
                if let Some(api_version) = api_version {
                    provider = provider.with_api_version(api_version);
                }
                Ok(Arc::new(provider))
            }
            ProviderConfig::OrdnanceSurvey { api_key, layer } => {
                require("api_key", api_key)?;
                let layer = layer.parse::<OsLayer>()?;
                Ok(Arc::new(OrdnanceSurveyProvider::new(api_key, layer)))
            }
            ProviderConfig::Custom { name, url } => {
                Ok(Arc::new(TemplateProvider::new(name.clone(), url.clone())?))
            }
        }
    }
}

fn require(setting: &str, value: &str) -> Result<(), ProviderError> {
    if value.trim().is_empty() {
        return Err(ProviderError::MissingSetting(setting.to_string()));
    }
    Ok(())
}

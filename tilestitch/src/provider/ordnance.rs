//! Ordnance Survey WMTS tiles in EPSG:3857.
//!
//! Requires an OS Data Hub API key. Layer styles are described at
//! <https://apidocs.os.uk/docs/map-styles>.

use std::str::FromStr;

use super::types::{xyz_of, Provider, ProviderError};
use crate::coord::TileId;

/// Ordnance Survey map style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OsLayer {
    Outdoor,
    #[default]
    Road,
    Light,
    Night,
    Leisure,
}

impl OsLayer {
    pub fn as_str(&self) -> &'static str {
        match self {
            OsLayer::Outdoor => "Outdoor",
            OsLayer::Road => "Road",
            OsLayer::Light => "Light",
            OsLayer::Night => "Night",
            OsLayer::Leisure => "Leisure",
        }
    }
}

impl FromStr for OsLayer {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "outdoor" => Ok(Self::Outdoor),
            "road" => Ok(Self::Road),
            "light" => Ok(Self::Light),
            "night" => Ok(Self::Night),
            "leisure" => Ok(Self::Leisure),
            _ => Err(ProviderError::InvalidStyle {
                style: s.to_string(),
                valid: "Outdoor, Road, Light, Night, Leisure".to_string(),
            }),
        }
    }
}

/// Ordnance Survey tiles for one layer.
#[derive(Debug, Clone)]
pub struct OrdnanceSurveyProvider {
    api_key: String,
    layer: OsLayer,
}

impl OrdnanceSurveyProvider {
    pub fn new(api_key: impl Into<String>, layer: OsLayer) -> Self {
        Self {
            api_key: api_key.into(),
            layer,
        }
    }

    pub fn layer(&self) -> OsLayer {
        self.layer
    }
}

impl Provider for OrdnanceSurveyProvider {
    fn url_for(&self, tile: &TileId) -> Result<String, ProviderError> {
        let c = xyz_of(tile);
        Ok(format!(
            "https://api2.ordnancesurvey.co.uk/mapping_api/v1/service/wmts?\
             key={}&height=256&width=256&tilematrixSet=EPSG%3A3857&\
             version=1.0.0&style=true&layer={}%203857&\
             SERVICE=WMTS&REQUEST=GetTile&format=image%2Fpng&\
             TileMatrix=EPSG%3A3857%3A{}&TileRow={}&TileCol={}",
            self.api_key,
            self.layer.as_str(),
            c.zoom,
            c.y,
            c.x
        ))
    }

    fn name(&self) -> &str {
        "Ordnance Survey"
    }

    fn identity(&self) -> String {
        format!("os-wmts/{}", self.layer.as_str())
    }
}

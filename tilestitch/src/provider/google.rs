//! Google-style XYZ tiles.
//!
//! The default endpoint serves the public Google map layers. Any other XYZ
//! server can be used by passing a URL template containing `{x}`, `{y}`,
//! `{z}` and optionally `{style}`, such as
//! `https://server.arcgisonline.com/ArcGIS/rest/services/World_Shaded_Relief/MapServer/tile/{z}/{y}/{x}.jpg`.

use std::str::FromStr;

use super::template::{fill, fill_tile};
use super::types::{Provider, ProviderError};
use crate::coord::TileId;

/// Default Google tile endpoint.
pub const GOOGLE_URL: &str =
    "https://mts0.google.com/vt/lyrs={style}@177000000&hl=en&src=api&x={x}&y={y}&z={z}&s=G";

/// Map layer served by Google.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GoogleStyle {
    #[default]
    Street,
    Satellite,
    Terrain,
    OnlyStreets,
}

impl GoogleStyle {
    /// Layer code used in the `lyrs` query parameter.
    pub fn code(&self) -> &'static str {
        match self {
            GoogleStyle::Street => "m",
            GoogleStyle::Satellite => "s",
            GoogleStyle::Terrain => "t",
            GoogleStyle::OnlyStreets => "h",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GoogleStyle::Street => "street",
            GoogleStyle::Satellite => "satellite",
            GoogleStyle::Terrain => "terrain",
            GoogleStyle::OnlyStreets => "only_streets",
        }
    }
}

impl FromStr for GoogleStyle {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "street" => Ok(Self::Street),
            "satellite" => Ok(Self::Satellite),
            "terrain" => Ok(Self::Terrain),
            "only_streets" => Ok(Self::OnlyStreets),
            _ => Err(ProviderError::InvalidStyle {
                style: s.to_string(),
                valid: "street, satellite, terrain, only_streets".to_string(),
            }),
        }
    }
}

/// Google (or Google-compatible) XYZ tiles.
#[derive(Debug, Clone)]
pub struct GoogleTilesProvider {
    style: GoogleStyle,
    url: String,
    name: String,
}

impl GoogleTilesProvider {
    /// Provider for one Google layer at the default endpoint.
    pub fn new(style: GoogleStyle) -> Self {
        Self {
            style,
            url: GOOGLE_URL.to_string(),
            name: format!("Google Tiles ({})", style.as_str()),
        }
    }

    /// Replaces the endpoint with a custom XYZ template.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn style(&self) -> GoogleStyle {
        self.style
    }
}

impl Default for GoogleTilesProvider {
    fn default() -> Self {
        Self::new(GoogleStyle::default())
    }
}

impl Provider for GoogleTilesProvider {
    fn url_for(&self, tile: &TileId) -> Result<String, ProviderError> {
        let styled = fill(&self.url, &[("style", self.style.code())]);
        fill_tile(&styled, tile)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn identity(&self) -> String {
        format!("{}#{}", self.url, self.style.code())
    }
}

//! OpenStreetMap standard tile layer.
//!
//! See <https://operations.osmfoundation.org/policies/tiles/> for the usage
//! policy; requests must carry an identifying `User-Agent`.

use super::types::{xyz_of, Provider, ProviderError};
use crate::coord::TileId;

const OSM_URL: &str = "https://a.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// OpenStreetMap raster tiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsmProvider;

impl OsmProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Provider for OsmProvider {
    fn url_for(&self, tile: &TileId) -> Result<String, ProviderError> {
        let c = xyz_of(tile);
        Ok(format!(
            "https://a.tile.openstreetmap.org/{}/{}/{}.png",
            c.zoom, c.x, c.y
        ))
    }

    fn name(&self) -> &str {
        "OpenStreetMap"
    }

    fn identity(&self) -> String {
        OSM_URL.to_string()
    }
}

//! Azure Maps render tiles (shared-key authentication).

use super::types::{xyz_of, Provider, ProviderError};
use crate::coord::TileId;

pub const DEFAULT_AZURE_TILESET: &str = "microsoft.imagery";
pub const DEFAULT_AZURE_API_VERSION: &str = "2.0";

/// Azure Maps tiles for one tileset.
#[derive(Debug, Clone)]
pub struct AzureMapsProvider {
    subscription_key: String,
    tileset_id: String,
    api_version: String,
}

impl AzureMapsProvider {
    /// Imagery tileset at the default API version.
    pub fn new(subscription_key: impl Into<String>) -> Self {
        Self {
            subscription_key: subscription_key.into(),
            tileset_id: DEFAULT_AZURE_TILESET.to_string(),
            api_version: DEFAULT_AZURE_API_VERSION.to_string(),
        }
    }

    pub fn with_tileset(mut self, tileset_id: impl Into<String>) -> Self {
        self.tileset_id = tileset_id.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }
}

impl Provider for AzureMapsProvider {
    fn url_for(&self, tile: &TileId) -> Result<String, ProviderError> {
        let c = xyz_of(tile);
        Ok(format!(
            "https://atlas.microsoft.com/map/tile?api-version={}&tilesetId={}&x={}&y={}&zoom={}&subscription-key={}",
            self.api_version, self.tileset_id, c.x, c.y, c.zoom, self.subscription_key
        ))
    }

    fn name(&self) -> &str {
        "Azure Maps"
    }

    fn identity(&self) -> String {
        format!("{}@{}", self.tileset_id, self.api_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TileCoord;

    #[test]
    fn test_url() {
        let provider = AzureMapsProvider::new("key").with_tileset("microsoft.base.road");
        let tile = TileId::Cartesian(TileCoord::new(4, 6, 5).unwrap());
        assert_eq!(
            provider.url_for(&tile).unwrap(),
            "https://atlas.microsoft.com/map/tile?api-version=2.0&tilesetId=microsoft.base.road&x=4&y=6&zoom=5&subscription-key=key"
        );
    }
}

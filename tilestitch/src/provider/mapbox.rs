//! Mapbox raster tiles.
//!
//! Both providers need an access token; see
//! <https://docs.mapbox.com/api/maps/styles/> for map ids.

use super::types::{xyz_of, Provider, ProviderError};
use crate::coord::TileId;

/// Tiles of a Mapbox-hosted style such as `streets-v11` or `satellite-v9`.
#[derive(Debug, Clone)]
pub struct MapboxProvider {
    access_token: String,
    map_id: String,
}

impl MapboxProvider {
    pub fn new(access_token: impl Into<String>, map_id: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            map_id: map_id.into(),
        }
    }
}

impl Provider for MapboxProvider {
    fn url_for(&self, tile: &TileId) -> Result<String, ProviderError> {
        let c = xyz_of(tile);
        Ok(format!(
            "https://api.mapbox.com/styles/v1/mapbox/{}/tiles/256/{}/{}/{}?access_token={}",
            self.map_id, c.zoom, c.x, c.y, self.access_token
        ))
    }

    fn name(&self) -> &str {
        "Mapbox"
    }

    fn identity(&self) -> String {
        format!("mapbox/{}", self.map_id)
    }
}

/// Tiles of a user-defined Mapbox Studio style.
#[derive(Debug, Clone)]
pub struct MapboxStyleProvider {
    access_token: String,
    username: String,
    map_id: String,
}

impl MapboxStyleProvider {
    pub fn new(
        access_token: impl Into<String>,
        username: impl Into<String>,
        map_id: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            username: username.into(),
            map_id: map_id.into(),
        }
    }
}

impl Provider for MapboxStyleProvider {
    fn url_for(&self, tile: &TileId) -> Result<String, ProviderError> {
        let c = xyz_of(tile);
        Ok(format!(
            "https://api.mapbox.com/styles/v1/{}/{}/tiles/256/{}/{}/{}?access_token={}",
            self.username, self.map_id, c.zoom, c.x, c.y, self.access_token
        ))
    }

    fn name(&self) -> &str {
        "Mapbox Style"
    }

    fn identity(&self) -> String {
        format!("{}/{}", self.username, self.map_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TileCoord;

    #[test]
    fn test_mapbox_url() {
        let provider = MapboxProvider::new("tok", "satellite-v9");
        let tile = TileId::Cartesian(TileCoord::new(1, 2, 3).unwrap());
        assert_eq!(
            provider.url_for(&tile).unwrap(),
            "https://api.mapbox.com/styles/v1/mapbox/satellite-v9/tiles/256/3/1/2?access_token=tok"
        );
    }

    #[test]
    fn test_urls_request_the_advertised_tile_size() {
        let tile = TileId::Cartesian(TileCoord::new(0, 0, 1).unwrap());
        let providers: [&dyn Provider; 2] = [
            &MapboxProvider::new("tok", "streets-v11"),
            &MapboxStyleProvider::new("tok", "alice", "abc123"),
        ];
        for provider in providers {
            let segment = format!("/tiles/{}/", provider.tile_size());
            assert!(provider.url_for(&tile).unwrap().contains(&segment));
        }
    }

    #[test]
    fn test_mapbox_style_url() {
        let provider = MapboxStyleProvider::new("tok", "alice", "abc123");
        let tile = TileId::Cartesian(TileCoord::new(1, 2, 3).unwrap());
        assert_eq!(
            provider.url_for(&tile).unwrap(),
            "https://api.mapbox.com/styles/v1/alice/abc123/tiles/256/3/1/2?access_token=tok"
        );
    }

    #[test]
    fn test_token_not_in_namespace_identity() {
        let a = MapboxProvider::new("token-a", "streets-v11");
        let b = MapboxProvider::new("token-b", "streets-v11");
        assert_eq!(a.cache_namespace(), b.cache_namespace());
    }
}

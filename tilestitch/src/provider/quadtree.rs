//! Quadkey-addressed composition tiles (Microsoft tile system).

use super::types::{quadkey_of, Provider, ProviderError};
use crate::coord::{Addressing, TileId};

/// Virtual Earth composition endpoint, addressed by quadkey.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadtreeProvider;

impl QuadtreeProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Provider for QuadtreeProvider {
    fn url_for(&self, tile: &TileId) -> Result<String, ProviderError> {
        let quadkey = quadkey_of(tile)?;
        Ok(format!(
            "http://ecn.dynamic.t1.tiles.virtualearth.net/comp/CompositionHandler/{}?mkt=en-gb&it=A,G,L&shading=hill&n=z",
            quadkey
        ))
    }

    fn name(&self) -> &str {
        "Quadtree"
    }

    fn identity(&self) -> String {
        "virtualearth/comp".to_string()
    }

    fn addressing(&self) -> Addressing {
        Addressing::Quadkey
    }
}

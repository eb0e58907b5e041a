//! Provider types and traits

use std::fmt;

use sha2::{Digest, Sha256};

use crate::coord::{
    cartesian_to_quadkey, quadkey_to_tile, Addressing, Origin, Quadkey, TileCoord, TileId, YAxis,
};
use crate::raster::ColorMode;

/// Nominal edge length of a web map tile, in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Errors that can occur during provider operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// HTTP request failed
    HttpError(String),
    /// Style or layer name not offered by the provider
    InvalidStyle { style: String, valid: String },
    /// URL template lacks the placeholders needed for its addressing
    InvalidTemplate(String),
    /// Tile cannot be expressed in the provider's addressing
    UnsupportedTile(String),
    /// A required credential or setting is missing
    MissingSetting(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::InvalidStyle { style, valid } => {
                write!(f, "Invalid style '{}'. Valid styles: {}", style, valid)
            }
            ProviderError::InvalidTemplate(msg) => write!(f, "Invalid URL template: {}", msg),
            ProviderError::UnsupportedTile(tile) => {
                write!(f, "Tile {} not supported by provider", tile)
            }
            ProviderError::MissingSetting(name) => write!(f, "Missing provider setting: {}", name),
        }
    }
}

impl std::error::Error for ProviderError {}

/// A web tile source.
///
/// Providers only build URLs; downloading is done by the fetcher through an
/// [`AsyncHttpClient`](super::AsyncHttpClient). Credentials and styles are
/// baked into the URL.
pub trait Provider: Send + Sync {
    /// URL of one tile image.
    fn url_for(&self, tile: &TileId) -> Result<String, ProviderError>;

    /// Human readable provider name.
    fn name(&self) -> &str;

    /// Stable description of what the provider serves (template and style,
    /// never secrets). Feeds [`cache_namespace`](Self::cache_namespace).
    fn identity(&self) -> String;

    /// Addressing scheme the provider's URLs use.
    fn addressing(&self) -> Addressing {
        Addressing::Xyz
    }

    /// Edge length of a tile image in pixels.
    fn tile_size(&self) -> u32 {
        DEFAULT_TILE_SIZE
    }

    /// Color mode tiles are normalized to.
    fn color_mode(&self) -> ColorMode {
        ColorMode::Rgb
    }

    /// Row order of the decoded wire images. Web tiles are north-up.
    fn wire_origin(&self) -> Origin {
        Origin::Upper
    }

    /// Cache directory name: name slug plus a short digest of the identity,
    /// so two styles of one provider never share entries.
    fn cache_namespace(&self) -> String {
        let digest = Sha256::digest(self.identity().as_bytes());
        let short: String = digest[..4].iter().map(|b| format!("{:02x}", b)).collect();
        format!("{}-{}", slug(self.name()), short)
    }
}

/// Cartesian coordinates of a tile, converting quadkeys.
pub fn xyz_of(tile: &TileId) -> TileCoord {
    match tile {
        TileId::Cartesian(coord) => *coord,
        TileId::Quadkey(quadkey) => quadkey_to_tile(quadkey, YAxis::NorthOrigin),
    }
}

/// Quadkey of a tile, converting cartesian coordinates.
pub fn quadkey_of(tile: &TileId) -> Result<Quadkey, ProviderError> {
    match tile {
        TileId::Quadkey(quadkey) => Ok(quadkey.clone()),
        TileId::Cartesian(coord) => cartesian_to_quadkey(coord, YAxis::NorthOrigin)
            .map_err(|e| ProviderError::UnsupportedTile(format!("{} ({})", coord, e))),
    }
}

fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

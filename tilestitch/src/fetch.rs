//! Tile resolution: cache lookup, download, decode, persist.
//!
//! [`TileFetcher::resolve`] never fails for routine download problems (HTTP
//! errors, timeouts, DNS failures). Those degrade to a light-grey placeholder
//! so one missing tile does not block its neighbours. Cache I/O failures,
//! corrupt cache entries and undecodable response bodies are returned as
//! [`FetchError`] and cause the orchestrator to drop the tile.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{CacheError, TileCache};
use crate::coord::{Origin, TileGrid, TileId};
use crate::orchestrator::TileResolver;
use crate::provider::{AsyncHttpClient, Provider, ProviderError};
use crate::raster::{decode_tile, placeholder, ColorMode, RasterError, TileRaster};

/// Errors that make a single tile unresolvable.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Reading or writing the tile cache failed.
    #[error("Tile cache error: {0}")]
    Cache(#[from] CacheError),

    /// The provider cannot build a URL for the tile.
    #[error("Cannot address tile: {0}")]
    Address(#[from] ProviderError),

    /// The response body is not a decodable image.
    #[error("{0}")]
    Decode(#[from] RasterError),

    /// The blocking decode task panicked or was cancelled.
    #[error("Decode task failed: {0}")]
    Task(String),
}

/// Resolves tile identifiers to rasters for one provider.
///
/// Returned rasters are always canonicalized to [`Origin::Lower`] (first row
/// at the minimum y of the tile's extent), and so are the persisted grids.
pub struct TileFetcher<C> {
    provider: Arc<dyn Provider>,
    http: C,
    grid: TileGrid,
    cache: Option<TileCache>,
    color_mode: ColorMode,
}

impl<C: AsyncHttpClient> TileFetcher<C> {
    /// Creates an uncached fetcher using the provider's color mode.
    pub fn new(provider: Arc<dyn Provider>, http: C, grid: TileGrid) -> Self {
        let color_mode = provider.color_mode();
        Self {
            provider,
            http,
            grid,
            cache: None,
            color_mode,
        }
    }

    /// Enables the persistent cache.
    pub fn with_cache(mut self, cache: TileCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Overrides the color mode rasters are normalized to.
    pub fn with_color_mode(mut self, color_mode: ColorMode) -> Self {
        self.color_mode = color_mode;
        self
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn cache(&self) -> Option<&TileCache> {
        self.cache.as_ref()
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Resolves one tile to its raster and bounding box.
    pub async fn resolve(&self, tile: &TileId) -> Result<TileRaster, FetchError> {
        let extent = self.grid.bounding_box(tile);

        if let Some(cache) = &self.cache {
            match cache.get(tile).await? {
                Some(pixels) if pixels.mode() == self.color_mode => {
                    debug!(tile = %tile, "Cache hit");
                    return Ok(TileRaster::new(pixels, extent, Origin::Lower));
                }
                Some(pixels) => {
                    debug!(
                        tile = %tile,
                        cached = %pixels.mode(),
                        wanted = %self.color_mode,
                        "Cached color mode differs, refetching"
                    );
                }
                None => debug!(tile = %tile, "Cache miss"),
            }
        }

        let url = self.provider.url_for(tile)?;
        let bytes = match self.http.get(&url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(tile = %tile, url = %url, error = %e, "Tile download failed, using placeholder");
                let pixels = placeholder(self.provider.tile_size(), self.color_mode);
                return Ok(TileRaster::new(pixels, extent, Origin::Lower));
            }
        };

        let mode = self.color_mode;
        let mut pixels = tokio::task::spawn_blocking(move || decode_tile(&bytes, mode))
            .await
            .map_err(|e| FetchError::Task(e.to_string()))??;
        if self.provider.wire_origin() == Origin::Upper {
            pixels.flip_rows();
        }

        if let Some(cache) = &self.cache {
            cache.put(tile, &pixels).await?;
        }

        Ok(TileRaster::new(pixels, extent, Origin::Lower))
    }
}

impl<C: AsyncHttpClient + 'static> TileResolver for TileFetcher<C> {
    async fn resolve(&self, tile: &TileId) -> Result<TileRaster, FetchError> {
        TileFetcher::resolve(self, tile).await
    }
}

//! Tilestitch service facade implementation.

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::config::ServiceConfig;
use super::error::ServiceError;
use crate::cache::TileCache;
use crate::coord::{TileGrid, TileId};
use crate::domain::{Domain, DomainTileFinder, FindTiles};
use crate::fetch::TileFetcher;
use crate::mosaic::{merge, Mosaic, TileSample};
use crate::orchestrator::{FetchOrchestrator, FetchStats};
use crate::provider::{AsyncHttpClient, AsyncReqwestClient, Provider, ProviderConfig, ProviderFactory};

/// High-level facade: region of interest in, one merged raster out.
///
/// Wires the tile finder, the cached fetcher and the orchestrator for one
/// provider. The cache index lives as long as the service, so repeated
/// queries over the same region are served from disk.
///
/// # Example
///
/// ```no_run
/// use tilestitch::coord::WebMercator;
/// use tilestitch::domain::Domain;
/// use tilestitch::provider::OsmProvider;
/// use tilestitch::service::{ServiceConfig, TileService};
/// use std::sync::Arc;
///
/// let service = TileService::new(Arc::new(OsmProvider), ServiceConfig::default())?;
/// let domain = Domain::from_lon_lat_bounds(&WebMercator, -0.2, 51.4, 0.0, 51.6);
/// let mosaic = service.image_for_domain_blocking(&domain, 12)?;
/// println!("{}x{} pixels", mosaic.width(), mosaic.height());
/// # Ok::<(), tilestitch::service::ServiceError>(())
/// ```
pub struct TileService<C = AsyncReqwestClient> {
    config: ServiceConfig,
    finder: DomainTileFinder,
    orchestrator: FetchOrchestrator<TileFetcher<C>>,
}

impl TileService<AsyncReqwestClient> {
    /// Creates a service that downloads with reqwest.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built or the cache directory cannot
    /// be created.
    pub fn new(provider: Arc<dyn Provider>, config: ServiceConfig) -> Result<Self, ServiceError> {
        let http = AsyncReqwestClient::new(config.user_agent(), config.timeout())?;
        Self::with_http_client(provider, http, config)
    }

    /// Creates the provider described by `provider_config` and a service for it.
    pub fn from_provider_config(
        provider_config: &ProviderConfig,
        config: ServiceConfig,
    ) -> Result<Self, ServiceError> {
        let provider = ProviderFactory::create(provider_config)?;
        Self::new(provider, config)
    }
}

impl<C: AsyncHttpClient + 'static> TileService<C> {
    /// Creates a service with a caller-supplied HTTP client.
    pub fn with_http_client(
        provider: Arc<dyn Provider>,
        http: C,
        config: ServiceConfig,
    ) -> Result<Self, ServiceError> {
        let grid = TileGrid::web_mercator().with_y_axis(config.y_axis());
        let addressing = config.addressing().unwrap_or_else(|| provider.addressing());
        let color_mode = config.color_mode().unwrap_or_else(|| provider.color_mode());

        let mut fetcher =
            TileFetcher::new(Arc::clone(&provider), http, grid).with_color_mode(color_mode);
        if config.cache_enabled() {
            let root = config.resolved_cache_directory();
            let cache = TileCache::open(&root, &provider.cache_namespace())?;
            fetcher = fetcher.with_cache(cache);
        }

        info!(
            provider = provider.name(),
            addressing = %addressing,
            color_mode = %color_mode,
            cache = config.cache_enabled(),
            max_concurrent = config.max_concurrent(),
            "Tile service ready"
        );

        Ok(Self {
            finder: DomainTileFinder::new(grid, addressing),
            orchestrator: FetchOrchestrator::new(Arc::new(fetcher))
                .with_max_concurrent(config.max_concurrent()),
            config,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        self.orchestrator.resolver().provider()
    }

    pub fn finder(&self) -> &DomainTileFinder {
        &self.finder
    }

    /// The persistent cache, when enabled.
    pub fn cache(&self) -> Option<&TileCache> {
        self.orchestrator.resolver().cache()
    }

    /// Lazily discovers the tiles covering `domain` at `zoom`.
    pub fn find_tiles<'a>(
        &self,
        domain: &'a Domain,
        zoom: u8,
    ) -> Result<FindTiles<'a>, ServiceError> {
        Ok(self.finder.find(domain, zoom)?)
    }

    /// Fetches every tile covering `domain` and merges them.
    ///
    /// Tiles that fail are left out, leaving holes in the mosaic's coverage
    /// mask. Fails only when nothing could be fetched at all.
    pub async fn image_for_domain(&self, domain: &Domain, zoom: u8) -> Result<Mosaic, ServiceError> {
        self.run(domain, zoom, None).await
    }

    /// Like [`image_for_domain`](Self::image_for_domain), stopping early when
    /// `cancel` fires. Tiles completed before cancellation are still merged.
    pub async fn image_for_domain_cancellable(
        &self,
        domain: &Domain,
        zoom: u8,
        cancel: CancellationToken,
    ) -> Result<Mosaic, ServiceError> {
        self.run(domain, zoom, Some(cancel)).await
    }

    /// Blocking variant for synchronous callers.
    ///
    /// Builds a private runtime, so it must not be called from within an
    /// async context.
    pub fn image_for_domain_blocking(&self, domain: &Domain, zoom: u8) -> Result<Mosaic, ServiceError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(ServiceError::Runtime)?;
        runtime.block_on(self.image_for_domain(domain, zoom))
    }

    async fn run(
        &self,
        domain: &Domain,
        zoom: u8,
        cancel: Option<CancellationToken>,
    ) -> Result<Mosaic, ServiceError> {
        let tiles: Vec<TileId> = self.find_tiles(domain, zoom)?.collect();
        if tiles.is_empty() {
            return Err(ServiceError::EmptyDomain { zoom });
        }
        info!(zoom, tiles = tiles.len(), "Fetching domain");

        let (samples, stats) = self.orchestrator.fetch_with_stats(tiles, cancel).await;
        if samples.is_empty() {
            return Err(empty_result(&stats));
        }

        let (samples, odd_sized) = retain_dominant_size(samples);
        let mosaic = merge(&samples)?;
        info!(
            width = mosaic.width(),
            height = mosaic.height(),
            resolved = stats.resolved,
            dropped = stats.dropped + odd_sized,
            coverage = %format!("{:.1}%", mosaic.coverage_ratio() * 100.0),
            "Domain mosaic assembled"
        );
        Ok(mosaic)
    }
}

/// Keeps the tiles sharing the most common pixel size.
///
/// A placeholder sized by the provider's nominal tile size cannot be placed
/// among tiles the server delivered at another size; it is dropped so the
/// rest still merge. Ties go to the larger size. Returns the kept tiles and
/// how many were dropped.
fn retain_dominant_size(samples: Vec<TileSample>) -> (Vec<TileSample>, usize) {
    let mut counts: HashMap<(u32, u32), usize> = HashMap::new();
    for sample in &samples {
        *counts
            .entry((sample.pixels.width(), sample.pixels.height()))
            .or_default() += 1;
    }
    let Some(dominant) = counts
        .into_iter()
        .max_by_key(|&(size, count)| (count, size))
        .map(|(size, _)| size)
    else {
        return (samples, 0);
    };

    let before = samples.len();
    let kept: Vec<TileSample> = samples
        .into_iter()
        .filter(|sample| {
            let size = (sample.pixels.width(), sample.pixels.height());
            if size != dominant {
                warn!(
                    width = size.0,
                    height = size.1,
                    expected_width = dominant.0,
                    expected_height = dominant.1,
                    "Dropping tile whose size differs from its neighbours"
                );
            }
            size == dominant
        })
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

fn empty_result(stats: &FetchStats) -> ServiceError {
    if stats.cancelled {
        ServiceError::Cancelled
    } else {
        ServiceError::NothingResolved {
            requested: stats.requested,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{Addressing, Origin};
    use crate::provider::{MockAsyncHttpClient, OsmProvider, QuadtreeProvider};
    use crate::raster::ColorMode;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn png(size: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(size, size, Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn service(http: MockAsyncHttpClient, config: ServiceConfig) -> TileService<MockAsyncHttpClient> {
        TileService::with_http_client(Arc::new(OsmProvider), http, config).unwrap()
    }

    fn world() -> Domain {
        Domain::from_extent(&TileGrid::web_mercator().root_extent())
    }

    #[tokio::test]
    async fn test_world_at_zoom_one() {
        let service = service(MockAsyncHttpClient::new(png(8)), ServiceConfig::default().without_cache());
        let mosaic = service.image_for_domain(&world(), 1).await.unwrap();

        assert_eq!((mosaic.width(), mosaic.height()), (15, 15));
        assert_eq!(*mosaic.extent(), TileGrid::web_mercator().root_extent());
        assert_eq!(mosaic.origin(), Origin::Lower);
        assert!(mosaic.is_complete());
        assert_eq!(mosaic.pixels().pixel(7, 7), &[10, 20, 30]);
    }

    #[tokio::test]
    async fn test_failed_tiles_fall_back_to_placeholder() {
        let http = MockAsyncHttpClient::new(png(256)).fail_on("/1/0/0.png");
        let service = service(http, ServiceConfig::default().without_cache());
        let mosaic = service.image_for_domain(&world(), 1).await.unwrap();

        // Placeholders fill the gap, so coverage stays complete.
        assert!(mosaic.is_complete());
        // NW tile sits in the top-left, i.e. the last rows of a Lower mosaic.
        let top = mosaic.height() - 1;
        assert_eq!(mosaic.pixels().pixel(0, top), &[250, 250, 250]);
        assert_eq!(mosaic.pixels().pixel(mosaic.width() - 1, 0), &[10, 20, 30]);
    }

    #[tokio::test]
    async fn test_placeholder_smaller_than_served_tiles_is_dropped() {
        // Server delivers 512px tiles while the provider advertises 256.
        let http = MockAsyncHttpClient::new(png(512)).fail_on("/1/1/1.png");
        let service = service(http, ServiceConfig::default().without_cache());
        let mosaic = service.image_for_domain(&world(), 1).await.unwrap();

        assert_eq!((mosaic.width(), mosaic.height()), (1023, 1023));
        assert!(!mosaic.is_complete());
        // SE tile is the bottom-right, i.e. the first rows of a Lower mosaic.
        assert_eq!(mosaic.coverage().get_pixel(mosaic.width() - 1, 0).0, [0]);
        assert_eq!(mosaic.pixels().pixel(0, 0), &[10, 20, 30]);
    }

    #[test]
    fn test_retain_dominant_size() {
        let grid = TileGrid::web_mercator();
        let sample = |x: u32, size: u32| {
            let id = TileId::Cartesian(crate::coord::TileCoord::new(x, 0, 1).unwrap());
            TileSample::from_raster(crate::raster::TileRaster::new(
                crate::raster::PixelGrid::filled(size, size, ColorMode::Rgb, [0, 0, 0, 0]),
                grid.bounding_box(&id),
                Origin::Lower,
            ))
        };

        let (kept, dropped) = retain_dominant_size(vec![sample(0, 8), sample(1, 4), sample(0, 8)]);
        assert_eq!(dropped, 1);
        assert!(kept.iter().all(|s| s.pixels.width() == 8));

        // Ties keep the larger size.
        let (kept, dropped) = retain_dominant_size(vec![sample(0, 4), sample(1, 8)]);
        assert_eq!(dropped, 1);
        assert_eq!(kept[0].pixels.width(), 8);
    }

    #[tokio::test]
    async fn test_undecodable_tile_leaves_hole() {
        let http = MockAsyncHttpClient::new(b"not a png".to_vec());
        let service = service(http, ServiceConfig::default().without_cache());
        let result = service.image_for_domain(&world(), 1).await;
        assert!(matches!(
            result,
            Err(ServiceError::NothingResolved { requested: 4 })
        ));
    }

    #[tokio::test]
    async fn test_disjoint_domain_is_empty() {
        let service = service(MockAsyncHttpClient::new(png(8)), ServiceConfig::default().without_cache());
        let far_away = Domain::from_bounds(1.0e9, 1.0e9, 2.0e9, 2.0e9);
        assert!(matches!(
            service.image_for_domain(&far_away, 3).await,
            Err(ServiceError::EmptyDomain { zoom: 3 })
        ));
    }

    #[tokio::test]
    async fn test_repeated_query_served_from_cache() {
        let temp = TempDir::new().unwrap();
        let http = MockAsyncHttpClient::new(png(8));
        let service = service(
            http.clone(),
            ServiceConfig::default().with_cache_dir(temp.path()),
        );

        service.image_for_domain(&world(), 1).await.unwrap();
        service.image_for_domain(&world(), 1).await.unwrap();

        assert_eq!(http.fetches(), 4);
        assert_eq!(service.cache().map(|c| c.len()), Some(4));
    }

    #[test]
    fn test_unusable_cache_dir_is_fatal() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file");
        std::fs::write(&file, b"x").unwrap();

        let result = TileService::with_http_client(
            Arc::new(OsmProvider),
            MockAsyncHttpClient::new(Vec::new()),
            ServiceConfig::default().with_cache_dir(&file),
        );
        assert!(matches!(result, Err(ServiceError::Cache(_))));
    }

    #[test]
    fn test_provider_metadata_drives_discovery() {
        let service = TileService::with_http_client(
            Arc::new(QuadtreeProvider),
            MockAsyncHttpClient::new(Vec::new()),
            ServiceConfig::default().without_cache(),
        )
        .unwrap();
        assert_eq!(service.finder().addressing(), Addressing::Quadkey);
        assert!(matches!(
            service.find_tiles(&world(), 0),
            Err(ServiceError::Domain(_))
        ));
        assert_eq!(service.find_tiles(&world(), 1).unwrap().count(), 4);
    }

    #[test]
    fn test_color_mode_override() {
        let service = service(
            MockAsyncHttpClient::new(Vec::new()),
            ServiceConfig::default()
                .without_cache()
                .with_color_mode(ColorMode::Luma),
        );
        assert_eq!(
            service.orchestrator.resolver().color_mode(),
            ColorMode::Luma
        );
    }

    #[test]
    fn test_blocking_variant() {
        let service = service(MockAsyncHttpClient::new(png(4)), ServiceConfig::default().without_cache());
        let mosaic = service.image_for_domain_blocking(&world(), 0).unwrap();
        assert_eq!((mosaic.width(), mosaic.height()), (4, 4));
    }
}

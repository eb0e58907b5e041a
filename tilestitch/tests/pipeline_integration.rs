//! End-to-end tests for discovery, fetching, caching and stitching.
//!
//! No network access: tiles are served by an in-memory HTTP client that
//! counts requests.
//!
//! Run with: `cargo test --test pipeline_integration`

use std::collections::HashSet;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;

use tilestitch::coord::{Addressing, Origin, TileCoord, TileGrid, TileId, WebMercator};
use tilestitch::domain::{Domain, DomainTileFinder};
use tilestitch::mosaic::{merge, TileSample};
use tilestitch::provider::{AsyncHttpClient, OsmProvider, ProviderError};
use tilestitch::raster::{ColorMode, PixelGrid, TileRaster};
use tilestitch::{ServiceConfig, ServiceError, TileService};

// ============================================================================
// Helpers
// ============================================================================

/// Serves one PNG for every URL. URLs containing `broken` get a non-image
/// body and URLs containing `missing` get an HTTP error.
#[derive(Clone)]
struct CountingClient {
    body: Vec<u8>,
    broken: Option<String>,
    missing: Option<String>,
    requests: Arc<AtomicUsize>,
}

impl CountingClient {
    fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            broken: None,
            missing: None,
            requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn with_broken(mut self, fragment: &str) -> Self {
        self.broken = Some(fragment.to_string());
        self
    }

    fn with_missing(mut self, fragment: &str) -> Self {
        self.missing = Some(fragment.to_string());
        self
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl AsyncHttpClient for CountingClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if matches!(&self.missing, Some(fragment) if url.contains(fragment.as_str())) {
            return Err(ProviderError::HttpError(format!("HTTP 404 Not Found from {}", url)));
        }
        match &self.broken {
            Some(fragment) if url.contains(fragment.as_str()) => Ok(b"<html>oops</html>".to_vec()),
            _ => Ok(self.body.clone()),
        }
    }
}

fn png(size: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(size, size, Rgb([40, 90, 160]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn world() -> Domain {
    Domain::from_extent(&TileGrid::web_mercator().root_extent())
}

fn service(http: CountingClient, config: ServiceConfig) -> TileService<CountingClient> {
    TileService::with_http_client(Arc::new(OsmProvider), http, config).unwrap()
}

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn test_world_discovery_is_complete_and_deterministic() {
    let finder = DomainTileFinder::new(TileGrid::web_mercator(), Addressing::Xyz);
    let domain = world();

    let first: Vec<TileId> = finder.find(&domain, 2).unwrap().collect();
    let second: Vec<TileId> = finder.find(&domain, 2).unwrap().collect();

    assert_eq!(first.len(), 16);
    assert_eq!(first, second);
    let unique: HashSet<_> = first.iter().collect();
    assert_eq!(unique.len(), 16);
}

#[test]
fn test_quadkey_discovery_matches_xyz_count() {
    let domain = world();
    let xyz = DomainTileFinder::new(TileGrid::web_mercator(), Addressing::Xyz);
    let quadkey = DomainTileFinder::new(TileGrid::web_mercator(), Addressing::Quadkey);

    let quadkeys: Vec<TileId> = quadkey.find(&domain, 3).unwrap().collect();
    assert_eq!(quadkeys.len(), xyz.find(&domain, 3).unwrap().count());
    assert!(quadkeys.iter().all(|t| t.addressing() == Addressing::Quadkey));
}

#[test]
fn test_small_region_prunes_the_tree() {
    let grid = TileGrid::web_mercator();
    let finder = DomainTileFinder::new(grid, Addressing::Xyz);
    // Central London
    let domain = Domain::from_lon_lat_bounds(&WebMercator, -0.15, 51.48, -0.05, 51.53);

    let tiles: Vec<TileId> = finder.find(&domain, 12).unwrap().collect();

    assert!(!tiles.is_empty());
    assert!(tiles.len() <= 4, "found {} tiles", tiles.len());
    for tile in &tiles {
        assert_eq!(tile.zoom(), 12);
        assert!(domain.intersects(&grid.bounding_box(tile)));
    }
}

// ============================================================================
// Stitching
// ============================================================================

#[test]
fn test_children_reconstruct_parent() {
    let grid = TileGrid::web_mercator();
    let parent = TileId::Cartesian(TileCoord::root());
    let children = grid.children(&parent).unwrap();

    let samples: Vec<TileSample> = children
        .iter()
        .map(|child| {
            let raster = TileRaster::new(
                PixelGrid::filled(16, 16, ColorMode::Rgb, [5, 6, 7, 255]),
                grid.bounding_box(child),
                Origin::Lower,
            );
            TileSample::from_raster(raster)
        })
        .collect();

    let mosaic = merge(&samples).unwrap();
    assert_eq!(*mosaic.extent(), grid.bounding_box(&parent));
    assert_eq!((mosaic.width(), mosaic.height()), (31, 31));
    assert!(mosaic.is_complete());
}

// ============================================================================
// Service
// ============================================================================

#[tokio::test]
async fn test_partial_failure_leaves_a_hole() {
    let http = CountingClient::new(png(8)).with_broken("/1/1/1.png");
    let service = service(http.clone(), ServiceConfig::default().without_cache());

    let mosaic = service.image_for_domain(&world(), 1).await.unwrap();

    assert_eq!(http.requests(), 4);
    assert_eq!((mosaic.width(), mosaic.height()), (15, 15));
    assert!(!mosaic.is_complete());
    // 7x7 of the 15x15 pixels are only covered by the broken tile.
    let ratio = mosaic.coverage_ratio();
    assert!(ratio > 0.75 && ratio < 0.8, "coverage {}", ratio);
}

#[tokio::test]
async fn test_http_failure_is_filled_with_placeholder() {
    let http = CountingClient::new(png(256)).with_missing("/1/1/1.png");
    let service = service(http, ServiceConfig::default().without_cache());

    let mosaic = service.image_for_domain(&world(), 1).await.unwrap();

    assert_eq!((mosaic.width(), mosaic.height()), (511, 511));
    assert!(mosaic.is_complete());
    // SE tile: east columns, southern (first) rows.
    assert_eq!(mosaic.pixels().pixel(510, 0), &[250, 250, 250]);
    assert_eq!(mosaic.pixels().pixel(0, 0), &[40, 90, 160]);
}

#[tokio::test]
async fn test_http_failure_beside_oversized_tiles_still_merges() {
    // The server answers with 512px tiles; the placeholder is 256px.
    let http = CountingClient::new(png(512)).with_missing("/1/1/1.png");
    let service = service(http, ServiceConfig::default().without_cache());

    let mosaic = service.image_for_domain(&world(), 1).await.unwrap();

    assert_eq!((mosaic.width(), mosaic.height()), (1023, 1023));
    assert!(!mosaic.is_complete());
    let ratio = mosaic.coverage_ratio();
    assert!(ratio > 0.7 && ratio < 0.8, "coverage {}", ratio);
}

#[tokio::test]
async fn test_all_tiles_broken_is_an_error() {
    let http = CountingClient::new(b"garbage".to_vec());
    let service = service(http, ServiceConfig::default().without_cache());

    let result = service.image_for_domain(&world(), 1).await;
    assert!(matches!(result, Err(ServiceError::NothingResolved { requested: 4 })));
}

#[tokio::test]
async fn test_second_run_is_served_from_cache() {
    let temp = TempDir::new().unwrap();
    let config = ServiceConfig::default().with_cache_dir(temp.path().to_path_buf());

    let first = CountingClient::new(png(8));
    let mosaic = service(first.clone(), config.clone())
        .image_for_domain(&world(), 0)
        .await
        .unwrap();
    assert_eq!(first.requests(), 1);

    let second = CountingClient::new(png(8));
    let cached = service(second.clone(), config)
        .image_for_domain(&world(), 0)
        .await
        .unwrap();
    assert_eq!(second.requests(), 0);
    assert_eq!(cached.pixels(), mosaic.pixels());
}

//! Bounded parallel resolution of a tile set.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::types::{FetchStats, TileResolver, MAX_CONCURRENT_FETCHES};
use crate::coord::TileId;
use crate::fetch::FetchError;
use crate::mosaic::TileSample;
use crate::raster::TileRaster;

/// Resolves many tiles concurrently with at most `max_concurrent` in flight.
///
/// Tiles whose resolution fails are logged and left out of the result, so
/// the merged mosaic shows a hole there instead of the whole batch failing.
/// Results come back in completion order.
pub struct FetchOrchestrator<R> {
    resolver: Arc<R>,
    max_concurrent: usize,
}

impl<R: TileResolver> FetchOrchestrator<R> {
    pub fn new(resolver: Arc<R>) -> Self {
        Self {
            resolver,
            max_concurrent: MAX_CONCURRENT_FETCHES,
        }
    }

    /// Overrides the concurrency limit. Zero is treated as one.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn resolver(&self) -> &Arc<R> {
        &self.resolver
    }

    /// Resolves every tile, dropping the ones that fail.
    pub async fn fetch_all<I>(&self, tiles: I) -> Vec<TileSample>
    where
        I: IntoIterator<Item = TileId>,
    {
        self.fetch_with_stats(tiles, None).await.0
    }

    /// Like [`fetch_all`](Self::fetch_all), but stops when `cancel` fires.
    ///
    /// In-flight resolutions are aborted; tiles that had already completed
    /// are returned.
    pub async fn fetch_all_cancellable<I>(
        &self,
        tiles: I,
        cancel: CancellationToken,
    ) -> Vec<TileSample>
    where
        I: IntoIterator<Item = TileId>,
    {
        self.fetch_with_stats(tiles, Some(cancel)).await.0
    }

    /// Resolves tiles and reports what happened to them.
    pub async fn fetch_with_stats<I>(
        &self,
        tiles: I,
        cancel: Option<CancellationToken>,
    ) -> (Vec<TileSample>, FetchStats)
    where
        I: IntoIterator<Item = TileId>,
    {
        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks: JoinSet<(TileId, Result<TileRaster, FetchError>)> = JoinSet::new();

        let mut stats = FetchStats::default();
        for tile in tiles {
            stats.requested += 1;
            let resolver = Arc::clone(&self.resolver);
            let sem = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = match sem.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return (tile, Err(FetchError::Task(e.to_string()))),
                };
                let result = resolver.resolve(&tile).await;
                (tile, result)
            });
        }

        let cancelled = async {
            match &cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };
        let mut cancelled = std::pin::pin!(cancelled);

        let mut samples = Vec::with_capacity(stats.requested);
        loop {
            tokio::select! {
                biased;

                _ = &mut cancelled => {
                    tasks.abort_all();
                    stats.cancelled = true;
                    info!(remaining = tasks.len(), "Tile fetch cancelled");
                    break;
                }
                next = tasks.join_next() => {
                    let Some(result) = next else { break };
                    match result {
                        Ok((tile, Ok(raster))) => {
                            debug!(tile = %tile, "Tile resolved");
                            stats.resolved += 1;
                            samples.push(TileSample::from_raster(raster));
                        }
                        Ok((tile, Err(e))) => {
                            warn!(tile = %tile, error = %e, "Tile dropped");
                            stats.dropped += 1;
                        }
                        Err(join_err) => {
                            warn!(error = %join_err, "Tile fetch task panicked");
                            stats.dropped += 1;
                        }
                    }
                }
            }
        }

        stats.elapsed_secs = start.elapsed().as_secs_f64();
        info!(
            requested = stats.requested,
            resolved = stats.resolved,
            dropped = stats.dropped,
            elapsed_ms = (stats.elapsed_secs * 1000.0) as u64,
            "Tile fetch complete"
        );
        (samples, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheError;
    use crate::coord::{Origin, TileCoord, TileGrid};
    use crate::raster::{ColorMode, PixelGrid};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Resolves tiles to 2x2 rasters, failing those in `failing`, and
    /// tracks the peak number of concurrent calls.
    struct CountingResolver {
        grid: TileGrid,
        failing: Vec<TileId>,
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl CountingResolver {
        fn new(delay: Duration) -> Self {
            Self {
                grid: TileGrid::web_mercator(),
                failing: Vec::new(),
                delay,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(mut self, tile: TileId) -> Self {
            self.failing.push(tile);
            self
        }
    }

    impl TileResolver for CountingResolver {
        async fn resolve(&self, tile: &TileId) -> Result<TileRaster, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing.contains(tile) {
                return Err(FetchError::Cache(CacheError::Encode("boom".into())));
            }
            let pixels = PixelGrid::filled(2, 2, ColorMode::Luma, [1, 0, 0, 0]);
            Ok(TileRaster::new(
                pixels,
                self.grid.bounding_box(tile),
                Origin::Lower,
            ))
        }
    }

    fn zoom_tiles(zoom: u8) -> Vec<TileId> {
        let n = 1u32 << zoom;
        (0..n)
            .flat_map(|x| (0..n).map(move |y| TileId::Cartesian(TileCoord::new(x, y, zoom).unwrap())))
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_all_resolves_every_tile() {
        let orchestrator = FetchOrchestrator::new(Arc::new(CountingResolver::new(Duration::ZERO)));
        let samples = orchestrator.fetch_all(zoom_tiles(1)).await;
        assert_eq!(samples.len(), 4);
        assert!(samples.iter().all(|s| s.xs.len() == 2 && s.ys.len() == 2));
    }

    #[tokio::test]
    async fn test_failed_tile_is_dropped() {
        let bad = TileId::Cartesian(TileCoord::new(1, 0, 1).unwrap());
        let resolver = CountingResolver::new(Duration::ZERO).failing(bad);
        let orchestrator = FetchOrchestrator::new(Arc::new(resolver));

        let (samples, stats) = orchestrator.fetch_with_stats(zoom_tiles(1), None).await;
        assert_eq!(samples.len(), 3);
        assert_eq!(
            (stats.requested, stats.resolved, stats.dropped),
            (4, 3, 1)
        );
        assert!(!stats.cancelled);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let resolver = Arc::new(CountingResolver::new(Duration::from_millis(5)));
        let orchestrator = FetchOrchestrator::new(Arc::clone(&resolver)).with_max_concurrent(3);

        let samples = orchestrator.fetch_all(zoom_tiles(3)).await;
        assert_eq!(samples.len(), 64);
        let peak = resolver.peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak in-flight was {}", peak);
        assert!(peak >= 1);
    }

    #[tokio::test]
    async fn test_zero_limit_clamped() {
        let orchestrator =
            FetchOrchestrator::new(Arc::new(CountingResolver::new(Duration::ZERO))).with_max_concurrent(0);
        assert_eq!(orchestrator.max_concurrent(), 1);
        assert_eq!(orchestrator.fetch_all(zoom_tiles(1)).await.len(), 4);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let orchestrator = FetchOrchestrator::new(Arc::new(CountingResolver::new(Duration::ZERO)));
        assert!(orchestrator.fetch_all(Vec::new()).await.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_start_returns_nothing() {
        let resolver = Arc::new(CountingResolver::new(Duration::from_secs(60)));
        let orchestrator = FetchOrchestrator::new(Arc::clone(&resolver));
        let token = CancellationToken::new();
        token.cancel();

        let (samples, stats) = orchestrator
            .fetch_with_stats(zoom_tiles(2), Some(token))
            .await;
        assert!(samples.is_empty());
        assert!(stats.cancelled);
        assert_eq!(stats.aborted(), 16);
    }

    #[tokio::test]
    async fn test_cancel_mid_batch_keeps_completed() {
        let resolver = Arc::new(CountingResolver::new(Duration::from_millis(20)));
        let orchestrator = FetchOrchestrator::new(Arc::clone(&resolver)).with_max_concurrent(1);
        let token = CancellationToken::new();

        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(70)).await;
            trigger.cancel();
        });

        let samples = orchestrator
            .fetch_all_cancellable(zoom_tiles(3), token)
            .await;
        assert!(!samples.is_empty());
        assert!(samples.len() < 64);
    }
}

//! Orchestrator types

use std::future::Future;

use crate::coord::TileId;
use crate::fetch::FetchError;
use crate::raster::TileRaster;

/// Upper bound on concurrently running tile resolutions.
pub const MAX_CONCURRENT_FETCHES: usize = 24;

/// Resolves a single tile.
///
/// Implemented by [`TileFetcher`](crate::fetch::TileFetcher); tests plug in
/// their own resolvers to exercise scheduling without a network.
pub trait TileResolver: Send + Sync + 'static {
    fn resolve(
        &self,
        tile: &TileId,
    ) -> impl Future<Output = Result<TileRaster, FetchError>> + Send;
}

/// Statistics about one batch of tile resolutions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchStats {
    /// Tiles handed to the orchestrator
    pub requested: usize,
    /// Tiles that produced a raster
    pub resolved: usize,
    /// Tiles dropped because resolution failed or the task panicked
    pub dropped: usize,
    /// Whether the batch was cut short by cancellation
    pub cancelled: bool,
    /// Wall time in seconds
    pub elapsed_secs: f64,
}

impl FetchStats {
    /// Tiles neither resolved nor dropped, i.e. aborted by cancellation.
    pub fn aborted(&self) -> usize {
        self.requested - self.resolved - self.dropped
    }
}

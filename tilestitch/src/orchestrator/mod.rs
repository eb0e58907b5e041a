//! Tile fetch orchestration
//!
//! Resolves a discovered tile set in parallel with a bounded number of
//! in-flight requests and turns each raster into a [`TileSample`] ready for
//! merging.
//!
//! [`TileSample`]: crate::mosaic::TileSample

mod batch;
mod types;

pub use batch::FetchOrchestrator;
pub use types::{FetchStats, TileResolver, MAX_CONCURRENT_FETCHES};

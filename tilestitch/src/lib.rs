//! Tilestitch - web map tiles in, one seamless raster out
//!
//! Given a region of interest in projected coordinates and a zoom level, the
//! library discovers the covering tiles, fetches them concurrently through a
//! persistent decoded-tile cache, and merges them into a single raster with
//! its extent and row-order convention.
//!
//! The pipeline, leaves first:
//!
//! - [`coord`] - tile grid geometry, Cartesian and quadkey addressing
//! - [`domain`] - pruned quadtree search for tiles intersecting a region
//! - [`fetch`] - cache lookup, download, decode and persist for one tile
//! - [`orchestrator`] - bounded parallel resolution of a tile set
//! - [`mosaic`] - pixel-exact merge of tiles into one raster
//!
//! [`service::TileService`] wires them together.

pub mod cache;
pub mod config;
pub mod coord;
pub mod domain;
pub mod fetch;
pub mod logging;
pub mod mosaic;
pub mod orchestrator;
pub mod provider;
pub mod raster;
pub mod service;

pub use mosaic::{merge, Mosaic, TileSample};
pub use service::{ServiceConfig, ServiceError, TileService};

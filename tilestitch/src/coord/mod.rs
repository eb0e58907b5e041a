//! Tile coordinate system
//!
//! Maps tile identifiers to their bounding boxes in projected units and
//! enumerates each tile's four children. Two addressing schemes share one
//! grid:
//!
//! - **Cartesian** `(x, y, z)` with `0 <= x, y < 2^z`
//! - **Quadkey** digit paths from the root, one digit per zoom level
//!
//! The grid itself is agnostic of the projection; it only needs the fixed
//! projected axis limits of the root tile (see [`Projection`]).

mod grid;
mod projection;
mod quadkey;
mod types;

pub use grid::TileGrid;
pub use projection::{Projection, WebMercator, EARTH_RADIUS_M, MAX_MERCATOR_LAT, WEB_MERCATOR_LIMIT};
pub use quadkey::{cartesian_to_quadkey, quadkey_to_cartesian, quadkey_to_tile};
pub use types::{
    tiles_per_side, Addressing, CoordError, Extent, Origin, Quadkey, TileCoord, TileId, YAxis,
    MAX_ZOOM,
};

pub(crate) use grid::children_of;

//! Quad-partitioned tile grid over fixed projected axis limits.

use super::projection::{Projection, WEB_MERCATOR_LIMIT};
use super::quadkey::quadkey_to_tile;
use super::types::{tiles_per_side, CoordError, Extent, TileCoord, TileId, YAxis, MAX_ZOOM};

/// The tile coordinate system: root extent plus the row-numbering convention.
///
/// Cell edges are computed by one division formula shared by every tile.
/// Adjacent tiles therefore agree bit-for-bit on their common edge, and a
/// parent's edges coincide exactly with its children's outer edges (halving
/// the cell size is exact in binary floating point).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGrid {
    x_limits: (f64, f64),
    y_limits: (f64, f64),
    y_axis: YAxis,
}

impl TileGrid {
    /// Creates a grid over the given axis limits with north-origin rows.
    pub fn new(x_limits: (f64, f64), y_limits: (f64, f64)) -> Result<Self, CoordError> {
        Extent::new(x_limits.0, x_limits.1, y_limits.0, y_limits.1)?;
        Ok(Self {
            x_limits,
            y_limits,
            y_axis: YAxis::NorthOrigin,
        })
    }

    /// Creates a grid spanning a projection's axis limits.
    pub fn from_projection<P: Projection + ?Sized>(projection: &P) -> Result<Self, CoordError> {
        Self::new(projection.x_limits(), projection.y_limits())
    }

    /// The spherical Web Mercator grid used by web map services.
    pub fn web_mercator() -> Self {
        Self {
            x_limits: (-WEB_MERCATOR_LIMIT, WEB_MERCATOR_LIMIT),
            y_limits: (-WEB_MERCATOR_LIMIT, WEB_MERCATOR_LIMIT),
            y_axis: YAxis::NorthOrigin,
        }
    }

    /// Sets the row-numbering convention for cartesian tiles.
    pub fn with_y_axis(mut self, y_axis: YAxis) -> Self {
        self.y_axis = y_axis;
        self
    }

    pub fn y_axis(&self) -> YAxis {
        self.y_axis
    }

    pub fn x_limits(&self) -> (f64, f64) {
        self.x_limits
    }

    pub fn y_limits(&self) -> (f64, f64) {
        self.y_limits
    }

    /// Extent of the zoom-0 tile.
    pub fn root_extent(&self) -> Extent {
        self.cell(0, 0, 0)
    }

    /// Bounding box of a tile in projected units.
    ///
    /// Cartesian tiles use the grid's [`YAxis`]; quadkeys always describe
    /// north-origin quadrants.
    pub fn bounding_box(&self, tile: &TileId) -> Extent {
        match tile {
            TileId::Cartesian(coord) => self.bounding_box_with(coord, self.y_axis),
            TileId::Quadkey(quadkey) => {
                let coord = quadkey_to_tile(quadkey, YAxis::NorthOrigin);
                self.bounding_box_with(&coord, YAxis::NorthOrigin)
            }
        }
    }

    /// Bounding box of a cartesian tile under an explicit row convention.
    pub fn bounding_box_with(&self, tile: &TileCoord, y_axis: YAxis) -> Extent {
        let row_from_south = match y_axis {
            YAxis::SouthOrigin => tile.y,
            YAxis::NorthOrigin => tile.flip_y().y,
        };
        self.cell(tile.x, row_from_south, tile.zoom)
    }

    /// The four children of a tile at `z + 1`.
    ///
    /// For cartesian tiles the order is `(2x, 2y), (2x+1, 2y), (2x, 2y+1),
    /// (2x+1, 2y+1)`, where row `2y` is the northern half under
    /// [`YAxis::NorthOrigin`] and the southern half under
    /// [`YAxis::SouthOrigin`]. Quadkeys append digits `0..=3`, which always
    /// count rows from the north.
    pub fn children(&self, tile: &TileId) -> Result<[TileId; 4], CoordError> {
        if tile.zoom() >= MAX_ZOOM {
            return Err(CoordError::InvalidZoom(tile.zoom().saturating_add(1)));
        }
        Ok(children_of(tile))
    }

    /// Cell `(col, row_from_south)` at `zoom`.
    fn cell(&self, col: u32, row_from_south: u32, zoom: u8) -> Extent {
        let n = tiles_per_side(zoom);
        Extent::from_edges(
            edge(self.x_limits, col as u64, n),
            edge(self.x_limits, col as u64 + 1, n),
            edge(self.y_limits, row_from_south as u64, n),
            edge(self.y_limits, row_from_south as u64 + 1, n),
        )
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::web_mercator()
    }
}

/// Position of division line `index` out of `n` equal cells.
#[inline]
fn edge((lo, hi): (f64, f64), index: u64, n: u64) -> f64 {
    if index == 0 {
        lo
    } else if index == n {
        hi
    } else {
        lo + index as f64 * ((hi - lo) / n as f64)
    }
}

/// Children without the depth check; callers guarantee `zoom < MAX_ZOOM`.
pub(crate) fn children_of(tile: &TileId) -> [TileId; 4] {
    match tile {
        TileId::Cartesian(c) => [
            TileId::Cartesian(c.child(0, 0)),
            TileId::Cartesian(c.child(1, 0)),
            TileId::Cartesian(c.child(0, 1)),
            TileId::Cartesian(c.child(1, 1)),
        ],
        TileId::Quadkey(q) => [
            TileId::Quadkey(q.child(0)),
            TileId::Quadkey(q.child(1)),
            TileId::Quadkey(q.child(2)),
            TileId::Quadkey(q.child(3)),
        ],
    }
}

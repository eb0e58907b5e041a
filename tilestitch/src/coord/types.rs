//! Coordinate type definitions

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Deepest zoom level a tile identifier may address.
///
/// Keeps `2^zoom` representable in a `u32` tile index.
pub const MAX_ZOOM: u8 = 30;

/// Quadkey digit table: digit value -> (east bit, south bit).
pub(crate) const QUADKEY_DIGITS: [(u32, u32); 4] = [(0, 0), (1, 0), (0, 1), (1, 1)];

/// Errors that can occur while building or converting tile identifiers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Tile index outside `0..2^zoom`.
    #[error("Tile index ({x}, {y}) out of range for zoom {zoom} (must be < {limit})")]
    IndexOutOfRange { x: u32, y: u32, zoom: u8, limit: u64 },

    /// Zoom level not addressable.
    #[error("Invalid zoom level: {0} (must be <= {MAX_ZOOM})")]
    InvalidZoom(u8),

    /// Quadkey is empty; the root tile has no quadkey.
    #[error("The empty quadkey does not address a tile")]
    EmptyQuadkey,

    /// Quadkey contains a digit other than 0-3.
    #[error("Invalid quadkey digit '{digit}' in '{quadkey}'")]
    InvalidQuadkeyDigit { quadkey: String, digit: char },

    /// Extent does not satisfy `x0 < x1` and `y0 < y1`.
    #[error("Degenerate extent ({x0}, {x1}, {y0}, {y1})")]
    DegenerateExtent { x0: f64, x1: f64, y0: f64, y1: f64 },
}

/// Which edge of the grid row index 0 starts at.
///
/// Web map services (Google, OSM, Bing) count rows from the north edge;
/// TMS counts them from the south edge. Both describe the same cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum YAxis {
    /// Row 0 touches the maximum y of the grid.
    #[default]
    NorthOrigin,
    /// Row 0 touches the minimum y of the grid.
    SouthOrigin,
}

/// Addressing scheme used by a provider or a discovery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Addressing {
    /// `(x, y, z)` integer triples.
    #[default]
    Xyz,
    /// Digit-string paths from the root.
    Quadkey,
}

impl FromStr for YAxis {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "north" | "xyz" | "google" => Ok(YAxis::NorthOrigin),
            "south" | "tms" => Ok(YAxis::SouthOrigin),
            _ => Err(()),
        }
    }
}

impl FromStr for Addressing {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xyz" | "cartesian" => Ok(Addressing::Xyz),
            "quadkey" => Ok(Addressing::Quadkey),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Addressing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Addressing::Xyz => write!(f, "xyz"),
            Addressing::Quadkey => write!(f, "quadkey"),
        }
    }
}

/// Row order of a raster relative to its extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// First row is the maximum y of the extent.
    Upper,
    /// First row is the minimum y of the extent.
    Lower,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Upper => write!(f, "upper"),
            Origin::Lower => write!(f, "lower"),
        }
    }
}

/// Cartesian tile coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Column, 0 at the west edge
    pub x: u32,
    /// Row, counted from the edge given by the grid's [`YAxis`]
    pub y: u32,
    /// Zoom level
    pub zoom: u8,
}

impl TileCoord {
    /// Creates a tile coordinate, validating `0 <= x, y < 2^zoom`.
    pub fn new(x: u32, y: u32, zoom: u8) -> Result<Self, CoordError> {
        if zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(zoom));
        }
        let limit = tiles_per_side(zoom);
        if x as u64 >= limit || y as u64 >= limit {
            return Err(CoordError::IndexOutOfRange { x, y, zoom, limit });
        }
        Ok(Self { x, y, zoom })
    }

    /// The single tile at zoom 0.
    pub const fn root() -> Self {
        Self { x: 0, y: 0, zoom: 0 }
    }

    /// Child at offset `(dx, dy)`; callers guarantee `zoom < MAX_ZOOM`.
    pub(crate) fn child(&self, dx: u32, dy: u32) -> Self {
        debug_assert!(self.zoom < MAX_ZOOM);
        Self {
            x: self.x * 2 + dx,
            y: self.y * 2 + dy,
            zoom: self.zoom + 1,
        }
    }

    /// Mirrors the row index between north- and south-origin numbering.
    pub fn flip_y(&self) -> Self {
        let last = (tiles_per_side(self.zoom) - 1) as u32;
        Self {
            x: self.x,
            y: last - self.y,
            zoom: self.zoom,
        }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// A validated quadkey: one digit in `0..=3` per zoom level, at least one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quadkey(String);

impl Quadkey {
    /// Parses and validates a quadkey string.
    pub fn new(digits: impl Into<String>) -> Result<Self, CoordError> {
        let digits = digits.into();
        if digits.is_empty() {
            return Err(CoordError::EmptyQuadkey);
        }
        if digits.len() > MAX_ZOOM as usize {
            return Err(CoordError::InvalidZoom(
                u8::try_from(digits.len()).unwrap_or(u8::MAX),
            ));
        }
        if let Some(digit) = digits.chars().find(|c| !matches!(c, '0'..='3')) {
            return Err(CoordError::InvalidQuadkeyDigit {
                quadkey: digits,
                digit,
            });
        }
        Ok(Self(digits))
    }

    /// The digit string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Zoom level, equal to the number of digits.
    pub fn zoom(&self) -> u8 {
        self.0.len() as u8
    }

    /// Appends one quadrant digit; callers guarantee `digit <= 3` and depth.
    pub(crate) fn child(&self, digit: u8) -> Self {
        debug_assert!(digit <= 3);
        let mut digits = String::with_capacity(self.0.len() + 1);
        digits.push_str(&self.0);
        digits.push(char::from(b'0' + digit));
        Self(digits)
    }
}

impl fmt::Display for Quadkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one tile in either addressing scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TileId {
    /// `(x, y, z)` addressing
    Cartesian(TileCoord),
    /// Digit-path addressing
    Quadkey(Quadkey),
}

impl TileId {
    /// Zoom level of the tile.
    pub fn zoom(&self) -> u8 {
        match self {
            TileId::Cartesian(coord) => coord.zoom,
            TileId::Quadkey(quadkey) => quadkey.zoom(),
        }
    }

    /// Addressing scheme of this identifier.
    pub fn addressing(&self) -> Addressing {
        match self {
            TileId::Cartesian(_) => Addressing::Xyz,
            TileId::Quadkey(_) => Addressing::Quadkey,
        }
    }

    /// Deterministic file stem used by the tile cache.
    ///
    /// `{x}_{y}_{z}` for cartesian tiles, the digit string for quadkeys.
    pub fn cache_stem(&self) -> String {
        match self {
            TileId::Cartesian(c) => format!("{}_{}_{}", c.x, c.y, c.zoom),
            TileId::Quadkey(q) => q.as_str().to_string(),
        }
    }
}

impl From<TileCoord> for TileId {
    fn from(coord: TileCoord) -> Self {
        TileId::Cartesian(coord)
    }
}

impl From<Quadkey> for TileId {
    fn from(quadkey: Quadkey) -> Self {
        TileId::Quadkey(quadkey)
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileId::Cartesian(coord) => write!(f, "{}", coord),
            TileId::Quadkey(quadkey) => write!(f, "q{}", quadkey),
        }
    }
}

/// Axis-aligned rectangle `(x0, x1, y0, y1)` in projected units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
}

impl Extent {
    /// Creates an extent, requiring `x0 < x1` and `y0 < y1`.
    pub fn new(x0: f64, x1: f64, y0: f64, y1: f64) -> Result<Self, CoordError> {
        // Written so that NaN also fails.
        if !(x0 < x1 && y0 < y1) {
            return Err(CoordError::DegenerateExtent { x0, x1, y0, y1 });
        }
        Ok(Self { x0, x1, y0, y1 })
    }

    /// Builds an extent from edges the caller has already ordered.
    pub(crate) fn from_edges(x0: f64, x1: f64, y0: f64, y1: f64) -> Self {
        debug_assert!(x0 < x1 && y0 < y1);
        Self { x0, x1, y0, y1 }
    }

    pub fn x0(&self) -> f64 {
        self.x0
    }

    pub fn x1(&self) -> f64 {
        self.x1
    }

    pub fn y0(&self) -> f64 {
        self.y0
    }

    pub fn y1(&self) -> f64 {
        self.y1
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// The extent as a `(x0, x1, y0, y1)` tuple.
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.x0, self.x1, self.y0, self.y1)
    }

    /// Whether `other` lies entirely inside this extent (edges included).
    pub fn contains(&self, other: &Extent) -> bool {
        other.x0 >= self.x0 && other.x1 <= self.x1 && other.y0 >= self.y0 && other.y1 <= self.y1
    }

    /// Converts to a planar rectangle for intersection tests.
    pub fn to_rect(&self) -> geo::Rect<f64> {
        geo::Rect::new(
            geo::coord! { x: self.x0, y: self.y0 },
            geo::coord! { x: self.x1, y: self.y1 },
        )
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.x0, self.x1, self.y0, self.y1)
    }
}

/// Number of tiles along one axis at `zoom`.
#[inline]
pub fn tiles_per_side(zoom: u8) -> u64 {
    1u64 << zoom
}

//! Region-of-interest polygons in projected coordinates.

use geo::{Intersects, LineString, MultiPolygon, Polygon};

use crate::coord::{Extent, Projection};

/// A planar region of interest, one or more polygons in projected units.
///
/// Intersection with a tile is non-empty overlap *including* the boundary:
/// a tile that only touches the region along an edge or corner still counts,
/// so boundary tiles are never dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    polygons: MultiPolygon<f64>,
}

impl Domain {
    /// Domain made of a single polygon.
    pub fn from_polygon(polygon: Polygon<f64>) -> Self {
        Self {
            polygons: MultiPolygon::new(vec![polygon]),
        }
    }

    /// Domain made of several polygons; a tile is kept if it meets any.
    pub fn from_multi_polygon(polygons: MultiPolygon<f64>) -> Self {
        Self { polygons }
    }

    /// Rectangular domain covering an extent.
    pub fn from_extent(extent: &Extent) -> Self {
        Self::from_polygon(extent.to_rect().to_polygon())
    }

    /// Rectangular domain from two corners in projected units.
    pub fn from_bounds(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        let (xmin, xmax) = (x0.min(x1), x0.max(x1));
        let (ymin, ymax) = (y0.min(y1), y0.max(y1));
        Self::from_polygon(Polygon::new(
            LineString::from(vec![
                (xmin, ymin),
                (xmax, ymin),
                (xmax, ymax),
                (xmin, ymax),
                (xmin, ymin),
            ]),
            vec![],
        ))
    }

    /// Rectangular domain from a geographic `lon/lat` box.
    ///
    /// The box edges are projected corner by corner, which is exact for
    /// cylindrical projections such as Web Mercator.
    pub fn from_lon_lat_bounds<P: Projection + ?Sized>(
        projection: &P,
        lon0: f64,
        lat0: f64,
        lon1: f64,
        lat1: f64,
    ) -> Self {
        let (x0, y0) = projection.forward(lon0, lat0);
        let (x1, y1) = projection.forward(lon1, lat1);
        Self::from_bounds(x0, y0, x1, y1)
    }

    /// The polygons making up the domain.
    pub fn polygons(&self) -> &MultiPolygon<f64> {
        &self.polygons
    }

    /// Whether a tile extent overlaps or touches the domain.
    pub fn intersects(&self, extent: &Extent) -> bool {
        let rect = extent.to_rect();
        self.polygons.0.iter().any(|polygon| polygon.intersects(&rect))
    }
}

impl From<Polygon<f64>> for Domain {
    fn from(polygon: Polygon<f64>) -> Self {
        Self::from_polygon(polygon)
    }
}

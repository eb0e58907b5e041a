//! Projected coordinate systems consumed by the tile grid.

use std::f64::consts::PI;

/// Spherical earth radius used by web map services, in metres.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Half the width of the Web Mercator square, `π · R`.
pub const WEB_MERCATOR_LIMIT: f64 = PI * EARTH_RADIUS_M;

/// Latitude at which the Web Mercator square is cut off.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// A forward/inverse map projection with fixed axis limits.
pub trait Projection: Send + Sync {
    /// Geographic `(lon, lat)` in degrees to projected `(x, y)`.
    fn forward(&self, lon: f64, lat: f64) -> (f64, f64);

    /// Projected `(x, y)` to geographic `(lon, lat)` in degrees.
    fn inverse(&self, x: f64, y: f64) -> (f64, f64);

    /// `(min, max)` of the projected x axis.
    fn x_limits(&self) -> (f64, f64);

    /// `(min, max)` of the projected y axis.
    fn y_limits(&self) -> (f64, f64);
}

/// Spherical Web Mercator (EPSG:3857).
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl Projection for WebMercator {
    fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
        let x = EARTH_RADIUS_M * lon.to_radians();
        let y = EARTH_RADIUS_M * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
        (x, y)
    }

    fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = (x / EARTH_RADIUS_M).to_degrees();
        let lat = (2.0 * (y / EARTH_RADIUS_M).exp().atan() - PI / 2.0).to_degrees();
        (lon, lat)
    }

    fn x_limits(&self) -> (f64, f64) {
        (-WEB_MERCATOR_LIMIT, WEB_MERCATOR_LIMIT)
    }

    fn y_limits(&self) -> (f64, f64) {
        (-WEB_MERCATOR_LIMIT, WEB_MERCATOR_LIMIT)
    }
}

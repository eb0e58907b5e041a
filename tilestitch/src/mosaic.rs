//! Mosaic assembly
//!
//! Merges tile rasters, each tagged with its own coordinate axes, into one
//! contiguous raster. The output axes are the sorted union of every tile's
//! sample coordinates; tiles at one zoom share their boundary coordinates
//! bit-for-bit (see [`TileGrid`](crate::coord::TileGrid)), so each tile lands
//! on an exact index range.
//!
//! Cells no tile covers are left zero in the pixel grid and marked 0 in the
//! coverage mask; there is no sentinel pixel value.

use std::cmp::Ordering;

use image::{GrayImage, Rgba, RgbaImage};
use thiserror::Error;

use crate::coord::{CoordError, Extent, Origin};
use crate::raster::{ColorMode, PixelGrid, TileRaster};

/// Coverage mask value of a pixel backed by tile data.
pub const COVERED: u8 = u8::MAX;

/// Largest pixel buffer [`merge`] allocates, in bytes (2 GiB).
pub const MAX_MOSAIC_BYTES: usize = 1 << 31;

/// Errors rejected by [`merge`].
#[derive(Debug, Error)]
pub enum MergeError {
    /// Nothing to merge.
    #[error("A non-empty list of tiles should be provided to merge")]
    EmptyInput,

    /// Tile axes disagree with its pixel grid, or contain NaN/infinity.
    #[error("Tile {index} is malformed: {reason}")]
    MalformedTile { index: usize, reason: String },

    /// A tile's span in the global axes does not match its pixel size,
    /// which happens when tiles of different zoom levels overlap.
    #[error("Tile {index} spans {found} {axis} in the mosaic but has {expected}")]
    MisalignedTile {
        index: usize,
        axis: &'static str,
        expected: usize,
        found: usize,
    },

    /// Tiles were normalized to different color modes.
    #[error("Tile {index} is {found}, expected {expected}")]
    ColorModeMismatch {
        index: usize,
        expected: ColorMode,
        found: ColorMode,
    },

    /// The merged raster would exceed [`MAX_MOSAIC_BYTES`].
    #[error("Mosaic of {width}x{height} pixels is too large")]
    TooLarge { width: usize, height: usize },

    /// The merged axes collapse to a line or point.
    #[error("Mosaic extent is degenerate: {0}")]
    Extent(#[from] CoordError),
}

/// One tile ready to merge.
///
/// `xs[i]` is the coordinate of pixel column `i`, ascending or descending.
/// `ys` holds the row coordinates; which end row 0 sits at is given by
/// `origin`.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSample {
    pub pixels: PixelGrid,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub origin: Origin,
}

impl TileSample {
    pub fn new(pixels: PixelGrid, xs: Vec<f64>, ys: Vec<f64>, origin: Origin) -> Self {
        Self {
            pixels,
            xs,
            ys,
            origin,
        }
    }

    /// Samples a raster's extent with one coordinate per pixel, endpoints
    /// included.
    pub fn from_raster(raster: TileRaster) -> Self {
        let (pixels, extent, origin) = raster.into_parts();
        let xs = linspace(extent.x0(), extent.x1(), pixels.width() as usize);
        let ys = linspace(extent.y0(), extent.y1(), pixels.height() as usize);
        Self::new(pixels, xs, ys, origin)
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
///
/// The last value is exactly `end`, so neighbouring tiles sharing an edge
/// produce the identical boundary coordinate.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| {
                    if i == n - 1 {
                        end
                    } else {
                        start + i as f64 * step
                    }
                })
                .collect()
        }
    }
}

/// The merged raster.
#[derive(Debug, Clone)]
pub struct Mosaic {
    pixels: PixelGrid,
    coverage: GrayImage,
    extent: Extent,
}

impl Mosaic {
    /// Pixel grid, first row at the minimum y.
    pub fn pixels(&self) -> &PixelGrid {
        &self.pixels
    }

    /// 255 where a tile supplied the pixel, 0 in holes. Same row order as
    /// [`pixels`](Self::pixels).
    pub fn coverage(&self) -> &GrayImage {
        &self.coverage
    }

    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    /// Always [`Origin::Lower`].
    pub fn origin(&self) -> Origin {
        Origin::Lower
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Whether every pixel is backed by a tile.
    pub fn is_complete(&self) -> bool {
        self.coverage.as_raw().iter().all(|&v| v == COVERED)
    }

    /// Fraction of pixels backed by a tile.
    pub fn coverage_ratio(&self) -> f64 {
        let raw = self.coverage.as_raw();
        let covered = raw.iter().filter(|&&v| v == COVERED).count();
        covered as f64 / raw.len() as f64
    }

    /// North-up RGBA image with the coverage mask as alpha, for writing to
    /// ordinary image files.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let height = self.height();
        let channels = self.pixels.channels();
        RgbaImage::from_fn(self.width(), height, |x, y| {
            let row = height - 1 - y;
            let p = self.pixels.pixel(x, row);
            let alpha = self.coverage.get_pixel(x, row).0[0];
            match channels {
                1 => Rgba([p[0], p[0], p[0], alpha]),
                3 => Rgba([p[0], p[1], p[2], alpha]),
                _ => Rgba([p[0], p[1], p[2], p[3].min(alpha)]),
            }
        })
    }

    pub fn into_parts(self) -> (PixelGrid, GrayImage, Extent, Origin) {
        (self.pixels, self.coverage, self.extent, Origin::Lower)
    }
}

/// Where one tile lands in the output.
struct Placement {
    index: usize,
    col: usize,
    row: usize,
    reverse_cols: bool,
    reverse_rows: bool,
}

/// Merges tiles into one raster with origin [`Origin::Lower`].
///
/// The result does not depend on input order: tiles are written sorted by
/// their position, so pixels on shared boundaries are deterministic.
pub fn merge(tiles: &[TileSample]) -> Result<Mosaic, MergeError> {
    let first = tiles.first().ok_or(MergeError::EmptyInput)?;
    let mode = first.pixels.mode();
    for (index, tile) in tiles.iter().enumerate() {
        check_tile(index, tile, mode)?;
    }

    let global_xs = union_axis(tiles.iter().map(|t| t.xs.as_slice()));
    let global_ys = union_axis(tiles.iter().map(|t| t.ys.as_slice()));
    let (width, height) = (global_xs.len(), global_ys.len());
    let bytes = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(mode.channels()));
    let (w, h) = match (bytes, u32::try_from(width), u32::try_from(height)) {
        (Some(bytes), Ok(w), Ok(h)) if bytes <= MAX_MOSAIC_BYTES => (w, h),
        _ => return Err(MergeError::TooLarge { width, height }),
    };

    let mut placements = Vec::with_capacity(tiles.len());
    for (index, tile) in tiles.iter().enumerate() {
        let (col, reverse_cols) = locate(index, "columns", &global_xs, &tile.xs)?;
        let (row, ys_descending) = locate(index, "rows", &global_ys, &tile.ys)?;
        // Row 0 is min y for Lower tiles with ascending ys; each of Upper and
        // descending ys mirrors that once.
        let reverse_rows = (tile.origin == Origin::Upper) != ys_descending;
        placements.push(Placement {
            index,
            col,
            row,
            reverse_cols,
            reverse_rows,
        });
    }
    placements.sort_by_key(|p| (p.row, p.col));

    let mut pixels = PixelGrid::new(w, h, mode);
    let mut coverage = GrayImage::new(w, h);
    let channels = mode.channels();
    for placement in &placements {
        let tile = &tiles[placement.index].pixels;
        let tile_h = tile.height();
        let tile_stride = tile.stride();
        for r in 0..tile_h {
            let src = tile.row(r);
            let offset = if placement.reverse_rows {
                tile_h - 1 - r
            } else {
                r
            };
            let out_row = placement.row as u32 + offset;

            let dst_start = placement.col * channels;
            let dst = &mut pixels.row_mut(out_row)[dst_start..dst_start + tile_stride];
            if placement.reverse_cols {
                for (dst_px, src_px) in dst
                    .chunks_exact_mut(channels)
                    .zip(src.chunks_exact(channels).rev())
                {
                    dst_px.copy_from_slice(src_px);
                }
            } else {
                dst.copy_from_slice(src);
            }

            let mask: &mut [u8] = &mut coverage;
            let mask_start = out_row as usize * width + placement.col;
            mask[mask_start..mask_start + tile.width() as usize].fill(COVERED);
        }
    }

    let extent = Extent::new(
        global_xs[0],
        global_xs[width - 1],
        global_ys[0],
        global_ys[height - 1],
    )?;

    Ok(Mosaic {
        pixels,
        coverage,
        extent,
    })
}

fn check_tile(index: usize, tile: &TileSample, mode: ColorMode) -> Result<(), MergeError> {
    let malformed = |reason: String| MergeError::MalformedTile { index, reason };

    tile.pixels
        .validate()
        .map_err(|e| malformed(e.to_string()))?;
    if tile.pixels.mode() != mode {
        return Err(MergeError::ColorModeMismatch {
            index,
            expected: mode,
            found: tile.pixels.mode(),
        });
    }
    if tile.xs.len() != tile.pixels.width() as usize {
        return Err(malformed(format!(
            "{} x coordinates for {} columns",
            tile.xs.len(),
            tile.pixels.width()
        )));
    }
    if tile.ys.len() != tile.pixels.height() as usize {
        return Err(malformed(format!(
            "{} y coordinates for {} rows",
            tile.ys.len(),
            tile.pixels.height()
        )));
    }
    if !tile.xs.iter().chain(&tile.ys).all(|v| v.is_finite()) {
        return Err(malformed("non-finite coordinate".to_string()));
    }
    Ok(())
}

/// `-0.0` and `0.0` must land on the same axis cell.
#[inline]
fn normalize(v: f64) -> f64 {
    v + 0.0
}

fn union_axis<'a>(axes: impl Iterator<Item = &'a [f64]>) -> Vec<f64> {
    let mut all: Vec<f64> = axes.flatten().map(|&v| normalize(v)).collect();
    all.sort_by(f64::total_cmp);
    all.dedup_by(|a, b| a.total_cmp(b) == Ordering::Equal);
    all
}

/// Start index of a tile's axis in the global axis, and whether it runs
/// backwards.
fn locate(
    index: usize,
    axis: &'static str,
    global: &[f64],
    coords: &[f64],
) -> Result<(usize, bool), MergeError> {
    let position = |v: f64| {
        global
            .binary_search_by(|probe| probe.total_cmp(&normalize(v)))
            .map_err(|_| MergeError::MalformedTile {
                index,
                reason: format!("coordinate {} missing from mosaic axis", v),
            })
    };
    let start = position(coords[0])?;
    let end = position(coords[coords.len() - 1])?;
    let (lo, hi) = (start.min(end), start.max(end));

    let found = hi - lo + 1;
    if found != coords.len() {
        return Err(MergeError::MisalignedTile {
            index,
            axis,
            expected: coords.len(),
            found,
        });
    }
    Ok((lo, start > end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{TileCoord, TileGrid, TileId};

    fn solid(size: u32, value: u8) -> PixelGrid {
        PixelGrid::filled(size, size, ColorMode::Luma, [value, 0, 0, 0])
    }

    fn sample(grid: &TileGrid, x: u32, y: u32, zoom: u8, pixels: PixelGrid) -> TileSample {
        let id = TileId::Cartesian(TileCoord::new(x, y, zoom).unwrap());
        TileSample::from_raster(TileRaster::new(pixels, grid.bounding_box(&id), Origin::Lower))
    }

    /// Luma grid whose value is the row index.
    fn row_ramp(size: u32) -> PixelGrid {
        let data = (0..size).flat_map(|r| std::iter::repeat(r as u8).take(size as usize));
        PixelGrid::from_raw(size, size, ColorMode::Luma, data.collect()).unwrap()
    }

    #[test]
    fn test_linspace_endpoints_exact() {
        let xs = linspace(-1.5, 2.25, 7);
        assert_eq!(xs.len(), 7);
        assert_eq!(xs[0], -1.5);
        assert_eq!(xs[6], 2.25);
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(linspace(3.0, 4.0, 1), vec![3.0]);
        assert!(linspace(3.0, 4.0, 0).is_empty());
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(merge(&[]), Err(MergeError::EmptyInput)));
    }

    #[test]
    fn test_single_tile_identity() {
        let grid = TileGrid::web_mercator();
        let tile = sample(&grid, 2, 1, 2, row_ramp(8));
        let mosaic = merge(std::slice::from_ref(&tile)).unwrap();

        let id = TileId::Cartesian(TileCoord::new(2, 1, 2).unwrap());
        assert_eq!(*mosaic.extent(), grid.bounding_box(&id));
        assert_eq!(mosaic.pixels(), &tile.pixels);
        assert_eq!(mosaic.origin(), Origin::Lower);
        assert!(mosaic.is_complete());
    }

    #[test]
    fn test_upper_origin_rows_reversed() {
        let grid = TileGrid::web_mercator();
        let mut tile = sample(&grid, 0, 0, 1, row_ramp(4));
        tile.origin = Origin::Upper;

        let mosaic = merge(&[tile]).unwrap();
        assert_eq!(mosaic.pixels().row(0), &[3, 3, 3, 3]);
        assert_eq!(mosaic.pixels().row(3), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_descending_xs_reverse_columns() {
        let data = vec![1, 2, 3, 4, 5, 6];
        let pixels = PixelGrid::from_raw(3, 2, ColorMode::Luma, data).unwrap();
        let tile = TileSample::new(pixels, vec![2.0, 1.0, 0.0], vec![0.0, 1.0], Origin::Lower);

        let mosaic = merge(&[tile]).unwrap();
        assert_eq!(mosaic.pixels().row(0), &[3, 2, 1]);
        assert_eq!(mosaic.pixels().row(1), &[6, 5, 4]);
        assert_eq!(mosaic.extent().as_tuple(), (0.0, 2.0, 0.0, 1.0));
    }

    #[test]
    fn test_children_reconstruct_parent_extent() {
        let grid = TileGrid::web_mercator();
        let size = 16;
        let tiles = vec![
            sample(&grid, 2, 2, 2, solid(size, 10)),
            sample(&grid, 3, 2, 2, solid(size, 20)),
            sample(&grid, 2, 3, 2, solid(size, 30)),
            sample(&grid, 3, 3, 2, solid(size, 40)),
        ];
        let mosaic = merge(&tiles).unwrap();

        let parent = TileId::Cartesian(TileCoord::new(1, 1, 1).unwrap());
        assert_eq!(*mosaic.extent(), grid.bounding_box(&parent));
        assert_eq!((mosaic.width(), mosaic.height()), (2 * size - 1, 2 * size - 1));
        assert!(mosaic.is_complete());

        // Lower origin: row 0 is the south edge, where the y=3 tiles sit.
        let last = 2 * size - 2;
        assert_eq!(mosaic.pixels().pixel(0, 0), &[30]);
        assert_eq!(mosaic.pixels().pixel(last, 0), &[40]);
        assert_eq!(mosaic.pixels().pixel(0, last), &[10]);
        assert_eq!(mosaic.pixels().pixel(last, last), &[20]);
    }

    #[test]
    fn test_missing_tile_leaves_hole() {
        let grid = TileGrid::web_mercator();
        let tiles = vec![
            sample(&grid, 0, 0, 1, solid(4, 9)),
            sample(&grid, 1, 1, 1, solid(4, 9)),
        ];
        let mosaic = merge(&tiles).unwrap();

        assert!(!mosaic.is_complete());
        // SW quadrant (0, 1) is missing.
        assert_eq!(mosaic.coverage().get_pixel(0, 0).0[0], 0);
        assert_eq!(mosaic.pixels().pixel(0, 0), &[0]);
        assert_eq!(mosaic.coverage().get_pixel(6, 0).0[0], COVERED);
        let ratio = mosaic.coverage_ratio();
        assert!(ratio > 0.6 && ratio < 0.7, "ratio = {}", ratio);
    }

    #[test]
    fn test_input_order_irrelevant() {
        let grid = TileGrid::web_mercator();
        let a = sample(&grid, 0, 0, 1, solid(4, 1));
        let b = sample(&grid, 1, 0, 1, solid(4, 2));
        let c = sample(&grid, 0, 1, 1, solid(4, 3));

        let forward = merge(&[a.clone(), b.clone(), c.clone()]).unwrap();
        let backward = merge(&[c, b, a]).unwrap();
        assert_eq!(forward.pixels(), backward.pixels());
        assert_eq!(forward.coverage(), backward.coverage());
    }

    #[test]
    fn test_mixed_zoom_is_misaligned() {
        let grid = TileGrid::web_mercator();
        let tiles = vec![
            sample(&grid, 0, 0, 1, solid(4, 1)),
            sample(&grid, 0, 0, 2, solid(4, 2)),
        ];
        assert!(matches!(
            merge(&tiles),
            Err(MergeError::MisalignedTile { .. })
        ));
    }

    #[test]
    fn test_coordinate_count_mismatch() {
        let tile = TileSample::new(solid(2, 1), vec![0.0], vec![0.0, 1.0], Origin::Lower);
        assert!(matches!(
            merge(&[tile]),
            Err(MergeError::MalformedTile { index: 0, .. })
        ));
    }

    #[test]
    fn test_oversized_mosaic_rejected_before_allocation() {
        // A tall strip and a wide strip far apart span a 50001x50001 grid.
        let n = 50_000;
        let tall = TileSample::new(
            PixelGrid::filled(1, n as u32, ColorMode::Luma, [1, 0, 0, 0]),
            vec![0.0],
            linspace(0.0, 1.0, n),
            Origin::Lower,
        );
        let wide = TileSample::new(
            PixelGrid::filled(n as u32, 1, ColorMode::Luma, [2, 0, 0, 0]),
            linspace(2.0, 3.0, n),
            vec![5.0],
            Origin::Lower,
        );
        assert!(matches!(
            merge(&[tall, wide]),
            Err(MergeError::TooLarge {
                width: 50_001,
                height: 50_001
            })
        ));
    }

    #[test]
    fn test_color_mode_mismatch() {
        let grid = TileGrid::web_mercator();
        let rgb = PixelGrid::filled(4, 4, ColorMode::Rgb, [1, 1, 1, 1]);
        let tiles = vec![
            sample(&grid, 0, 0, 1, solid(4, 1)),
            sample(&grid, 1, 0, 1, rgb),
        ];
        assert!(matches!(
            merge(&tiles),
            Err(MergeError::ColorModeMismatch { index: 1, .. })
        ));
    }

    #[test]
    fn test_rgba_export_is_north_up_with_alpha() {
        let grid = TileGrid::web_mercator();
        let tiles = vec![sample(&grid, 0, 1, 1, solid(4, 77))];
        // Single SW tile: full coverage, so alpha is opaque everywhere.
        let image = merge(&tiles).unwrap().to_rgba_image();
        assert_eq!(image.get_pixel(0, 0).0, [77, 77, 77, 255]);

        let tiles = vec![
            sample(&grid, 0, 0, 1, solid(4, 5)),
            sample(&grid, 1, 1, 1, solid(4, 6)),
        ];
        let image = merge(&tiles).unwrap().to_rgba_image();
        // Top-left of a north-up image is the NW tile.
        assert_eq!(image.get_pixel(0, 0).0, [5, 5, 5, 255]);
        // Bottom-left is the missing SW tile.
        assert_eq!(image.get_pixel(0, 6).0[3], 0);
    }
}

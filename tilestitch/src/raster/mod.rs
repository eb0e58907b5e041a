//! Tile rasters
//!
//! Decoded pixel grids, the color modes they are normalized to, and the
//! placeholder substituted for tiles the provider could not deliver.

mod grid;

pub use grid::{ColorMode, PixelGrid};

use thiserror::Error;

use crate::coord::{Extent, Origin};

/// Grey level of the placeholder raster.
pub const PLACEHOLDER_GRAY: u8 = 250;

/// Errors that can occur while decoding or validating a raster.
#[derive(Debug, Error)]
pub enum RasterError {
    /// Buffer length does not match `width * height * channels`.
    #[error("Pixel buffer has {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Width or height is zero.
    #[error("Pixel grid has zero width or height")]
    EmptyGrid,

    /// Wire bytes are not a decodable image.
    #[error("Failed to decode tile image: {0}")]
    Decode(#[from] image::ImageError),
}

/// One resolved tile: pixels, where they sit, and which way up they are.
#[derive(Debug, Clone, PartialEq)]
pub struct TileRaster {
    pixels: PixelGrid,
    extent: Extent,
    origin: Origin,
}

impl TileRaster {
    pub fn new(pixels: PixelGrid, extent: Extent, origin: Origin) -> Self {
        Self {
            pixels,
            extent,
            origin,
        }
    }

    pub fn pixels(&self) -> &PixelGrid {
        &self.pixels
    }

    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn into_parts(self) -> (PixelGrid, Extent, Origin) {
        (self.pixels, self.extent, self.origin)
    }
}

/// Solid light-grey square stood in for a tile that failed to download.
pub fn placeholder(size: u32, mode: ColorMode) -> PixelGrid {
    PixelGrid::filled(
        size,
        size,
        mode,
        [PLACEHOLDER_GRAY, PLACEHOLDER_GRAY, PLACEHOLDER_GRAY, u8::MAX],
    )
}

/// Decodes wire bytes (PNG, JPEG, ...) and normalizes the color mode.
pub fn decode_tile(bytes: &[u8], mode: ColorMode) -> Result<PixelGrid, RasterError> {
    let image = image::load_from_memory(bytes)?;
    let grid = PixelGrid::from_image(&image, mode);
    grid.validate()?;
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 7]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_placeholder_is_light_gray() {
        let grid = placeholder(256, ColorMode::Rgb);
        assert_eq!((grid.width(), grid.height()), (256, 256));
        assert!(grid.data().iter().all(|&b| b == PLACEHOLDER_GRAY));
    }

    #[test]
    fn test_placeholder_rgba_is_opaque() {
        let grid = placeholder(4, ColorMode::Rgba);
        assert_eq!(grid.pixel(3, 3), &[250, 250, 250, 255]);
    }

    #[test]
    fn test_decode_png() {
        let grid = decode_tile(&png_bytes(8, 4), ColorMode::Rgb).unwrap();
        assert_eq!((grid.width(), grid.height()), (8, 4));
        assert_eq!(grid.pixel(5, 2), &[5, 2, 7]);
    }

    #[test]
    fn test_decode_normalizes_to_luma() {
        let grid = decode_tile(&png_bytes(2, 2), ColorMode::Luma).unwrap();
        assert_eq!(grid.channels(), 1);
        assert_eq!(grid.data().len(), 4);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = decode_tile(b"<html>rate limited</html>", ColorMode::Rgb);
        assert!(matches!(result, Err(RasterError::Decode(_))));
    }
}

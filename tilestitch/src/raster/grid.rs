//! Decoded pixel grids.

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

use super::RasterError;

/// Channel layout of a decoded raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorMode {
    /// Single grey channel
    Luma,
    /// Three channels, the usual form for map tiles
    #[default]
    Rgb,
    /// Four channels with alpha
    Rgba,
}

impl ColorMode {
    /// Bytes per pixel.
    pub fn channels(&self) -> usize {
        match self {
            ColorMode::Luma => 1,
            ColorMode::Rgb => 3,
            ColorMode::Rgba => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Luma => "luma",
            ColorMode::Rgb => "rgb",
            ColorMode::Rgba => "rgba",
        }
    }
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ColorMode {
    type Err = ();

    /// Parses `luma`, `rgb` or `rgba` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "luma" | "l" | "gray" => Ok(Self::Luma),
            "rgb" => Ok(Self::Rgb),
            "rgba" => Ok(Self::Rgba),
            _ => Err(()),
        }
    }
}

/// A row-major, interleaved 8-bit pixel grid.
///
/// This is the lossless form the tile cache persists, so cache hits never
/// touch the wire codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    mode: ColorMode,
    data: Vec<u8>,
}

impl PixelGrid {
    /// Zero-filled grid.
    pub fn new(width: u32, height: u32, mode: ColorMode) -> Self {
        let len = width as usize * height as usize * mode.channels();
        Self {
            width,
            height,
            mode,
            data: vec![0; len],
        }
    }

    /// Grid with every pixel set to `color`, truncated to the mode's channels.
    pub fn filled(width: u32, height: u32, mode: ColorMode, color: [u8; 4]) -> Self {
        let pixel = &color[..mode.channels()];
        let count = width as usize * height as usize;
        Self {
            width,
            height,
            mode,
            data: pixel.repeat(count),
        }
    }

    /// Wraps raw interleaved bytes, checking the length.
    pub fn from_raw(
        width: u32,
        height: u32,
        mode: ColorMode,
        data: Vec<u8>,
    ) -> Result<Self, RasterError> {
        let grid = Self {
            width,
            height,
            mode,
            data,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Converts a decoded image to the requested color mode.
    pub fn from_image(image: &DynamicImage, mode: ColorMode) -> Self {
        let (width, height) = (image.width(), image.height());
        let data = match mode {
            ColorMode::Luma => image.to_luma8().into_raw(),
            ColorMode::Rgb => image.to_rgb8().into_raw(),
            ColorMode::Rgba => image.to_rgba8().into_raw(),
        };
        Self {
            width,
            height,
            mode,
            data,
        }
    }

    /// Converts back to an `image` buffer of the matching type.
    pub fn to_image(&self) -> Result<DynamicImage, RasterError> {
        let data = self.data.clone();
        let image = match self.mode {
            ColorMode::Luma => {
                GrayImage::from_raw(self.width, self.height, data).map(DynamicImage::ImageLuma8)
            }
            ColorMode::Rgb => {
                RgbImage::from_raw(self.width, self.height, data).map(DynamicImage::ImageRgb8)
            }
            ColorMode::Rgba => {
                RgbaImage::from_raw(self.width, self.height, data).map(DynamicImage::ImageRgba8)
            }
        };
        image.ok_or(RasterError::SizeMismatch {
            expected: self.expected_len(),
            actual: self.data.len(),
        })
    }

    /// Checks that the buffer length matches the dimensions.
    ///
    /// Needed after deserializing, since the persisted form is untrusted.
    pub fn validate(&self) -> Result<(), RasterError> {
        if self.width == 0 || self.height == 0 {
            return Err(RasterError::EmptyGrid);
        }
        let expected = self.expected_len();
        if self.data.len() != expected {
            return Err(RasterError::SizeMismatch {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    pub fn channels(&self) -> usize {
        self.mode.channels()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Bytes in one row.
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels()
    }

    /// Row `y`, top of the buffer first.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    pub(crate) fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    /// Channels of pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let channels = self.channels();
        let start = y as usize * self.stride() + x as usize * channels;
        &self.data[start..start + channels]
    }

    /// Reverses the row order in place.
    pub fn flip_rows(&mut self) {
        let stride = self.stride();
        if stride == 0 {
            return;
        }
        let rows = self.height as usize;
        for top in 0..rows / 2 {
            let bottom = rows - 1 - top;
            let (head, tail) = self.data.split_at_mut(bottom * stride);
            head[top * stride..(top + 1) * stride].swap_with_slice(&mut tail[..stride]);
        }
    }

    fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.mode.channels()
    }
}

use image::{GrayImage, Luma, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SegmentError};

/// Pixel value used for foreground in a [`BinaryMask`].
pub const FOREGROUND: u8 = 255;

/// Axis-aligned bounding box in integer page-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box spanning the inclusive pixel extents `[x0, x1] x [y0, y1]`.
    pub fn from_extents(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1)
    }

    /// Exclusive right edge, saturating at `u32::MAX`.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge, saturating at `u32::MAX`.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// True when the box is non-degenerate and lies fully inside a
    /// `width` x `height` page.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        let right = self.x.checked_add(self.width);
        let bottom = self.y.checked_add(self.height);
        self.width > 0
            && self.height > 0
            && right.map_or(false, |r| r <= width)
            && bottom.map_or(false, |b| b <= height)
    }

    /// Intersection with a `width` x `height` page, or `None` if empty.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<BoundingBox> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let right = self.right().min(width);
        let bottom = self.bottom().min(height);
        if right <= self.x || bottom <= self.y {
            return None;
        }
        Some(BoundingBox::new(self.x, self.y, right - self.x, bottom - self.y))
    }
}

/// Rectangular structuring element, `width` columns by `height` rows.
///
/// A zero dimension makes the element a no-op along that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuringElement {
    pub width: u32,
    pub height: u32,
}

impl StructuringElement {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Square `size` x `size` element.
    pub const fn square(size: u32) -> Self {
        Self::new(size, size)
    }

    /// Tall-thin element (one column, `length` rows): keeps vertical strokes.
    pub const fn vertical(length: u32) -> Self {
        Self::new(1, length)
    }

    /// Short-wide element (one row, `length` columns): keeps horizontal strokes.
    pub const fn horizontal(length: u32) -> Self {
        Self::new(length, 1)
    }
}

/// Foreground/background mask with fixed dimensions.
///
/// Stored as an 8-bit image where any non-zero pixel is foreground; the
/// crate itself only ever writes `0` or [`FOREGROUND`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    pixels: GrayImage,
}

impl BinaryMask {
    /// All-background mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: GrayImage::new(width, height),
        }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let pixels = GrayImage::from_fn(width, height, |x, y| {
            Luma([if f(x, y) { FOREGROUND } else { 0 }])
        });
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.pixels.get_pixel(x, y)[0] > 0
    }

    pub fn set(&mut self, x: u32, y: u32, foreground: bool) {
        let v = if foreground { FOREGROUND } else { 0 };
        self.pixels.put_pixel(x, y, Luma([v]));
    }

    pub fn count_foreground(&self) -> usize {
        self.pixels.as_raw().iter().filter(|&&v| v > 0).count()
    }

    /// True when no pixel is foreground.
    pub fn is_empty(&self) -> bool {
        self.pixels.as_raw().iter().all(|&v| v == 0)
    }

    /// Set every pixel inside `bbox` (clamped to the mask) to background.
    pub fn clear_rect(&mut self, bbox: &BoundingBox) {
        let Some(r) = bbox.clamp_to(self.width(), self.height()) else {
            return;
        };
        let w = self.width() as usize;
        let data: &mut [u8] = &mut self.pixels;
        for y in r.y..r.bottom() {
            let row = y as usize * w;
            data[row + r.x as usize..row + r.right() as usize].fill(0);
        }
    }

    /// Pixel-wise OR of two masks of the same dimensions.
    pub fn union(&self, other: &BinaryMask) -> Result<BinaryMask> {
        if self.dimensions() != other.dimensions() {
            return Err(SegmentError::InvalidInput(format!(
                "mask dimensions differ: {:?} vs {:?}",
                self.dimensions(),
                other.dimensions()
            )));
        }
        let mut out = self.clone();
        let dst: &mut [u8] = &mut out.pixels;
        for (d, &s) in dst.iter_mut().zip(other.pixels.as_raw()) {
            *d = d.saturating_add(s);
        }
        Ok(out)
    }

    /// Raw row-major pixels, one byte per pixel.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Mutable raw pixels. Length and dimensions are fixed.
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.pixels
    }
}

/// Raw image data as handed over by a decoder or a caller.
#[derive(Debug, Clone)]
pub struct RawImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub channels: u32,
}

impl RawImage {
    /// Convert to an RGB page image.
    ///
    /// Accepts 1 (gray), 3 (RGB) and 4 (RGBA, alpha dropped) channels.
    pub fn into_rgb(self) -> Result<RgbImage> {
        if self.width == 0 || self.height == 0 {
            return Err(SegmentError::InvalidInput(format!(
                "empty image: {}x{}",
                self.width, self.height
            )));
        }
        let expected = self.width as usize * self.height as usize * self.channels as usize;
        if self.data.len() != expected {
            return Err(SegmentError::InvalidInput(format!(
                "buffer holds {} bytes, {}x{}x{} needs {}",
                self.data.len(),
                self.width,
                self.height,
                self.channels,
                expected
            )));
        }

        let rgb: Vec<u8> = match self.channels {
            3 => self.data,
            1 => self.data.iter().flat_map(|&v| [v, v, v]).collect(),
            4 => self
                .data
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect(),
            n => {
                return Err(SegmentError::InvalidInput(format!(
                    "unsupported channel count: {n}"
                )))
            }
        };

        RgbImage::from_raw(self.width, self.height, rgb)
            .ok_or_else(|| SegmentError::InvalidInput("pixel buffer too small".into()))
    }
}

/// One cropped paragraph in reading order.
#[derive(Debug, Clone)]
pub struct Paragraph {
    /// 1-based position in the reading-order sequence.
    pub index: usize,
    pub bbox: BoundingBox,
    pub image: RgbImage,
}

/// Layout summary of a single page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub width: u32,
    pub height: u32,
    /// Grayscale level used to split ink from paper.
    pub threshold: u8,
    /// Table regions erased before block extraction.
    pub tables: Vec<BoundingBox>,
    /// Paragraph boxes in reading order.
    pub paragraphs: Vec<BoundingBox>,
}

/// Timing information for pipeline stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingInfo {
    pub binarize_ms: f32,
    pub tables_ms: f32,
    pub blocks_ms: f32,
    pub order_ms: f32,
    pub crop_ms: f32,
    pub total_ms: f32,
}

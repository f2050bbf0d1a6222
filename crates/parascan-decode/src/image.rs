use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, ImageReader, RgbImage};

use parascan_core::{Result, SegmentError};

/// Decodes page files (PNG, JPEG, TIFF, BMP) into RGB page images.
///
/// CPU decode via the `image` crate. Alpha is dropped and grayscale is
/// expanded to three channels so every page reaches the pipeline as RGB.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    /// Pages larger than this many pixels are rejected.
    max_pixels: u64,
}

impl Default for ImageDecoder {
    fn default() -> Self {
        Self {
            // A4 at 600 DPI is ~35 MP.
            max_pixels: 100_000_000,
        }
    }
}

impl ImageDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    /// Decode image bytes into a page image.
    pub fn decode(&self, data: &[u8]) -> Result<RgbImage> {
        if data.is_empty() {
            return Err(SegmentError::InvalidInput("empty image data".into()));
        }

        // Read the header first so oversized pages are refused before any
        // pixel buffer is allocated.
        let header = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let format = header
            .format()
            .ok_or_else(|| SegmentError::ImageDecode("unrecognized image format".into()))?;
        let (width, height) = header
            .into_dimensions()
            .map_err(|e| SegmentError::ImageDecode(e.to_string()))?;
        self.check_dimensions(width, height)?;

        let img = image::load_from_memory_with_format(data, format)
            .map_err(|e| SegmentError::ImageDecode(e.to_string()))?;
        let rgb = img.to_rgb8();

        tracing::debug!(
            format = ?format,
            width = rgb.width(),
            height = rgb.height(),
            "decoded page"
        );

        Ok(rgb)
    }

    /// Read and decode a page file.
    pub fn open(&self, path: &Path) -> Result<RgbImage> {
        let data = std::fs::read(path)?;
        self.decode(&data)
    }

    fn check_dimensions(&self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(SegmentError::InvalidInput(format!(
                "image is empty: {width}x{height}"
            )));
        }
        let pixels = width as u64 * height as u64;
        if pixels > self.max_pixels {
            return Err(SegmentError::InvalidInput(format!(
                "page has {pixels} pixels, limit is {}",
                self.max_pixels
            )));
        }
        Ok(())
    }
}

/// Encode an image as PNG bytes.
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| SegmentError::ImageEncode(e.to_string()))?;
    Ok(buf.into_inner())
}

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use parascan_core::{Paragraph, Result, SegmentError};

/// File name for the `index`-th paragraph (1-based) cropped from `source`.
///
/// `source` is the page's file name including its extension, so
/// `001.png` gives `001.png_Paragraph_1.jpg`.
pub fn paragraph_file_name(source: &str, index: usize) -> String {
    format!("{source}_Paragraph_{index}.jpg")
}

/// Writes paragraph crops as JPEG files into one directory.
#[derive(Debug, Clone)]
pub struct ParagraphWriter {
    output_dir: PathBuf,
    quality: u8,
}

impl ParagraphWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            quality: 90,
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write every paragraph of one page. Returns the written paths in
    /// reading order.
    pub fn write_all(&self, source: &str, paragraphs: &[Paragraph]) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.output_dir)?;
        paragraphs
            .iter()
            .map(|p| self.write(source, p))
            .collect()
    }

    pub fn write(&self, source: &str, paragraph: &Paragraph) -> Result<PathBuf> {
        let path = self
            .output_dir
            .join(paragraph_file_name(source, paragraph.index));
        let mut file = BufWriter::new(File::create(&path)?);
        encode_jpeg(&mut file, &paragraph.image, self.quality)?;
        file.flush()?;
        tracing::trace!(path = %path.display(), "wrote paragraph");
        Ok(path)
    }
}

fn encode_jpeg<W: Write>(writer: W, img: &RgbImage, quality: u8) -> Result<()> {
    let mut encoder = JpegEncoder::new_with_quality(writer, quality);
    encoder
        .encode_image(img)
        .map_err(|e| SegmentError::ImageEncode(e.to_string()))
}

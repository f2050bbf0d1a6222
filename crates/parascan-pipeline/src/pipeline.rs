use std::time::Instant;

use image::{imageops, RgbImage};

use parascan_core::{
    BoundingBox, Morphology, PageLayout, Paragraph, RawImage, Result, SegmentError, TimingInfo,
};
use parascan_detect::{BlockExtractor, ColumnClassifier};
use parascan_preprocess::{Binarizer, CpuMorphology, TableSuppressor};

use crate::config::SegmentConfig;
use crate::scheduler::PageScheduler;

/// The full segmentation pipeline: binarize → suppress tables → extract
/// blocks → order columns → crop.
///
/// Holds no per-page state; one pipeline can segment any number of pages,
/// from any number of threads.
pub struct SegmentPipeline {
    morphology: Box<dyn Morphology>,
    binarizer: Binarizer,
    tables: TableSuppressor,
    blocks: BlockExtractor,
    columns: ColumnClassifier,
}

impl SegmentPipeline {
    /// Build the pipeline on the CPU morphology backend.
    pub fn build(config: SegmentConfig) -> Result<Self> {
        Self::with_morphology(config, Box::new(CpuMorphology::new()))
    }

    /// Build the pipeline on a caller-supplied morphology backend.
    pub fn with_morphology(config: SegmentConfig, morphology: Box<dyn Morphology>) -> Result<Self> {
        config.validate()?;

        tracing::info!(
            backend = morphology.name(),
            tables = config.tables.enabled,
            block_iterations = config.blocks.iterations,
            "segment pipeline ready"
        );

        Ok(Self {
            binarizer: Binarizer::new(config.binarize),
            tables: TableSuppressor::new(config.tables),
            blocks: BlockExtractor::new(config.blocks),
            columns: ColumnClassifier::new(config.columns),
            morphology,
        })
    }

    /// Run stages 1-4 and return the page layout.
    pub fn layout(&self, page: &RgbImage) -> Result<PageLayout> {
        self.layout_timed(page).map(|(layout, _)| layout)
    }

    /// Like [`layout`](Self::layout), with per-stage timings.
    pub fn layout_timed(&self, page: &RgbImage) -> Result<(PageLayout, TimingInfo)> {
        let (width, height) = page.dimensions();
        if width == 0 || height == 0 {
            return Err(SegmentError::InvalidInput(format!(
                "page is empty: {width}x{height}"
            )));
        }

        let total_start = Instant::now();
        let mut timing = TimingInfo::default();
        let morph = self.morphology.as_ref();

        // Stage 1: Binarize.
        let start = Instant::now();
        let binarized = self.binarizer.binarize(page);
        let threshold = binarized.threshold;
        let mut mask = binarized.mask;
        timing.binarize_ms = elapsed_ms(start);

        // Stage 2: Erase table regions.
        let start = Instant::now();
        let tables = self.tables.suppress(morph, &mut mask)?;
        timing.tables_ms = elapsed_ms(start);

        // Stage 3: Paragraph blocks.
        let start = Instant::now();
        let blocks = self.blocks.extract(morph, &mask);
        timing.blocks_ms = elapsed_ms(start);
        drop(mask);

        // Stage 4: Reading order.
        let start = Instant::now();
        let paragraphs = self.columns.order(&blocks);
        timing.order_ms = elapsed_ms(start);

        timing.total_ms = elapsed_ms(total_start);

        tracing::debug!(
            width,
            height,
            threshold,
            tables = tables.len(),
            paragraphs = paragraphs.len(),
            total_ms = timing.total_ms,
            "page layout"
        );

        Ok((
            PageLayout {
                width,
                height,
                threshold,
                tables,
                paragraphs,
            },
            timing,
        ))
    }

    /// Segment a page into paragraph crops in reading order.
    pub fn segment_page(&self, page: &RgbImage) -> Result<Vec<Paragraph>> {
        self.segment_page_with_layout(page)
            .map(|(_, paragraphs, _)| paragraphs)
    }

    /// Segment a page, also returning its layout and timings.
    pub fn segment_page_with_layout(
        &self,
        page: &RgbImage,
    ) -> Result<(PageLayout, Vec<Paragraph>, TimingInfo)> {
        let (layout, mut timing) = self.layout_timed(page)?;

        let start = Instant::now();
        let paragraphs = crop_paragraphs(page, &layout.paragraphs)?;
        timing.crop_ms = elapsed_ms(start);
        timing.total_ms += timing.crop_ms;

        Ok((layout, paragraphs, timing))
    }

    /// Segment a raw pixel buffer.
    pub fn segment_raw(&self, raw: RawImage) -> Result<Vec<Paragraph>> {
        let page = raw.into_rgb()?;
        self.segment_page(&page)
    }

    /// Segment many pages on `workers` threads.
    ///
    /// Results come back in page order, one per page. A failing page does
    /// not affect the others.
    pub fn segment_batch(&self, pages: &[RgbImage], workers: usize) -> Vec<Result<Vec<Paragraph>>> {
        let scheduler = PageScheduler::new(workers);
        let results = scheduler.run(pages.len(), |i| self.segment_page(&pages[i]));

        let failed = results.iter().filter(|r| r.is_err()).count();
        tracing::info!(pages = pages.len(), failed, "batch complete");

        results
    }
}

/// Segment one page with `config` on the CPU backend.
pub fn segment_page(page: &RgbImage, config: &SegmentConfig) -> Result<Vec<Paragraph>> {
    SegmentPipeline::build(config.clone())?.segment_page(page)
}

/// Crop `boxes` out of `page`, numbering them from 1 in the given order.
pub fn crop_paragraphs(page: &RgbImage, boxes: &[BoundingBox]) -> Result<Vec<Paragraph>> {
    let (width, height) = page.dimensions();
    boxes
        .iter()
        .enumerate()
        .map(|(i, bbox)| {
            if !bbox.fits_within(width, height) {
                return Err(SegmentError::InvalidInput(format!(
                    "box {bbox:?} outside {width}x{height} page"
                )));
            }
            let image =
                imageops::crop_imm(page, bbox.x, bbox.y, bbox.width, bbox.height).to_image();
            Ok(Paragraph {
                index: i + 1,
                bbox: *bbox,
                image,
            })
        })
        .collect()
}

fn elapsed_ms(start: Instant) -> f32 {
    start.elapsed().as_secs_f32() * 1000.0
}

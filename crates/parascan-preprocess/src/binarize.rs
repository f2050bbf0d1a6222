use image::{GrayImage, Luma, RgbImage};
use imageproc::contrast::otsu_level;
use serde::{Deserialize, Serialize};

use parascan_core::{BinaryMask, FOREGROUND};

/// How the ink/paper threshold is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ThresholdMethod {
    /// Otsu's method: the level that minimizes intra-class variance of the
    /// page's luma histogram.
    #[default]
    Otsu,
    /// A fixed grayscale level.
    Fixed { level: u8 },
}

/// Parameters for global binarization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarizeParams {
    pub method: ThresholdMethod,
}

/// Output of the binarizer.
#[derive(Debug, Clone)]
pub struct Binarized {
    /// Inverted mask: pixels with luma `<= threshold` are foreground (ink).
    pub mask: BinaryMask,
    /// Level the page was split at.
    pub threshold: u8,
}

/// Global, inverted binarization of a page.
#[derive(Debug, Clone, Default)]
pub struct Binarizer {
    params: BinarizeParams,
}

impl Binarizer {
    pub fn new(params: BinarizeParams) -> Self {
        Self { params }
    }

    pub fn binarize(&self, page: &RgbImage) -> Binarized {
        self.binarize_gray(&to_luma(page))
    }

    pub fn binarize_gray(&self, gray: &GrayImage) -> Binarized {
        let threshold = match self.params.method {
            ThresholdMethod::Fixed { level } => level,
            ThresholdMethod::Otsu => match uniform_level(gray) {
                // No second class to separate; report a blank page.
                Some(level) => {
                    tracing::debug!(level, "uniform page, empty mask");
                    return Binarized {
                        mask: BinaryMask::new(gray.width(), gray.height()),
                        threshold: level,
                    };
                }
                None => otsu_level(gray),
            },
        };

        let mut mask = BinaryMask::new(gray.width(), gray.height());
        for (dst, &src) in mask.as_raw_mut().iter_mut().zip(gray.as_raw()) {
            *dst = if src <= threshold { FOREGROUND } else { 0 };
        }

        tracing::debug!(
            threshold,
            foreground = mask.count_foreground(),
            "binarized page"
        );

        Binarized { mask, threshold }
    }
}

/// RGB to grayscale with fixed-point BT.601 luma.
pub fn to_luma(page: &RgbImage) -> GrayImage {
    let mut gray = GrayImage::new(page.width(), page.height());
    for (dst, src) in gray.pixels_mut().zip(page.pixels()) {
        let r = src[0] as u32;
        let g = src[1] as u32;
        let b = src[2] as u32;
        *dst = Luma([((r * 77 + g * 150 + b * 29) >> 8) as u8]);
    }
    gray
}

/// The single intensity of a uniform image, or `None` if the image has at
/// least two distinct levels (or no pixels).
fn uniform_level(gray: &GrayImage) -> Option<u8> {
    let mut pixels = gray.as_raw().iter();
    let first = *pixels.next()?;
    pixels.all(|&v| v == first).then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn page_with_ink(w: u32, h: u32, ink: impl Fn(u32, u32) -> bool) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            if ink(x, y) {
                Rgb([20, 20, 20])
            } else {
                Rgb([245, 245, 245])
            }
        })
    }

    #[test]
    fn blank_white_page_gives_empty_mask() {
        let page = RgbImage::from_pixel(64, 48, Rgb([255, 255, 255]));
        let out = Binarizer::default().binarize(&page);
        assert!(out.mask.is_empty());
        assert_eq!(out.mask.dimensions(), (64, 48));
    }

    #[test]
    fn uniform_dark_page_is_not_an_error() {
        let page = RgbImage::from_pixel(16, 16, Rgb([0, 0, 0]));
        let out = Binarizer::default().binarize(&page);
        assert!(out.mask.is_empty());
        assert_eq!(out.threshold, 0);
    }

    #[test]
    fn dark_ink_becomes_foreground() {
        let page = page_with_ink(40, 40, |x, y| (10..20).contains(&x) && (5..30).contains(&y));
        let out = Binarizer::default().binarize(&page);
        assert_eq!(out.mask.count_foreground(), 10 * 25);
        assert!(out.mask.get(10, 5));
        assert!(!out.mask.get(0, 0));
        assert!(out.threshold >= 20 && out.threshold < 245);
    }

    #[test]
    fn threshold_is_data_driven() {
        // Same layout, different paper/ink tones: both split cleanly.
        for (ink, paper) in [(0u8, 255u8), (90, 160), (140, 200)] {
            let page = RgbImage::from_fn(20, 20, |x, _| {
                let v = if x < 5 { ink } else { paper };
                Rgb([v, v, v])
            });
            let out = Binarizer::default().binarize(&page);
            assert_eq!(out.mask.count_foreground(), 5 * 20, "ink={ink} paper={paper}");
        }
    }

    #[test]
    fn fixed_threshold_is_inclusive() {
        let gray = GrayImage::from_raw(3, 1, vec![99, 100, 101]).unwrap();
        let out = Binarizer::new(BinarizeParams {
            method: ThresholdMethod::Fixed { level: 100 },
        })
        .binarize_gray(&gray);
        assert_eq!(out.mask.as_raw(), &[255, 255, 0]);
        assert_eq!(out.threshold, 100);
    }

    #[test]
    fn luma_weights() {
        let page = RgbImage::from_fn(3, 1, |x, _| match x {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([0, 255, 0]),
            _ => Rgb([255, 255, 255]),
        });
        let gray = to_luma(&page);
        assert_eq!(gray.get_pixel(0, 0)[0], 76);
        assert_eq!(gray.get_pixel(1, 0)[0], 149);
        assert_eq!(gray.get_pixel(2, 0)[0], 255);
    }
}

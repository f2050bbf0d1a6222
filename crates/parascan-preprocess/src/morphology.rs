use parascan_core::{BinaryMask, BoundingBox, Morphology, StructuringElement, FOREGROUND};

use crate::contour;

/// CPU morphology backend.
///
/// Rectangular elements are separable, so every erosion or dilation runs as
/// a horizontal pass followed by a vertical pass. Each pass is a sliding
/// window that keeps a running count of "hit" pixels, which makes the cost
/// independent of the element size. The anchor sits at `size / 2`, the same
/// convention OpenCV uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuMorphology;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Erode,
    Dilate,
}

impl Pass {
    /// Pixels the window counts: background for erosion, foreground for
    /// dilation. Pixels outside the page are never counted.
    #[inline]
    fn hits(self, v: u8) -> bool {
        match self {
            Pass::Erode => v == 0,
            Pass::Dilate => v > 0,
        }
    }

    #[inline]
    fn emit(self, count: usize) -> u8 {
        let fg = match self {
            Pass::Erode => count == 0,
            Pass::Dilate => count > 0,
        };
        if fg {
            FOREGROUND
        } else {
            0
        }
    }
}

impl CpuMorphology {
    pub fn new() -> Self {
        Self
    }

    fn apply(
        &self,
        mask: &BinaryMask,
        element: StructuringElement,
        iterations: u32,
        pass: Pass,
    ) -> BinaryMask {
        let (width, height) = mask.dimensions();
        let w = width as usize;
        let h = height as usize;

        let mut current = mask.clone();
        if w == 0 || h == 0 {
            return current;
        }

        let mut scratch = BinaryMask::new(width, height);
        for _ in 0..iterations {
            slide_rows(
                current.as_raw(),
                scratch.as_raw_mut(),
                w,
                h,
                element.width as usize,
                pass,
            );
            slide_columns(
                scratch.as_raw(),
                current.as_raw_mut(),
                w,
                h,
                element.height as usize,
                pass,
            );
        }
        current
    }
}

impl Morphology for CpuMorphology {
    fn name(&self) -> &str {
        "cpu"
    }

    fn erode(&self, mask: &BinaryMask, element: StructuringElement, iterations: u32) -> BinaryMask {
        self.apply(mask, element, iterations, Pass::Erode)
    }

    fn dilate(
        &self,
        mask: &BinaryMask,
        element: StructuringElement,
        iterations: u32,
    ) -> BinaryMask {
        self.apply(mask, element, iterations, Pass::Dilate)
    }

    fn external_regions(&self, mask: &BinaryMask) -> Vec<BoundingBox> {
        contour::external_bboxes(mask)
    }
}

/// Horizontal sliding-window pass with a `kernel_w` wide window.
///
/// The window for output `x` covers `[x - kernel_w / 2, x + (kernel_w - 1) / 2]`.
fn slide_rows(input: &[u8], output: &mut [u8], w: usize, h: usize, kernel_w: usize, pass: Pass) {
    if kernel_w <= 1 {
        output.copy_from_slice(input);
        return;
    }
    let before = kernel_w / 2;
    let after = (kernel_w - 1) / 2;

    for y in 0..h {
        let row = y * w;
        let mut count = 0usize;

        // Window for x = 0 covers [0, min(after, w-1)].
        for x in 0..=after.min(w - 1) {
            if pass.hits(input[row + x]) {
                count += 1;
            }
        }

        for x in 0..w {
            output[row + x] = pass.emit(count);

            // Pixel entering right edge of next window.
            let enter = x + after + 1;
            if enter < w && pass.hits(input[row + enter]) {
                count += 1;
            }

            // Pixel leaving left edge of current window.
            if x >= before && pass.hits(input[row + x - before]) {
                count -= 1;
            }
        }
    }
}

/// Vertical sliding-window pass with a `kernel_h` tall window.
fn slide_columns(input: &[u8], output: &mut [u8], w: usize, h: usize, kernel_h: usize, pass: Pass) {
    if kernel_h <= 1 {
        output.copy_from_slice(input);
        return;
    }
    let before = kernel_h / 2;
    let after = (kernel_h - 1) / 2;

    for x in 0..w {
        let mut count = 0usize;

        for y in 0..=after.min(h - 1) {
            if pass.hits(input[y * w + x]) {
                count += 1;
            }
        }

        for y in 0..h {
            output[y * w + x] = pass.emit(count);

            let enter = y + after + 1;
            if enter < h && pass.hits(input[enter * w + x]) {
                count += 1;
            }

            if y >= before && pass.hits(input[(y - before) * w + x]) {
                count -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_mask(w: u32, fg: &[u32]) -> BinaryMask {
        BinaryMask::from_fn(w, 1, |x, _| fg.contains(&x))
    }

    #[test]
    fn horizontal_dilation_connects_nearby_pixels() {
        // Two pixels 5 apart in a row; a 21-wide element reaches 10 each side.
        let mask = row_mask(100, &[42, 47]);
        let out = CpuMorphology.dilate(&mask, StructuringElement::horizontal(21), 1);
        for x in 32..=57 {
            assert!(out.get(x, 0), "pixel {x} should be dilated");
        }
        assert!(!out.get(31, 0), "pixel 31 should not be dilated");
        assert!(!out.get(58, 0), "pixel 58 should not be dilated");
    }

    #[test]
    fn vertical_dilation_small_kernel() {
        let mut mask = BinaryMask::new(5, 5);
        mask.set(2, 2, true);
        let out = CpuMorphology.dilate(&mask, StructuringElement::vertical(3), 1);
        assert!(out.get(2, 1));
        assert!(out.get(2, 2));
        assert!(out.get(2, 3));
        assert!(!out.get(2, 0));
        assert!(!out.get(2, 4));
        assert!(!out.get(1, 2));
        assert_eq!(out.count_foreground(), 3);
    }

    #[test]
    fn square_dilation_iterates() {
        let mut mask = BinaryMask::new(21, 21);
        mask.set(10, 10, true);
        let out = CpuMorphology.dilate(&mask, StructuringElement::square(5), 3);
        // Reach is 2 per iteration: a 13x13 square.
        assert_eq!(out.count_foreground(), 13 * 13);
        assert!(out.get(4, 4));
        assert!(!out.get(3, 10));
    }

    #[test]
    fn erosion_removes_short_runs() {
        // A 10-pixel run survives a 5-wide erosion as 6 pixels; a 3-pixel run vanishes.
        let fg: Vec<u32> = (10..20).chain(40..43).collect();
        let mask = row_mask(60, &fg);
        let out = CpuMorphology.erode(&mask, StructuringElement::horizontal(5), 1);
        let kept: Vec<u32> = (0..60).filter(|&x| out.get(x, 0)).collect();
        assert_eq!(kept, (12..18).collect::<Vec<_>>());
    }

    #[test]
    fn erosion_does_not_eat_page_edges() {
        let mask = BinaryMask::from_fn(8, 8, |_, _| true);
        let out = CpuMorphology.erode(&mask, StructuringElement::square(3), 2);
        assert_eq!(out.count_foreground(), 64);
    }

    #[test]
    fn opening_restores_long_lines_and_drops_text() {
        let mut mask = BinaryMask::new(80, 80);
        // Vertical rule, 60 tall, 2 wide.
        for y in 10..70 {
            mask.set(30, y, true);
            mask.set(31, y, true);
        }
        // A "glyph" 8x10.
        for y in 20..30 {
            for x in 50..58 {
                mask.set(x, y, true);
            }
        }
        let out = CpuMorphology.open(&mask, StructuringElement::vertical(15), 4);
        for y in 10..70 {
            assert!(out.get(30, y) && out.get(31, y), "rule lost at y={y}");
        }
        assert_eq!(out.count_foreground(), 120);
    }

    #[test]
    fn zero_and_unit_elements_are_identity() {
        let mask = BinaryMask::from_fn(9, 7, |x, y| (x + y) % 3 == 0);
        for element in [
            StructuringElement::new(0, 0),
            StructuringElement::new(1, 1),
            StructuringElement::new(0, 1),
        ] {
            assert_eq!(CpuMorphology.dilate(&mask, element, 3), mask);
            assert_eq!(CpuMorphology.erode(&mask, element, 3), mask);
        }
        assert_eq!(CpuMorphology.dilate(&mask, StructuringElement::square(9), 0), mask);
    }

    #[test]
    fn huge_element_saturates_without_panicking() {
        let mut mask = BinaryMask::new(6, 4);
        mask.set(0, 0, true);
        let grown = CpuMorphology.dilate(&mask, StructuringElement::square(10_000), 2);
        assert_eq!(grown.count_foreground(), 24);

        let mut holed = BinaryMask::from_fn(6, 4, |_, _| true);
        holed.set(5, 3, false);
        let shrunk = CpuMorphology.erode(&holed, StructuringElement::square(10_000), 1);
        assert!(shrunk.is_empty());
    }

    #[test]
    fn empty_mask_is_fine() {
        let mask = BinaryMask::new(0, 0);
        let out = CpuMorphology.dilate(&mask, StructuringElement::square(5), 7);
        assert_eq!(out.dimensions(), (0, 0));
    }
}

use crate::types::{BinaryMask, BoundingBox, StructuringElement};

/// Binary morphology primitives the segmentation stages are written against.
///
/// The pipeline takes a `Box<dyn Morphology>`; the CPU implementation lives
/// in the preprocess crate.
///
/// Implementations must preserve mask dimensions. Erosion treats pixels beyond
/// the page edge as foreground and dilation treats them as background, so the
/// edge itself never erodes or grows a stroke.
pub trait Morphology: Send + Sync {
    /// Human-readable name for tracing.
    fn name(&self) -> &str;

    /// Erode `mask` with a rectangular `element`, `iterations` times.
    fn erode(&self, mask: &BinaryMask, element: StructuringElement, iterations: u32) -> BinaryMask;

    /// Dilate `mask` with a rectangular `element`, `iterations` times.
    fn dilate(&self, mask: &BinaryMask, element: StructuringElement, iterations: u32)
        -> BinaryMask;

    /// Bounding boxes of the outermost connected foreground regions.
    ///
    /// Regions nested inside a hole of another region are not reported.
    fn external_regions(&self, mask: &BinaryMask) -> Vec<BoundingBox>;

    /// Morphological opening: erosion followed by dilation with the same
    /// element and iteration count.
    fn open(&self, mask: &BinaryMask, element: StructuringElement, iterations: u32) -> BinaryMask {
        let eroded = self.erode(mask, element, iterations);
        self.dilate(&eroded, element, iterations)
    }
}

use serde::{Deserialize, Serialize};

use parascan_core::{BinaryMask, BoundingBox, Morphology, StructuringElement};

/// Parameters for paragraph block extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockParams {
    /// Isotropic element used to bridge word and line gaps.
    pub element: StructuringElement,
    /// Dilation iterations. Depends on the document's line spacing: too few
    /// splits paragraphs into lines, too many merges neighbouring columns.
    pub iterations: u32,
}

impl Default for BlockParams {
    fn default() -> Self {
        Self {
            element: StructuringElement::square(5),
            iterations: 7,
        }
    }
}

/// Merges ink into one blob per paragraph and boxes each blob.
///
/// Algorithm:
/// 1. Dilate the (table-free) mask with a small square element until
///    inter-word and inter-line gaps close.
/// 2. Bounding box of every external region of the dilated mask.
///
/// Boxes come out in no particular order; ordering is the column
/// classifier's job.
#[derive(Debug, Clone, Default)]
pub struct BlockExtractor {
    params: BlockParams,
}

impl BlockExtractor {
    pub fn new(params: BlockParams) -> Self {
        Self { params }
    }

    /// Paragraph boxes of `mask`. An empty mask yields no boxes.
    pub fn extract(&self, morph: &dyn Morphology, mask: &BinaryMask) -> Vec<BoundingBox> {
        if mask.is_empty() {
            tracing::debug!("block extraction: empty mask");
            return Vec::new();
        }

        let dilated = morph.dilate(mask, self.params.element, self.params.iterations);
        let blocks = morph.external_regions(&dilated);

        tracing::debug!(
            backend = morph.name(),
            blocks = blocks.len(),
            iterations = self.params.iterations,
            "block extraction"
        );

        blocks
    }
}

use serde::{Deserialize, Serialize};

use parascan_core::{BinaryMask, BoundingBox, Morphology, Result, StructuringElement};

/// Parameters for table-line suppression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableParams {
    /// Skip table suppression entirely.
    pub enabled: bool,
    /// Tall-thin element that keeps vertical rules.
    pub vertical_element: StructuringElement,
    /// Short-wide element that keeps horizontal rules.
    pub horizontal_element: StructuringElement,
    /// Erosion (and matching dilation) iterations per direction.
    pub iterations: u32,
}

impl Default for TableParams {
    fn default() -> Self {
        Self {
            enabled: true,
            vertical_element: StructuringElement::vertical(15),
            horizontal_element: StructuringElement::horizontal(15),
            iterations: 4,
        }
    }
}

/// Finds table grids by their long straight rules and erases them.
///
/// Algorithm:
/// 1. Open the mask with a tall-thin element: only vertical strokes longer
///    than the element's reach survive, at their original thickness.
/// 2. Same with a short-wide element for horizontal strokes.
/// 3. OR both line masks into a grid mask.
/// 4. Bounding box of every external region of the grid mask.
/// 5. Zero each box in the original mask, borders and cell contents alike.
///
/// Glyph strokes shorter than the element reach do not survive step 1 or 2.
#[derive(Debug, Clone, Default)]
pub struct TableSuppressor {
    params: TableParams,
}

impl TableSuppressor {
    pub fn new(params: TableParams) -> Self {
        Self { params }
    }

    /// Grid mask of long horizontal and vertical strokes.
    pub fn line_mask(&self, morph: &dyn Morphology, mask: &BinaryMask) -> Result<BinaryMask> {
        let p = &self.params;
        let vertical = morph.open(mask, p.vertical_element, p.iterations);
        let horizontal = morph.open(mask, p.horizontal_element, p.iterations);
        vertical.union(&horizontal)
    }

    /// Bounding boxes of table regions, without touching the mask.
    pub fn detect(&self, morph: &dyn Morphology, mask: &BinaryMask) -> Result<Vec<BoundingBox>> {
        if !self.params.enabled || mask.is_empty() {
            return Ok(Vec::new());
        }
        let grid = self.line_mask(morph, mask)?;
        if grid.is_empty() {
            return Ok(Vec::new());
        }
        Ok(morph.external_regions(&grid))
    }

    /// Erase every detected table region from `mask` in place.
    ///
    /// Returns the erased regions. When no rules are found the mask is left
    /// untouched.
    pub fn suppress(&self, morph: &dyn Morphology, mask: &mut BinaryMask) -> Result<Vec<BoundingBox>> {
        let tables = self.detect(morph, mask)?;
        for bbox in &tables {
            mask.clear_rect(bbox);
        }

        tracing::debug!(
            backend = morph.name(),
            tables = tables.len(),
            "table suppression"
        );

        Ok(tables)
    }
}

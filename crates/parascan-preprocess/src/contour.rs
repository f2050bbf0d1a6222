use imageproc::contours::{find_contours, BorderType, Contour};

use parascan_core::{BinaryMask, BoundingBox};

/// Bounding boxes of the outermost connected regions of a binary mask.
///
/// Foreground pixels (> 0) are traced with 8-connectivity (Suzuki-Abe border
/// following). Only top-level outer borders are kept: a region sitting inside
/// a hole of another region is covered by its parent's box and is skipped.
pub fn external_bboxes(mask: &BinaryMask) -> Vec<BoundingBox> {
    if mask.width() == 0 || mask.height() == 0 {
        return Vec::new();
    }

    let contours: Vec<Contour<u32>> = find_contours(mask.as_gray());

    contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(bbox_of)
        .collect()
}

fn bbox_of(contour: &Contour<u32>) -> Option<BoundingBox> {
    let first = contour.points.first()?;
    let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
    for p in &contour.points[1..] {
        x0 = x0.min(p.x);
        y0 = y0.min(p.y);
        x1 = x1.max(p.x);
        y1 = y1.max(p.y);
    }
    Some(BoundingBox::from_extents(x0, y0, x1, y1))
}

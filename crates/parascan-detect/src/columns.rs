use serde::{Deserialize, Serialize};

use parascan_core::BoundingBox;

/// One of the three horizontal bands a paragraph can be read in.
///
/// The policy is bounded to three columns: everything past the
/// second band lands in [`Column::Third`], however many real columns the page
/// has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    First,
    Second,
    Third,
}

impl Column {
    /// Columns in reading order.
    pub const ALL: [Column; 3] = [Column::First, Column::Second, Column::Third];

    pub fn index(self) -> usize {
        match self {
            Column::First => 0,
            Column::Second => 1,
            Column::Third => 2,
        }
    }

    /// Band of a box whose left edge is at `x`, for bands `band_width` wide.
    ///
    /// Band edges are inclusive on the right: `x == band_width` is still the
    /// first column.
    pub fn classify(x: u32, band_width: f64) -> Column {
        let x = x as f64;
        if x <= band_width {
            Column::First
        } else if x <= 2.0 * band_width {
            Column::Second
        } else {
            Column::Third
        }
    }
}

/// Parameters for column classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnParams {
    /// Band width as a multiple of the mean paragraph width.
    pub band_scale: f64,
}

impl Default for ColumnParams {
    fn default() -> Self {
        Self { band_scale: 1.0 }
    }
}

/// Paragraph boxes split into three column buckets, each sorted top to bottom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnBuckets {
    /// Mean box width over the whole page (0 for an empty page).
    pub avg_width: f64,
    /// Width of one band, `avg_width * band_scale`.
    pub band_width: f64,
    buckets: [Vec<BoundingBox>; 3],
}

impl ColumnBuckets {
    pub fn bucket(&self, column: Column) -> &[BoundingBox] {
        &self.buckets[column.index()]
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenate buckets left to right.
    pub fn into_reading_order(self) -> Vec<BoundingBox> {
        let [first, second, third] = self.buckets;
        let mut out = first;
        out.extend(second);
        out.extend(third);
        out
    }
}

/// Orders paragraph boxes for reading: columns left to right, each column
/// top to bottom.
///
/// Algorithm:
/// 1. `avg_width` = mean width of every box on the page.
/// 2. Bucket by left edge: `x <= w`, `w < x <= 2w`, `x > 2w` where
///    `w = avg_width * band_scale`.
/// 3. Stable sort each bucket by `y`.
/// 4. Concatenate the buckets.
#[derive(Debug, Clone, Default)]
pub struct ColumnClassifier {
    params: ColumnParams,
}

impl ColumnClassifier {
    pub fn new(params: ColumnParams) -> Self {
        Self { params }
    }

    pub fn classify(&self, boxes: &[BoundingBox]) -> ColumnBuckets {
        // Nothing to average over.
        if boxes.is_empty() {
            return ColumnBuckets::default();
        }

        let total: u64 = boxes.iter().map(|b| b.width as u64).sum();
        let avg_width = total as f64 / boxes.len() as f64;
        let band_width = avg_width * self.params.band_scale;

        let mut buckets: [Vec<BoundingBox>; 3] = Default::default();
        for bbox in boxes {
            buckets[Column::classify(bbox.x, band_width).index()].push(*bbox);
        }
        for bucket in &mut buckets {
            bucket.sort_by_key(|b| b.y);
        }

        tracing::debug!(
            avg_width,
            first = buckets[0].len(),
            second = buckets[1].len(),
            third = buckets[2].len(),
            "column classification"
        );

        ColumnBuckets {
            avg_width,
            band_width,
            buckets,
        }
    }

    /// Reading-order sequence of `boxes`.
    pub fn order(&self, boxes: &[BoundingBox]) -> Vec<BoundingBox> {
        self.classify(boxes).into_reading_order()
    }
}

/// Reading order with the default three-band policy.
pub fn reading_order(boxes: &[BoundingBox]) -> Vec<BoundingBox> {
    ColumnClassifier::default().order(boxes)
}

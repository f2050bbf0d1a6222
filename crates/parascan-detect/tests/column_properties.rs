//! Property tests for the column classifier: the three buckets form a total,
//! disjoint partition and the reading order never interleaves columns.

use std::collections::HashMap;

use parascan_core::BoundingBox;
use parascan_detect::{Column, ColumnClassifier};
use proptest::prelude::*;

fn boxes() -> impl Strategy<Value = Vec<BoundingBox>> {
    prop::collection::vec(
        (0u32..2000, 0u32..3000, 1u32..800, 1u32..400)
            .prop_map(|(x, y, w, h)| BoundingBox::new(x, y, w, h)),
        0..40,
    )
}

fn multiset(boxes: &[BoundingBox]) -> HashMap<BoundingBox, usize> {
    let mut counts = HashMap::new();
    for b in boxes {
        *counts.entry(*b).or_insert(0) += 1;
    }
    counts
}

proptest! {
    #[test]
    fn buckets_partition_the_input(input in boxes()) {
        let buckets = ColumnClassifier::default().classify(&input);
        prop_assert_eq!(buckets.len(), input.len());

        let all: Vec<BoundingBox> = Column::ALL
            .iter()
            .flat_map(|&c| buckets.bucket(c).iter().copied())
            .collect();
        prop_assert_eq!(multiset(&all), multiset(&input));

        for column in Column::ALL {
            for b in buckets.bucket(column) {
                prop_assert_eq!(Column::classify(b.x, buckets.band_width), column);
            }
        }
    }

    #[test]
    fn buckets_are_sorted_top_to_bottom(input in boxes()) {
        let buckets = ColumnClassifier::default().classify(&input);
        for column in Column::ALL {
            let bucket = buckets.bucket(column);
            for pair in bucket.windows(2) {
                prop_assert!(pair[0].y <= pair[1].y);
            }
        }
    }

    #[test]
    fn order_is_bucket_concatenation(input in boxes()) {
        let classifier = ColumnClassifier::default();
        let buckets = classifier.classify(&input);
        let expected: Vec<BoundingBox> = Column::ALL
            .iter()
            .flat_map(|&c| buckets.bucket(c).iter().copied())
            .collect();
        let order = classifier.order(&input);
        prop_assert_eq!(&order, &expected);

        // Column index never decreases along the sequence.
        let columns: Vec<Column> = order
            .iter()
            .map(|b| Column::classify(b.x, buckets.band_width))
            .collect();
        for pair in columns.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn ordering_is_deterministic(input in boxes()) {
        let classifier = ColumnClassifier::default();
        prop_assert_eq!(classifier.order(&input), classifier.order(&input));
    }
}

pub mod binarize;
pub mod contour;
pub mod morphology;
pub mod table;

pub use binarize::{to_luma, BinarizeParams, Binarized, Binarizer, ThresholdMethod};
pub use morphology::CpuMorphology;
pub use table::{TableParams, TableSuppressor};

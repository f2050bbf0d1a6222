pub mod config;
pub mod pipeline;
pub mod scheduler;

pub use config::SegmentConfig;
pub use pipeline::{crop_paragraphs, segment_page, SegmentPipeline};
pub use scheduler::PageScheduler;

pub use parascan_detect::{BlockParams, ColumnParams};
pub use parascan_preprocess::{BinarizeParams, TableParams, ThresholdMethod};

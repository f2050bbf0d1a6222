pub mod blocks;
pub mod columns;

pub use blocks::{BlockExtractor, BlockParams};
pub use columns::{reading_order, Column, ColumnBuckets, ColumnClassifier, ColumnParams};

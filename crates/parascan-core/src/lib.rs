pub mod error;
pub mod traits;
pub mod types;

pub use error::{Result, SegmentError};
pub use traits::Morphology;
pub use types::*;

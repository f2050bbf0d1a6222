use thiserror::Error;

/// Top-level error type for the parascan pipeline.
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Image encode error: {0}")]
    ImageEncode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SegmentError>;

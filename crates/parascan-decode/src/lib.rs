pub mod image;
pub mod output;

pub use self::image::ImageDecoder;
pub use output::{paragraph_file_name, ParagraphWriter};

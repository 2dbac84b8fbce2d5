pub mod decoder;
pub mod pipeline;
pub mod scanner;

pub use decoder::{GrayscaleDecoder, ImageDecoder};
pub use pipeline::{build_corpus, CorpusBuild, PipelineOptions, SkippedItem};
pub use scanner::{is_image_file, ImageScanner, SUPPORTED_EXTENSIONS};

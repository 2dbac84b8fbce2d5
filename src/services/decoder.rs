use crate::core::error::{DedupError, Result};
use crate::core::fingerprint::PixelGrid;
use image::ImageReader;
use std::path::Path;

/// Turns a file into luminance samples.
pub trait GrayscaleDecoder: Sync {
    fn decode_grayscale(&self, path: &Path) -> Result<PixelGrid>;
}

/// Decoder backed by the `image` crate; the format is sniffed from content,
/// so a mislabelled extension still decodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl ImageDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl GrayscaleDecoder for ImageDecoder {
    fn decode_grayscale(&self, path: &Path) -> Result<PixelGrid> {
        let io_err = |source| DedupError::Io {
            path: path.to_path_buf(),
            source,
        };
        let img = ImageReader::open(path)
            .map_err(io_err)?
            .with_guessed_format()
            .map_err(io_err)?
            .decode()
            .map_err(|source| DedupError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(PixelGrid::from(img.to_luma8()))
    }
}

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DedupError {
    #[error("Invalid image: {reason}")]
    InvalidImage { reason: String },

    #[error("Failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid threshold {threshold}: must be between 0 and {max}")]
    InvalidThreshold { threshold: u32, max: u32 },

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid config {path:?}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Invalid fingerprint '{input}': expected up to 16 hex digits")]
    InvalidFingerprint { input: String },
}

impl DedupError {
    /// True for failures that only affect a single item and must not abort a scan.
    pub fn is_per_item(&self) -> bool {
        matches!(
            self,
            DedupError::InvalidImage { .. } | DedupError::Decode { .. } | DedupError::Io { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DedupError>;

pub mod detector;
pub mod error;
pub mod fingerprint;

pub use detector::{
    distance, validate_threshold, Corpus, CorpusEntry, MatchResult, Matches, DEFAULT_THRESHOLD,
    MAX_DISTANCE,
};
pub use error::{DedupError, Result};
pub use fingerprint::{fingerprint, Fingerprint, PixelGrid, GRID_SIZE};

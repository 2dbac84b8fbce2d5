//! Near-duplicate image detection.
//!
//! Each image is reduced to a 64-bit block-average fingerprint
//! ([`core::fingerprint`]); fingerprints are then compared pairwise by
//! Hamming distance ([`core::detector`]). Decoding, directory scanning and
//! reporting live in [`services`] and [`report`] and can be swapped out.

pub mod config;
pub mod core;
pub mod report;
pub mod services;

pub use crate::core::{
    distance, fingerprint, Corpus, CorpusEntry, DedupError, Fingerprint, MatchResult, Matches,
    PixelGrid, Result, DEFAULT_THRESHOLD, MAX_DISTANCE,
};

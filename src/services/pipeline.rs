use crate::core::detector::Corpus;
use crate::core::error::Result;
use crate::core::fingerprint::{fingerprint, Fingerprint};
use crate::services::decoder::GrayscaleDecoder;
use indicatif::ProgressBar;
use log::{debug, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Stop adding entries once the corpus holds this many.
    pub max_items: Option<usize>,
}

/// An item left out of the corpus, with the reason it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug)]
pub struct CorpusBuild {
    pub corpus: Corpus<PathBuf>,
    pub skipped: Vec<SkippedItem>,
    /// Items dropped because the corpus hit `max_items`.
    pub truncated: usize,
}

fn fingerprint_file<D: GrayscaleDecoder + ?Sized>(decoder: &D, path: &Path) -> Result<Fingerprint> {
    let grid = decoder.decode_grayscale(path)?;
    fingerprint(&grid)
}

/// Fingerprints `items` in parallel and collects the successes, in input
/// order, into a corpus. Failures are recorded per item and never abort the
/// batch.
pub fn build_corpus<D: GrayscaleDecoder + ?Sized>(
    decoder: &D,
    items: &[PathBuf],
    options: &PipelineOptions,
    progress: Option<&ProgressBar>,
) -> CorpusBuild {
    let results: Vec<Result<Fingerprint>> = items
        .par_iter()
        .map(|path| {
            let result = fingerprint_file(decoder, path);
            if let Some(bar) = progress {
                bar.inc(1);
            }
            result
        })
        .collect();

    let mut corpus = Corpus::new();
    let mut skipped = Vec::new();
    let mut truncated = 0;

    for (path, result) in items.iter().zip(results) {
        match result {
            Ok(fp) => {
                if options.max_items.is_some_and(|max| corpus.len() >= max) {
                    truncated += 1;
                    continue;
                }
                debug!("{} {}", fp, path.display());
                corpus.add(path.clone(), fp);
            }
            Err(err) => {
                warn!("Skipping {}: {}", path.display(), err);
                skipped.push(SkippedItem {
                    path: path.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    if truncated > 0 {
        warn!(
            "Maximum file limit reached ({}); {} image(s) left out",
            options.max_items.unwrap_or_default(),
            truncated
        );
    }

    CorpusBuild {
        corpus,
        skipped,
        truncated,
    }
}

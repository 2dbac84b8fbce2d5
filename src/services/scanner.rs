use crate::core::error::{DedupError, Result};
use indicatif::ProgressBar;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions recognised as images, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "gif", "tiff"];

pub fn is_image_file<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.as_ref().eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Lists candidate image files under a root directory.
#[derive(Debug, Clone)]
pub struct ImageScanner {
    pub recursive: bool,
    pub extensions: Vec<String>,
}

impl Default for ImageScanner {
    fn default() -> Self {
        Self {
            recursive: false,
            extensions: SUPPORTED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ImageScanner {
    pub fn new(recursive: bool, extensions: Vec<String>) -> Self {
        Self {
            recursive,
            extensions,
        }
    }

    /// Returns matching regular files sorted by path.
    pub fn scan(&self, root: &Path) -> Result<Vec<PathBuf>> {
        self.scan_with_progress(root, None)
    }

    pub fn scan_with_progress(
        &self,
        root: &Path,
        spinner: Option<&ProgressBar>,
    ) -> Result<Vec<PathBuf>> {
        let meta = std::fs::metadata(root).map_err(|source| DedupError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(DedupError::Io {
                path: root.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
            });
        }

        let walker = if self.recursive {
            WalkDir::new(root)
        } else {
            WalkDir::new(root).max_depth(1)
        };

        let mut images = Vec::new();
        for entry in walker.sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => return Err(err.into()),
                Err(err) => {
                    warn!("Skipping unreadable entry: {}", err);
                    continue;
                }
            };
            if let Some(spinner) = spinner {
                spinner.tick();
            }
            if !entry.file_type().is_file() {
                continue;
            }
            if is_image_file(entry.path(), &self.extensions) {
                images.push(entry.into_path());
            } else {
                debug!("Ignoring non-image file {}", entry.path().display());
            }
        }

        images.sort();
        Ok(images)
    }
}

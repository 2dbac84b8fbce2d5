//! Configuration loaded from TOML.
//!
//! Looked up at `<config dir>/dupscan/config.toml` (e.g.
//! `~/.config/dupscan/config.toml` on Linux) unless a path is given.
//! Every field is optional; command-line flags override file values.

use crate::core::detector::{validate_threshold, DEFAULT_THRESHOLD};
use crate::core::error::{DedupError, Result};
use crate::services::scanner::SUPPORTED_EXTENSIONS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "dupscan";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum Hamming distance (inclusive) for a pair to count as similar.
    pub threshold: u32,
    /// Optional ceiling on the number of fingerprinted images.
    pub max_files: Option<usize>,
    pub recursive: bool,
    pub extensions: Vec<String>,
    pub format: OutputFormat,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_files: None,
            recursive: false,
            extensions: SUPPORTED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            format: OutputFormat::Text,
            log_level: "info".to_string(),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE_NAME))
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| DedupError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|message| DedupError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Loads the file at the default location, or defaults if there is none.
    pub fn load_default() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    fn from_toml(content: &str) -> std::result::Result<Self, String> {
        let config: Config = toml::from_str(content).map_err(|e| e.to_string())?;
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)?;
        if self.max_files == Some(0) {
            return Err(DedupError::Config {
                path: PathBuf::new(),
                message: "max_files must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

//! Block-average perceptual hash.
//!
//! The image is split into an 8x8 grid of blocks, each block is reduced to the
//! mean of its samples, and every block brighter than the average block sets
//! one bit of the fingerprint.
//!
//! Bit layout: bit `i * 8 + j` (bit 0 is the least significant) belongs to the
//! block in column `i` and row `j`. Fingerprints stored elsewhere must use the
//! same layout to be comparable.

use crate::core::error::{DedupError, Result};
use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of blocks along each axis.
pub const GRID_SIZE: usize = 8;

/// Single-channel luminance samples in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl PixelGrid {
    /// Builds a grid, checking that `samples` holds exactly `width * height` values.
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(DedupError::InvalidImage {
                reason: format!(
                    "{}x{} grid needs {} samples, got {}",
                    width,
                    height,
                    expected,
                    samples.len()
                ),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn row(&self, y: usize) -> &[u8] {
        let w = self.width as usize;
        &self.samples[y * w..(y + 1) * w]
    }
}

impl From<GrayImage> for PixelGrid {
    fn from(img: GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            samples: img.into_raw(),
        }
    }
}

/// 64-bit perceptual fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether the block at column `i`, row `j` was above the average.
    pub fn is_set(self, i: usize, j: usize) -> bool {
        debug_assert!(i < GRID_SIZE && j < GRID_SIZE);
        self.0 & (1u64 << (i * GRID_SIZE + j)) != 0
    }

    /// Hamming distance to `other`.
    pub fn distance(self, other: Fingerprint) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::LowerHex for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl FromStr for Fingerprint {
    type Err = DedupError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.is_empty() || digits.len() > 16 {
            return Err(DedupError::InvalidFingerprint {
                input: s.to_string(),
            });
        }
        u64::from_str_radix(digits, 16)
            .map(Fingerprint)
            .map_err(|_| DedupError::InvalidFingerprint {
                input: s.to_string(),
            })
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.to_string()
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = DedupError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Computes the fingerprint of `grid`.
///
/// Block `(i, j)` covers columns `[i*W/8, (i+1)*W/8)` and rows
/// `[j*H/8, (j+1)*H/8)`. Images narrower or shorter than 8 pixels produce
/// empty blocks; those never set a bit and are left out of the average.
pub fn fingerprint(grid: &PixelGrid) -> Result<Fingerprint> {
    if grid.width == 0 || grid.height == 0 {
        return Err(DedupError::InvalidImage {
            reason: format!("zero-sized image ({}x{})", grid.width, grid.height),
        });
    }

    let (w, h) = (grid.width as usize, grid.height as usize);
    let mut scaled = [[None::<f64>; GRID_SIZE]; GRID_SIZE];
    let mut block_sum = 0.0;
    let mut blocks = 0usize;

    for (i, column) in scaled.iter_mut().enumerate() {
        let (x0, x1) = (i * w / GRID_SIZE, (i + 1) * w / GRID_SIZE);
        for (j, cell) in column.iter_mut().enumerate() {
            let (y0, y1) = (j * h / GRID_SIZE, (j + 1) * h / GRID_SIZE);
            let count = (x1 - x0) * (y1 - y0);
            if count == 0 {
                continue;
            }

            // Integer sums keep the block means exact and order-independent.
            let sum: u64 = (y0..y1)
                .map(|y| {
                    grid.row(y)[x0..x1]
                        .iter()
                        .map(|&v| u64::from(v))
                        .sum::<u64>()
                })
                .sum();
            let mean = sum as f64 / count as f64;
            *cell = Some(mean);
            block_sum += mean;
            blocks += 1;
        }
    }

    // w, h >= 1 always leaves at least block (7, 7) non-empty.
    let avg = block_sum / blocks as f64;

    let mut bits = 0u64;
    for (i, column) in scaled.iter().enumerate() {
        for (j, cell) in column.iter().enumerate() {
            if matches!(cell, Some(mean) if *mean > avg) {
                bits |= 1u64 << (i * GRID_SIZE + j);
            }
        }
    }

    Ok(Fingerprint(bits))
}

use crate::core::detector::Matches;
use crate::services::pipeline::SkippedItem;
use chrono::Utc;
use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub first: PathBuf,
    pub second: PathBuf,
    pub distance: u32,
}

/// Everything a scan produced, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub generated_at: String,
    pub root: PathBuf,
    pub threshold: u32,
    pub images: usize,
    pub pairs_examined: usize,
    pub truncated: usize,
    pub skipped: Vec<SkippedItem>,
    pub matches: Vec<MatchRecord>,
}

impl ScanReport {
    /// Drains `matches` into a report.
    pub fn collect(
        root: &Path,
        images: usize,
        mut matches: Matches<'_, PathBuf>,
        skipped: Vec<SkippedItem>,
        truncated: usize,
    ) -> Self {
        let threshold = matches.threshold();
        let records = matches
            .by_ref()
            .map(|m| MatchRecord {
                first: m.first.clone(),
                second: m.second.clone(),
                distance: m.distance,
            })
            .collect();

        Self {
            generated_at: Utc::now().to_rfc3339(),
            root: root.to_path_buf(),
            threshold,
            images,
            pairs_examined: matches.pairs_examined(),
            truncated,
            skipped,
            matches: records,
        }
    }
}

pub fn render_text(report: &ScanReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Found {} images", report.images);
    if !report.skipped.is_empty() {
        let _ = writeln!(out, "Skipped {} file(s):", report.skipped.len());
        for item in &report.skipped {
            let _ = writeln!(out, "  {}: {}", item.path.display(), item.reason);
        }
    }
    if report.truncated > 0 {
        let _ = writeln!(out, "Left out {} file(s) over the file limit", report.truncated);
    }

    let _ = writeln!(
        out,
        "\nPossible duplicates (threshold distance <= {}):",
        report.threshold
    );
    if report.matches.is_empty() {
        let _ = writeln!(out, "No duplicates found.");
    }
    for m in &report.matches {
        let _ = writeln!(out, "Similar images:");
        let _ = writeln!(out, "  {}\n  {}", m.first.display(), m.second.display());
        let _ = writeln!(out, "  Distance: {}\n", m.distance);
    }
    out
}

pub fn render_json(report: &ScanReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

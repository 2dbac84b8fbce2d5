use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dupscan::config::{Config, OutputFormat};
use dupscan::core::{fingerprint, validate_threshold};
use dupscan::report::{render_json, render_text, ScanReport};
use dupscan::services::{build_corpus, GrayscaleDecoder, ImageDecoder, ImageScanner, PipelineOptions};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "dupscan", version, about = "Find visually similar images")]
struct Cli {
    /// Config file (default: <config dir>/dupscan/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List pairs of similar images in a directory
    Scan {
        /// Directory to scan
        #[arg(short, long, value_name = "DIR")]
        path: PathBuf,
        /// Maximum differing bits (0-64) for two images to count as similar
        #[arg(short, long)]
        threshold: Option<u32>,
        /// Stop after fingerprinting this many images
        #[arg(long, value_name = "N")]
        max_files: Option<usize>,
        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
        /// Report format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Write the report here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print the fingerprint of each image
    Hash {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },

    /// Print the distance between two images
    Compare {
        first: PathBuf,
        second: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => Config::load_default().context("Failed to load default config")?,
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    match cli.command {
        Commands::Scan {
            path,
            threshold,
            max_files,
            recursive,
            format,
            output,
        } => {
            if let Some(threshold) = threshold {
                config.threshold = threshold;
            }
            if max_files.is_some() {
                config.max_files = max_files;
            }
            config.recursive |= recursive;
            if let Some(format) = format {
                config.format = format;
            }
            config.validate()?;

            let report = scan(&path, &config)?;
            let rendered = match config.format {
                OutputFormat::Text => render_text(&report),
                OutputFormat::Json => render_json(&report)?,
            };
            match output {
                Some(out) => {
                    fs::write(&out, rendered)
                        .with_context(|| format!("Failed to write report {:?}", out))?;
                    info!("Report written to {}", out.display());
                }
                None => print!("{}", rendered),
            }
        }

        Commands::Hash { files } => {
            let decoder = ImageDecoder::new();
            for file in &files {
                match hash_file(&decoder, file) {
                    Ok(fp) => println!("{}  {}", fp, file.display()),
                    Err(err) => error!("{}: {}", file.display(), err),
                }
            }
        }

        Commands::Compare { first, second } => {
            let decoder = ImageDecoder::new();
            let a = hash_file(&decoder, &first)?;
            let b = hash_file(&decoder, &second)?;
            println!("{}  {}", a, first.display());
            println!("{}  {}", b, second.display());
            println!("Distance: {}", dupscan::distance(a, b));
        }
    }

    Ok(())
}

fn hash_file(decoder: &impl GrayscaleDecoder, path: &Path) -> Result<dupscan::Fingerprint> {
    let grid = decoder
        .decode_grayscale(path)
        .with_context(|| format!("Failed to decode {:?}", path))?;
    Ok(fingerprint(&grid)?)
}

/// Enumerate, fingerprint and compare everything under `root`.
fn scan(root: &Path, config: &Config) -> Result<ScanReport> {
    info!("Scanning directory: {}", root.display());
    let threshold = validate_threshold(config.threshold)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    spinner.set_message("Scanning for images…");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let scanner = ImageScanner::new(config.recursive, config.extensions.clone());
    let images = scanner
        .scan_with_progress(root, Some(&spinner))
        .with_context(|| format!("Failed to scan {:?}", root))?;
    spinner.finish_with_message(format!("Found {} candidate file(s)", images.len()));

    let bar = ProgressBar::new(images.len() as u64);
    bar.set_style(ProgressStyle::with_template(
        "{bar:40.cyan/blue} {pos}/{len} {msg}",
    )?);
    bar.set_message("hashing");
    let options = PipelineOptions {
        max_items: config.max_files,
    };
    let build = benchmark("hashing all images", || {
        build_corpus(&ImageDecoder::new(), &images, &options, Some(&bar))
    });
    bar.finish_and_clear();

    let report = benchmark("comparing fingerprints", || -> Result<ScanReport> {
        let matches = build.corpus.find_matches(threshold)?;
        Ok(ScanReport::collect(
            root,
            build.corpus.len(),
            matches,
            build.skipped.clone(),
            build.truncated,
        ))
    })?;
    info!(
        "{} image(s) fingerprinted, {} skipped, {} similar pair(s)",
        report.images,
        report.skipped.len(),
        report.matches.len()
    );
    Ok(report)
}

/// Run `f()`, log how long it took (with `label`), and return its result.
fn benchmark<T, F: FnOnce() -> T>(label: &str, f: F) -> T {
    let start = Instant::now();
    let result = f();
    info!("⏱ {} took {:.2?}", label, start.elapsed());
    result
}

use dupscan::report::{render_text, ScanReport};
use dupscan::services::{build_corpus, ImageDecoder, ImageScanner, PipelineOptions};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn gradient(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        Luma([(x * 191 / width + y * 64 / height) as u8])
    })
}

fn inverted(img: &GrayImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        Luma([255 - img.get_pixel(x, y)[0]])
    })
}

fn diagonal(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        Luma([if x * height > y * width { 230 } else { 20 }])
    })
}

fn write_fixture(dir: &Path) {
    let original = gradient(256, 192);
    original.save(dir.join("photo.png")).unwrap();
    imageops::resize(&original, 128, 96, FilterType::Triangle)
        .save(dir.join("photo_small.png"))
        .unwrap();
    // A negative flips every block relative to the average.
    inverted(&original).save(dir.join("other.bmp")).unwrap();
    fs::write(dir.join("corrupt.jpg"), b"definitely not a jpeg").unwrap();
    fs::write(dir.join("notes.txt"), b"ignored").unwrap();
}

#[test]
fn resized_copy_is_reported_and_corrupt_file_skipped() {
    let temp_dir = TempDir::new().unwrap();
    write_fixture(temp_dir.path());

    let images = ImageScanner::default().scan(temp_dir.path()).unwrap();
    assert_eq!(images.len(), 4);

    let build = build_corpus(&ImageDecoder::new(), &images, &PipelineOptions::default(), None);
    assert_eq!(build.corpus.len(), 3);
    assert_eq!(build.skipped.len(), 1);
    assert!(build.skipped[0].path.ends_with("corrupt.jpg"));

    let mut matches = build.corpus.find_matches(8).unwrap();
    let found: Vec<_> = matches.by_ref().collect();
    assert_eq!(matches.pairs_examined(), 3);

    assert_eq!(found.len(), 1);
    assert!(found[0].first.ends_with("photo.png"));
    assert!(found[0].second.ends_with("photo_small.png"));
    assert!(found[0].distance <= 8);
    for m in &found {
        assert!(!m.first.ends_with("corrupt.jpg") && !m.second.ends_with("corrupt.jpg"));
    }
}

#[test]
fn report_lists_skipped_files() {
    let temp_dir = TempDir::new().unwrap();
    write_fixture(temp_dir.path());

    let images = ImageScanner::default().scan(temp_dir.path()).unwrap();
    let build = build_corpus(&ImageDecoder::new(), &images, &PipelineOptions::default(), None);
    let report = ScanReport::collect(
        temp_dir.path(),
        build.corpus.len(),
        build.corpus.find_matches(8).unwrap(),
        build.skipped.clone(),
        build.truncated,
    );

    assert_eq!(report.images, 3);
    let text = render_text(&report);
    assert!(text.contains("Skipped 1 file(s)"));
    assert!(text.contains("corrupt.jpg"));
    assert!(text.contains("Similar images:"));
}

#[test]
fn identical_image_matches_at_zero_threshold() {
    let temp_dir = TempDir::new().unwrap();
    let img = diagonal(64, 64);
    img.save(temp_dir.path().join("a.png")).unwrap();
    img.save(temp_dir.path().join("b.PNG")).unwrap();

    let images = ImageScanner::default().scan(temp_dir.path()).unwrap();
    let build = build_corpus(&ImageDecoder::new(), &images, &PipelineOptions::default(), None);
    let found: Vec<_> = build.corpus.find_matches(0).unwrap().collect();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].distance, 0);
}

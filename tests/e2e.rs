//! End-to-end integration tests for edgequake-wordcloud.
//!
//! Everything runs in-process against the bundled font and the masks in
//! `./masks/`; PDFs are assembled on the fly with lopdf, so no network or
//! external files are needed.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use edgequake_wordcloud::{
    generate, generate_from_source, write_outputs, CloudConfig, Colormap, FrequencyReport,
    HexColor, Shape, SourceKind, TextSource, WordCloudError,
};
use image::{GrayImage, Luma};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::Cursor;
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn masks_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("masks")
}

/// Smallest canvas the config accepts; keeps layout fast.
fn small() -> edgequake_wordcloud::CloudConfigBuilder {
    CloudConfig::builder()
        .size(400, 300)
        .max_words(50)
        .mask_dir(masks_dir())
}

fn pdf_with_pages(texts: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::new();
    for text in texts {
        let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
        });
        kids.push(Object::Reference(page_id));
    }
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

fn png(img: &GrayImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

const PROSE: &str = "The quick brown fox jumps over the lazy dog. The fox is quick, \
the dog is lazy. Foxes and dogs: a quick story about a brown fox and a lazy dog \
who never jumps. Quick quick quick!";

// ── Core scenarios ───────────────────────────────────────────────────────────

#[test]
fn test_cat_cat_dog() {
    let config = small().build().unwrap();
    let out = generate("cat cat dog", &config).unwrap().expect("cloud");

    let rows: Vec<(&str, u32, f64)> = out
        .report
        .iter()
        .map(|r| (r.word.as_str(), r.raw_count, r.normalized_pct))
        .collect();
    assert_eq!(rows, vec![("cat", 2, 100.0), ("dog", 1, 50.0)]);

    assert_eq!(out.image.dimensions(), (400, 300));
    assert_eq!(out.layout.words[0].word, "cat");
}

#[test]
fn test_blank_text_renders_nothing() {
    let config = small().build().unwrap();
    assert!(generate("", &config).unwrap().is_none());

    let run = generate_from_source(&TextSource::Direct(" \n ".into()), &config).unwrap();
    assert!(run.output.is_none());
    assert_eq!(run.acquired.text, " \n ");
}

#[test]
fn test_non_pdf_upload_is_rejected() {
    let config = small().build().unwrap();
    let err = generate_from_source(&TextSource::Document(b"PK\x03\x04docx".to_vec()), &config)
        .unwrap_err();
    assert!(matches!(err, WordCloudError::NotAPdf { .. }), "got: {err}");
}

#[test]
fn test_pdf_pages_feed_the_cloud() {
    let pdf = pdf_with_pages(&["rust rust crab ferris", "rust crab rust"]);
    let config = small().build().unwrap();
    let run = generate_from_source(&TextSource::Document(pdf), &config).unwrap();

    assert_eq!(run.acquired.source, SourceKind::Document);
    assert_eq!(run.acquired.page_count, Some(2));
    let out = run.output.expect("cloud");
    assert_eq!(out.report.rows[0].word, "rust");
    assert_eq!(out.report.rows[0].raw_count, 4);
    assert_eq!(out.report.rows[1].word, "crab");
    assert_eq!(out.report.rows[1].raw_count, 2);
}

#[test]
fn test_stop_words_only_cannot_render() {
    let config = small().build().unwrap();
    let err = generate("the of and to is it", &config).unwrap_err();
    assert!(err.is_nothing_to_render(), "got: {err}");
}

// ── Table invariants ─────────────────────────────────────────────────────────

#[test]
fn test_table_is_top_ten_sorted() {
    let text: String = (1..=14)
        .map(|i| format!("token{i} ").repeat(i))
        .collect();
    let config = small().build().unwrap();
    let out = generate(&text, &config).unwrap().unwrap();

    assert_eq!(out.report.len(), 10);
    assert_eq!(out.report.rows[0].word, "token14");
    assert_eq!(out.report.rows[0].normalized_pct, 100.0);
    for pair in out.report.rows.windows(2) {
        assert!(pair[0].raw_count >= pair[1].raw_count);
        assert!(pair[0].normalized_pct >= pair[1].normalized_pct);
    }
}

#[test]
fn test_table_matches_cloud_frequencies() {
    let config = small().build().unwrap();
    let out = generate(PROSE, &config).unwrap().unwrap();

    for (row, (word, freq)) in out.report.iter().zip(&out.layout.frequencies) {
        assert_eq!(&row.word, word);
        assert!((row.normalized_pct - freq * 100.0).abs() < 0.006);
    }
    // the largest word in the image is the first row
    let biggest = out
        .layout
        .words
        .iter()
        .max_by_key(|w| w.font_size)
        .unwrap();
    assert_eq!(biggest.word, out.report.rows[0].word);
}

#[test]
fn test_table_never_exceeds_ten_rows() {
    let text: String = (1..=30).map(|i| format!("term{i} ")).collect();
    let config = small().top_n(50).build().unwrap();
    let out = generate(&text, &config).unwrap().unwrap();
    assert_eq!(out.report.len(), 10);
}

#[test]
fn test_oversized_margin_is_a_config_error() {
    let err = small().margin(u32::MAX).build().unwrap_err();
    assert!(matches!(err, WordCloudError::InvalidConfig(_)), "got: {err}");

    // a hand-built config is validated again before generation
    let config = CloudConfig {
        margin: u32::MAX,
        ..small().build().unwrap()
    };
    let err = generate("cat cat dog", &config).unwrap_err();
    assert!(matches!(err, WordCloudError::InvalidConfig(_)), "got: {err}");
}

#[test]
fn test_plurals_and_case_merge() {
    let config = small().build().unwrap();
    let out = generate("Dog dogs DOG cat", &config).unwrap().unwrap();
    assert_eq!(out.report.rows[0].word.to_lowercase(), "dog");
    assert_eq!(out.report.rows[0].raw_count, 3);
}

// ── Rendering ────────────────────────────────────────────────────────────────

#[test]
fn test_dimensions_and_background() {
    let config = small()
        .size(640, 360)
        .background(HexColor::BLACK)
        .colormap(Colormap::Autumn)
        .build()
        .unwrap();
    let out = generate(PROSE, &config).unwrap().unwrap();
    assert_eq!(out.image.dimensions(), (640, 360));
    assert_eq!(out.image.get_pixel(0, 0).0, [0, 0, 0]);
    assert_eq!(out.chart.dimensions(), (500, 450));
}

#[test]
fn test_same_seed_same_png() {
    let config = small().seed(7).build().unwrap();
    let a = generate(PROSE, &config).unwrap().unwrap().png_bytes().unwrap();
    let b = generate(PROSE, &config).unwrap().unwrap().png_bytes().unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_builtin_heart_keeps_corners_clear() {
    let config = small()
        .shape(Shape::Heart)
        .background(HexColor([10, 20, 30]))
        .build()
        .unwrap();
    let out = generate(PROSE, &config).unwrap().unwrap();
    let (w, h) = out.image.dimensions();
    for (x, y) in [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)] {
        assert_eq!(out.image.get_pixel(x, y).0, [10, 20, 30], "corner ({x},{y})");
    }
}

#[test]
fn test_custom_mask_beats_shape() {
    // only a band in the middle is drawable
    let mask = GrayImage::from_fn(400, 300, |_, y| {
        Luma([if (100..200).contains(&y) { 0 } else { 255 }])
    });
    let empty = tempfile::tempdir().unwrap();
    let config = small()
        .shape(Shape::Circle)
        .mask_dir(empty.path())
        .custom_mask(png(&mask))
        .build()
        .unwrap();
    let out = generate("band band band edge", &config).unwrap().unwrap();
    for w in &out.layout.words {
        assert!(w.y >= 100 && w.y + w.height <= 200, "{} at y={}", w.word, w.y);
    }
}

#[test]
fn test_missing_shape_file_is_reported() {
    let empty = tempfile::tempdir().unwrap();
    let config = small()
        .shape(Shape::Circle)
        .mask_dir(empty.path())
        .build()
        .unwrap();
    let err = generate("cat", &config).unwrap_err();
    assert!(matches!(err, WordCloudError::MaskNotFound { .. }), "got: {err}");
}

// ── Outputs ──────────────────────────────────────────────────────────────────

#[test]
fn test_written_files_round_trip() {
    let config = small().build().unwrap();
    let out = generate(PROSE, &config).unwrap().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let files = write_outputs(&out, dir.path()).unwrap();

    let cloud = image::open(&files.word_cloud).unwrap();
    assert_eq!((cloud.width(), cloud.height()), (400, 300));

    let chart = image::open(&files.chart).unwrap();
    assert_eq!((chart.width(), chart.height()), (500, 450));

    let csv = std::fs::read(&files.frequencies_csv).unwrap();
    let back = FrequencyReport::from_csv(&csv).unwrap();
    assert_eq!(back, out.report);
}

#[test]
fn test_summary_serialises() {
    let config = small().build().unwrap();
    let out = generate("cat cat dog", &config).unwrap().unwrap();
    let summary = out.summary(&config, true).unwrap();
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["background"], "#ffffff");
    assert_eq!(json["colormap"], "viridis");
    assert_eq!(json["top_words"][0]["word"], "cat");
    assert!(json["image_data_uri"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
    assert!(json["placed"][0].get("bitmap").is_none());
}

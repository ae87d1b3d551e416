//! Generation entry points.
//!
//! [`generate`] turns text into a word cloud, a frequency report and a bar
//! chart in one synchronous call. [`generate_from_source`] adds the text
//! acquisition step, and [`write_outputs`] persists the three artefacts.

use crate::config::CloudConfig;
use crate::error::WordCloudError;
use crate::output::{GenerationOutput, GenerationRun, GenerationStats, WrittenFiles};
use crate::pipeline::chart::render_bar_chart;
use crate::pipeline::font::CloudFont;
use crate::pipeline::layout::{layout_words, render_layout};
use crate::pipeline::mask::load_mask;
use crate::pipeline::report::build_report;
use crate::pipeline::text::{acquire_text, is_generatable, TextSource};
use crate::pipeline::tokenize::Tokenizer;
use crate::progress::Stage;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// File name of the word-cloud PNG written by [`write_outputs`].
pub const WORD_CLOUD_FILE: &str = "word_cloud.png";
/// File name of the frequency CSV written by [`write_outputs`].
pub const FREQUENCIES_FILE: &str = "word_frequencies.csv";
/// File name of the bar-chart PNG written by [`write_outputs`].
pub const CHART_FILE: &str = "top_words_chart.png";

/// Generate a word cloud from `text`.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(None)` when `text` is empty or whitespace only; nothing is rendered
/// and no error is raised.
///
/// # Errors
/// - [`WordCloudError::InvalidConfig`] for out-of-range settings
/// - mask and font errors for a missing or unreadable shape/font file
/// - [`WordCloudError::EmptyVocabulary`] / [`WordCloudError::NoSpaceToDraw`]
///   when there is nothing the renderer can draw
///
/// # Example
/// ```rust
/// use edgequake_wordcloud::{generate, CloudConfig};
///
/// let config = CloudConfig::builder().size(400, 300).build().unwrap();
/// let output = generate("cat cat dog", &config).unwrap().unwrap();
/// assert_eq!(output.report.rows[0].word, "cat");
/// assert_eq!(output.image.dimensions(), (400, 300));
/// ```
pub fn generate(
    text: &str,
    config: &CloudConfig,
) -> Result<Option<GenerationOutput>, WordCloudError> {
    config.validate()?;
    if !is_generatable(text) {
        info!("Input text is blank; nothing to generate");
        return Ok(None);
    }

    let total_start = Instant::now();
    info!(
        "Starting generation: {} chars, {}x{}, colormap {}, shape {}",
        text.len(),
        config.width,
        config.height,
        config.colormap,
        config.shape
    );

    // ── Step 1: Resolve mask ─────────────────────────────────────────────
    let (mask, _) = run_stage(config, Stage::LoadMask, || {
        load_mask(config.custom_mask.as_deref(), config.shape, &config.mask_dir)
    })?;

    // ── Step 2: Load font ────────────────────────────────────────────────
    let (font, _) = run_stage(config, Stage::LoadFont, || {
        CloudFont::load(&config.font, &config.font_dir)
    })?;

    // ── Step 3: Tokenize ─────────────────────────────────────────────────
    let (counts, _) = run_stage(config, Stage::Tokenize, || {
        Ok(Tokenizer::new(config.tokenizer.clone()).process_text(text))
    })?;
    debug!(
        "{} distinct words, {} tokens",
        counts.len(),
        counts.total()
    );

    // ── Step 4: Place words ──────────────────────────────────────────────
    let (layout, layout_duration_ms) = run_stage(config, Stage::Layout, || {
        layout_words(&counts, config, mask.as_ref(), &font)
    })?;

    // ── Step 5: Render cloud ─────────────────────────────────────────────
    let (image, _) = run_stage(config, Stage::Render, || {
        Ok(render_layout(&layout, config.background))
    })?;

    // ── Step 6: Frequency report and chart ───────────────────────────────
    let ((report, chart), _) = run_stage(config, Stage::Report, || {
        let report = build_report(&layout.frequencies, &counts, config.top_n);
        let chart = render_bar_chart(&report, &font);
        Ok((report, chart))
    })?;

    let stats = GenerationStats {
        distinct_words: counts.len(),
        total_tokens: counts.total(),
        retained_words: layout.frequencies.len(),
        placed_words: layout.placed_count(),
        width: config.width,
        height: config.height,
        layout_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Generation complete: {}/{} words placed, {}ms total",
        stats.placed_words, stats.retained_words, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_complete(stats.placed_words, stats.retained_words);
    }

    Ok(Some(GenerationOutput {
        image,
        chart,
        layout,
        report,
        stats,
    }))
}

/// Acquire text from `source`, then [`generate`] from it.
///
/// The acquired text is returned even when it is blank and no cloud is
/// produced.
pub fn generate_from_source(
    source: &TextSource,
    config: &CloudConfig,
) -> Result<GenerationRun, WordCloudError> {
    let acquired = acquire_text(source)?;
    let output = generate(&acquired.text, config)?;
    Ok(GenerationRun { acquired, output })
}

/// Write the cloud PNG, frequency CSV and chart PNG into `dir`.
///
/// Each file is written to a temp file in `dir` and renamed into place, so a
/// failed run never leaves a truncated artefact behind.
pub fn write_outputs(
    output: &GenerationOutput,
    dir: impl AsRef<Path>,
) -> Result<WrittenFiles, WordCloudError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|e| WordCloudError::OutputWriteFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let files = WrittenFiles {
        word_cloud: dir.join(WORD_CLOUD_FILE),
        frequencies_csv: dir.join(FREQUENCIES_FILE),
        chart: dir.join(CHART_FILE),
    };

    // Encode everything before touching the disk.
    let cloud_png = output.png_bytes()?;
    let csv = output.csv_bytes()?;
    let chart_png = output.chart_png_bytes()?;

    write_atomic(&files.word_cloud, &cloud_png)?;
    write_atomic(&files.frequencies_csv, &csv)?;
    write_atomic(&files.chart, &chart_png)?;

    info!("Wrote outputs to {}", dir.display());
    Ok(files)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Run one pipeline stage, firing progress callbacks and timing it.
fn run_stage<T>(
    config: &CloudConfig,
    stage: Stage,
    f: impl FnOnce() -> Result<T, WordCloudError>,
) -> Result<(T, u64), WordCloudError> {
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(stage);
    }
    let start = Instant::now();
    let value = f()?;
    let elapsed_ms = start.elapsed().as_millis() as u64;
    debug!("{} took {}ms", stage, elapsed_ms);
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_complete(stage, elapsed_ms);
    }
    Ok((value, elapsed_ms))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), WordCloudError> {
    let fail = |source| WordCloudError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(fail)?;
    tmp.write_all(bytes).map_err(fail)?;
    tmp.persist(path).map_err(|e| fail(e.error))?;
    debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

//! Output types returned by the generation entry points.

use crate::config::{CloudConfig, Colormap, HexColor, Shape};
use crate::error::{PageError, WordCloudError};
use crate::pipeline::encode::{encode_data_uri, encode_png};
use crate::pipeline::layout::{CloudLayout, PlacedWord};
use crate::pipeline::report::{FrequencyReport, WordFrequency};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where acquired text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Direct,
    Document,
}

/// The raw text of a run, before tokenization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquiredText {
    pub text: String,
    pub source: SourceKind,
    /// Number of pages in the document; `None` for direct text.
    pub page_count: Option<usize>,
    /// Pages whose text could not be decoded and were skipped.
    pub failed_pages: Vec<PageError>,
}

/// Aggregate numbers for one generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Words counted after filtering (before the `max_words` cut).
    pub distinct_words: usize,
    /// Sum of all counts.
    pub total_tokens: u64,
    /// Words handed to the layout (at most `max_words`).
    pub retained_words: usize,
    /// Words drawn on the canvas.
    pub placed_words: usize,
    pub width: u32,
    pub height: u32,
    /// Wall-clock time spent placing words.
    pub layout_duration_ms: u64,
    /// Wall-clock time for the whole run.
    pub total_duration_ms: u64,
}

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    /// The rendered word cloud, `width` × `height`.
    pub image: RgbImage,
    /// The top-words bar chart.
    pub chart: RgbImage,
    pub layout: CloudLayout,
    pub report: FrequencyReport,
    pub stats: GenerationStats,
}

impl GenerationOutput {
    /// The word cloud as PNG bytes.
    pub fn png_bytes(&self) -> Result<Vec<u8>, WordCloudError> {
        encode_png(&self.image)
    }

    /// The bar chart as PNG bytes.
    pub fn chart_png_bytes(&self) -> Result<Vec<u8>, WordCloudError> {
        encode_png(&self.chart)
    }

    /// The frequency report as CSV bytes.
    pub fn csv_bytes(&self) -> Result<Vec<u8>, WordCloudError> {
        self.report.to_csv()
    }

    /// A serialisable digest of the run, optionally embedding the cloud
    /// as a PNG data-URI.
    pub fn summary(
        &self,
        config: &CloudConfig,
        embed_image: bool,
    ) -> Result<GenerationSummary, WordCloudError> {
        let image_data_uri = if embed_image {
            Some(encode_data_uri(&self.image)?)
        } else {
            None
        };
        Ok(GenerationSummary {
            background: config.background,
            colormap: config.colormap,
            font: config.font.label().to_string(),
            shape: config.shape,
            custom_mask: config.custom_mask.is_some(),
            seed: config.seed,
            stats: self.stats.clone(),
            top_words: self.report.rows.clone(),
            placed: self.layout.words.clone(),
            image_data_uri,
        })
    }
}

/// JSON-friendly description of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationSummary {
    pub background: HexColor,
    pub colormap: Colormap,
    pub font: String,
    pub shape: Shape,
    pub custom_mask: bool,
    pub seed: u64,
    pub stats: GenerationStats,
    pub top_words: Vec<WordFrequency>,
    pub placed: Vec<PlacedWord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data_uri: Option<String>,
}

/// Result of [`crate::generate::generate_from_source`].
#[derive(Debug, Clone)]
pub struct GenerationRun {
    pub acquired: AcquiredText,
    /// `None` when the acquired text was blank.
    pub output: Option<GenerationOutput>,
}

/// Paths written by [`crate::generate::write_outputs`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFiles {
    pub word_cloud: PathBuf,
    pub frequencies_csv: PathBuf,
    pub chart: PathBuf,
}

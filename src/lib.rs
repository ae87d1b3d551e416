//! # edgequake-wordcloud
//!
//! Turn free text or a PDF document into a word-cloud image, plus a table,
//! CSV and bar chart of the ten most frequent words.
//!
//! ## Pipeline Overview
//!
//! ```text
//! text / PDF
//!  │
//!  ├─ 1. Acquire   direct text, or page-by-page PDF extraction (lopdf)
//!  ├─ 2. Mask      optional shape: uploaded PNG > built-in circle/heart
//!  ├─ 3. Tokenize  one rule: case-folded, stop words removed, plurals merged
//!  ├─ 4. Layout    largest words first on a summed-area occupancy map
//!  ├─ 5. Render    fontdue glyphs coloured from a colormap
//!  └─ 6. Report    top-10 table, CSV export, bar chart
//! ```
//!
//! The cloud and the table are computed from the same frequencies, so the
//! biggest word in the image is always the first row of the table.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_wordcloud::{generate, write_outputs, CloudConfig, Colormap, Shape};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CloudConfig::builder()
//!         .colormap(Colormap::Plasma)
//!         .shape(Shape::Heart)
//!         .build()?;
//!     let text = std::fs::read_to_string("speech.txt")?;
//!     if let Some(output) = generate(&text, &config)? {
//!         print!("{}", output.report.to_table());
//!         write_outputs(&output, "out")?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Determinism
//!
//! Placement and colours come from a seeded RNG (`seed`, default 42). The
//! same text with the same configuration yields the same image.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `wordcloud` binary (clap + indicatif + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-wordcloud = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    list_fonts, CloudConfig, CloudConfigBuilder, Colormap, FontChoice, HexColor, Shape,
};
pub use error::{PageError, WordCloudError};
pub use generate::{generate, generate_from_source, write_outputs};
pub use output::{
    AcquiredText, GenerationOutput, GenerationRun, GenerationStats, GenerationSummary,
    SourceKind, WrittenFiles,
};
pub use pipeline::layout::{CloudLayout, PlacedWord};
pub use pipeline::report::{FrequencyReport, WordFrequency};
pub use pipeline::text::{acquire_text, is_generatable, TextSource};
pub use pipeline::tokenize::{Tokenizer, TokenizerOptions, WordCounts};
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback, Stage};

//! Error types for the edgequake-wordcloud library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`WordCloudError`] — **Fatal**: the run cannot produce an image at all
//!   (corrupt document, missing mask file, nothing left to draw). Returned as
//!   `Err(WordCloudError)` from the top-level entry points. No partial output
//!   is produced when one is returned.
//!
//! * [`PageError`] — **Non-fatal**: a single PDF page could not be decoded
//!   while every other page was fine. Stored inside
//!   [`crate::output::AcquiredText`] so callers can see what was skipped.
//!
//! A blank input text is *not* an error: [`crate::generate::generate`]
//! returns `Ok(None)` for it.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-wordcloud library.
#[derive(Debug, Error)]
pub enum WordCloudError {
    // ── Document errors ───────────────────────────────────────────────────
    /// The uploaded bytes do not start with the `%PDF` magic.
    #[error("Uploaded file is not a PDF document (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    /// The bytes look like a PDF but the structure cannot be parsed.
    #[error("Could not read PDF document: {detail}\nTry re-saving the file with a PDF viewer.")]
    DocumentParse { detail: String },

    // ── Mask errors ───────────────────────────────────────────────────────
    /// The built-in shape's backing image is missing or unreadable.
    #[error("Mask image for shape '{shape}' could not be read from '{path}': {source}")]
    MaskNotFound {
        shape: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An uploaded or built-in mask image could not be decoded.
    #[error("Mask image could not be decoded: {detail}")]
    MaskDecode { detail: String },

    // ── Font errors ───────────────────────────────────────────────────────
    /// The selected font file does not exist in the font directory.
    #[error("Font file not found: '{path}'\nRun with --list-fonts to see available fonts.")]
    FontNotFound { path: PathBuf },

    /// The selected font file exists but is not a usable TrueType font.
    #[error("Font '{name}' could not be loaded: {detail}")]
    FontLoad { name: String, detail: String },

    // ── Rendering errors ──────────────────────────────────────────────────
    /// Tokenization left no countable words (e.g. only stop words or numbers).
    #[error("Could not generate a word cloud: no countable words after filtering")]
    EmptyVocabulary,

    /// Not even the first word fits on the canvas.
    #[error(
        "Could not generate a word cloud: no space to draw on a {width}x{height} canvas.\n\
Either the canvas is too small or too much of the mask is blocked out."
    )]
    NoSpaceToDraw { width: u32, height: u32 },

    // ── Output errors ─────────────────────────────────────────────────────
    /// PNG encoding of the rendered image failed.
    #[error("Image encoding failed: {0}")]
    ImageEncode(String),

    /// Writing or parsing the frequency CSV failed.
    #[error("CSV export failed: {0}")]
    CsvExport(String),

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WordCloudError {
    /// True for the "could not generate" family: the input was readable but
    /// the renderer had nothing it could draw.
    pub fn is_nothing_to_render(&self) -> bool {
        matches!(
            self,
            WordCloudError::EmptyVocabulary | WordCloudError::NoSpaceToDraw { .. }
        )
    }
}

impl From<csv::Error> for WordCloudError {
    fn from(e: csv::Error) -> Self {
        WordCloudError::CsvExport(e.to_string())
    }
}

/// A non-fatal error for a single PDF page.
///
/// Stored in [`crate::output::AcquiredText::failed_pages`]. Extraction
/// continues with the remaining pages.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The page's content stream or fonts could not be decoded.
    #[error("Page {page}: text extraction failed: {detail}")]
    ExtractionFailed { page: usize, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_a_pdf_display() {
        let e = WordCloudError::NotAPdf {
            magic: b"\x89PNG".to_vec(),
        };
        assert!(e.to_string().contains("not a PDF"), "got: {e}");
    }

    #[test]
    fn mask_not_found_keeps_io_source() {
        use std::error::Error as _;
        let e = WordCloudError::MaskNotFound {
            shape: "heart".into(),
            path: PathBuf::from("masks/heart.png"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let msg = e.to_string();
        assert!(msg.contains("heart"));
        assert!(msg.contains("masks/heart.png"));
        let source = e.source().expect("io source");
        assert!(source.to_string().contains("gone"));
    }

    #[test]
    fn no_space_display() {
        let e = WordCloudError::NoSpaceToDraw {
            width: 400,
            height: 300,
        };
        assert!(e.to_string().contains("400x300"));
        assert!(e.is_nothing_to_render());
    }

    #[test]
    fn empty_vocabulary_is_nothing_to_render() {
        assert!(WordCloudError::EmptyVocabulary.is_nothing_to_render());
        assert!(!WordCloudError::InvalidConfig("x".into()).is_nothing_to_render());
    }

    #[test]
    fn page_error_display() {
        let e = PageError::ExtractionFailed {
            page: 3,
            detail: "bad font".into(),
        };
        assert_eq!(e.to_string(), "Page 3: text extraction failed: bad font");
    }
}

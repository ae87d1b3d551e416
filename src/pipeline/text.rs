//! Text acquisition: direct entry or page-by-page PDF extraction.
//!
//! Document bytes are checked for the `%PDF` magic before parsing so a
//! mis-uploaded PNG or DOCX produces a clear [`WordCloudError::NotAPdf`]
//! rather than a parser diagnostic. Pages are extracted in page order and
//! concatenated with no separator; a page whose text cannot be decoded is
//! recorded as a [`PageError`] and skipped.

use crate::error::{PageError, WordCloudError};
use crate::output::{AcquiredText, SourceKind};
use lopdf::Document;
use std::fmt;
use tracing::{debug, info, warn};

const PDF_MAGIC: &[u8] = b"%PDF";

/// Where the text of a run comes from. The two modes are exclusive.
#[derive(Clone, PartialEq, Eq)]
pub enum TextSource {
    /// Text typed by the user, used verbatim.
    Direct(String),
    /// Raw bytes of an uploaded PDF document.
    Document(Vec<u8>),
}

impl fmt::Debug for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextSource::Direct(s) => f
                .debug_tuple("Direct")
                .field(&format!("<{} chars>", s.chars().count()))
                .finish(),
            TextSource::Document(b) => f
                .debug_tuple("Document")
                .field(&format!("<{} bytes>", b.len()))
                .finish(),
        }
    }
}

/// Whether `text` should trigger generation (non-empty after trimming).
pub fn is_generatable(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Obtain the raw text for a run.
///
/// # Errors
/// - [`WordCloudError::NotAPdf`] when document bytes lack the `%PDF` magic
/// - [`WordCloudError::DocumentParse`] when the PDF structure is unreadable
pub fn acquire_text(source: &TextSource) -> Result<AcquiredText, WordCloudError> {
    match source {
        TextSource::Direct(text) => Ok(AcquiredText {
            text: text.clone(),
            source: SourceKind::Direct,
            page_count: None,
            failed_pages: Vec::new(),
        }),
        TextSource::Document(bytes) => extract_document_text(bytes),
    }
}

fn extract_document_text(bytes: &[u8]) -> Result<AcquiredText, WordCloudError> {
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(WordCloudError::NotAPdf {
            magic: bytes.iter().take(PDF_MAGIC.len()).copied().collect(),
        });
    }

    let document = Document::load_mem(bytes).map_err(|e| WordCloudError::DocumentParse {
        detail: e.to_string(),
    })?;

    let pages = document.get_pages();
    let page_count = pages.len();
    info!("PDF loaded: {} pages", page_count);

    let mut text = String::new();
    let mut failed_pages = Vec::new();

    for (idx, &page_number) in pages.keys().enumerate() {
        match document.extract_text(&[page_number]) {
            Ok(page_text) => {
                debug!("Page {} → {} chars", idx + 1, page_text.len());
                text.push_str(&page_text);
            }
            Err(e) => {
                warn!("Skipping page {}: {}", idx + 1, e);
                failed_pages.push(PageError::ExtractionFailed {
                    page: idx + 1,
                    detail: e.to_string(),
                });
            }
        }
    }

    info!(
        "Extracted {} chars from {}/{} pages",
        text.len(),
        page_count - failed_pages.len(),
        page_count
    );

    Ok(AcquiredText {
        text,
        source: SourceKind::Document,
        page_count: Some(page_count),
        failed_pages,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::{dictionary, Object, Stream};

    /// Build a PDF with one page per entry, each drawing its text with Helvetica.
    pub(crate) fn pdf_with_pages(texts: &[&str]) -> Vec<u8> {
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

    #[test]
    fn direct_text_is_verbatim() {
        let got = acquire_text(&TextSource::Direct("  hello\nworld ".into())).unwrap();
        assert_eq!(got.text, "  hello\nworld ");
        assert_eq!(got.source, SourceKind::Direct);
        assert_eq!(got.page_count, None);
    }

    #[test]
    fn direct_empty_text_is_allowed() {
        let got = acquire_text(&TextSource::Direct(String::new())).unwrap();
        assert!(got.text.is_empty());
        assert!(!is_generatable(&got.text));
    }

    #[test]
    fn generatable_requires_non_whitespace() {
        assert!(!is_generatable(""));
        assert!(!is_generatable(" \n\t "));
        assert!(is_generatable(" cat "));
    }

    #[test]
    fn non_pdf_bytes_are_rejected() {
        let err = acquire_text(&TextSource::Document(b"\x89PNG\r\n\x1a\n".to_vec())).unwrap_err();
        match err {
            WordCloudError::NotAPdf { magic } => assert_eq!(magic, b"\x89PNG".to_vec()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_bytes_are_rejected() {
        let err = acquire_text(&TextSource::Document(Vec::new())).unwrap_err();
        assert!(matches!(err, WordCloudError::NotAPdf { .. }));
    }

    #[test]
    fn truncated_pdf_is_a_parse_error() {
        let err = acquire_text(&TextSource::Document(b"%PDF-1.5\ngarbage".to_vec())).unwrap_err();
        assert!(matches!(err, WordCloudError::DocumentParse { .. }), "got: {err}");
    }

    #[test]
    fn pages_are_concatenated_in_order() {
        let pdf = pdf_with_pages(&["alpha beta", "gamma"]);
        let got = acquire_text(&TextSource::Document(pdf)).unwrap();
        assert_eq!(got.page_count, Some(2));
        assert!(got.failed_pages.is_empty());
        let alpha = got.text.find("alpha").expect("page 1 text");
        let gamma = got.text.find("gamma").expect("page 2 text");
        assert!(alpha < gamma);
        assert_eq!(got.source, SourceKind::Document);
    }

    #[test]
    fn debug_does_not_dump_payload() {
        let dbg = format!("{:?}", TextSource::Document(vec![0; 3]));
        assert_eq!(dbg, "Document(\"<3 bytes>\")");
    }
}

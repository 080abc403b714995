//! Best-effort text extraction from uploaded documents
//!
//! Extraction never fails: any decode or parse problem is logged and yields
//! an empty string, so downstream stages only ever have to detect the
//! empty-content case. Unknown formats fall back to raw byte decoding with
//! invalid bytes replaced.

use std::path::Path;

use crate::types::SourceFormat;

/// Text extractor for study documents
pub struct TextExtractor;

impl TextExtractor {
    /// Extract text from a file of the declared format. Returns an empty
    /// string when nothing could be extracted.
    pub fn extract(path: &Path, format: SourceFormat) -> String {
        match format {
            SourceFormat::Pdf => Self::extract_pdf(path),
            SourceFormat::Docx => Self::extract_docx(path),
            SourceFormat::Text | SourceFormat::Unknown => Self::extract_raw(path),
        }
    }

    /// Extract text, detecting the format from the file extension
    pub fn extract_auto(path: &Path) -> String {
        Self::extract(path, SourceFormat::from_path(path))
    }

    fn extract_pdf(path: &Path) -> String {
        match pdf_extract::extract_text(path) {
            Ok(text) => {
                tracing::info!(path = %path.display(), "extracted text from PDF");
                text
            }
            Err(e) => {
                tracing::error!(path = %path.display(), "PDF extraction failed: {e}");
                String::new()
            }
        }
    }

    fn extract_docx(path: &Path) -> String {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(path = %path.display(), "failed to read DOCX file: {e}");
                return String::new();
            }
        };

        let docx = match docx_rs::read_docx(&data) {
            Ok(docx) => docx,
            Err(e) => {
                tracing::error!(path = %path.display(), "DOCX parsing failed: {e}");
                return String::new();
            }
        };

        let mut text = String::new();
        for child in docx.document.children {
            if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
                for para_child in paragraph.children {
                    if let docx_rs::ParagraphChild::Run(run) = para_child {
                        for run_child in run.children {
                            if let docx_rs::RunChild::Text(t) = run_child {
                                text.push_str(&t.text);
                            }
                        }
                    }
                }
                text.push('\n');
            }
        }

        tracing::info!(path = %path.display(), "extracted text from DOCX");
        text
    }

    fn extract_raw(path: &Path) -> String {
        match std::fs::read(path) {
            Ok(data) => String::from_utf8_lossy(&data).into_owned(),
            Err(e) => {
                tracing::error!(path = %path.display(), "failed to read file: {e}");
                String::new()
            }
        }
    }
}

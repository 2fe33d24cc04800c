//! PDF text extraction backends

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::ExtractedText;

/// Backend identifier for `pdf-extract`
pub const PDF_EXTRACT_BACKEND: &str = "pdf-extract";
/// Backend identifier for the `lopdf` page-by-page fallback
pub const LOPDF_BACKEND: &str = "lopdf";

/// Anything that can turn a PDF on disk into raw text
pub trait TextExtractor {
    /// Extract raw text. Callers go through [`extract_text`], which has
    /// already checked that `path` is an existing regular file.
    fn extract(&self, path: &Path) -> Result<ExtractedText>;
}

/// Fail with `NotFound` for a missing path and `NotAFile` for a directory
pub fn ensure_input_file(path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|_| Error::NotFound(path.to_path_buf()))?;
    if metadata.is_dir() {
        return Err(Error::NotAFile(path.to_path_buf()));
    }
    Ok(())
}

/// Validate the input path, then extract its text with `extractor`
pub fn extract_text(extractor: &dyn TextExtractor, path: &Path) -> Result<ExtractedText> {
    ensure_input_file(path)?;
    let extracted = extractor.extract(path)?;
    tracing::info!(
        "Extracted {} chars from {} using {}",
        extracted.text.chars().count(),
        path.display(),
        extracted.backend
    );
    Ok(extracted)
}

/// Text extraction for digitally-born PDFs.
///
/// Tries `pdf-extract` first and falls back to `lopdf` page-by-page
/// extraction when it fails or finds no text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract from in-memory PDF bytes
    pub fn extract_from_mem(&self, data: &[u8]) -> Result<ExtractedText> {
        let primary = Self::extract_with_pdf_extract(data);
        match &primary {
            Ok(text) if !text.is_empty() => {
                return Ok(ExtractedText::new(text.clone(), PDF_EXTRACT_BACKEND));
            }
            Ok(_) => tracing::debug!("pdf-extract returned empty text, trying lopdf"),
            Err(e) => tracing::warn!("pdf-extract failed: {}, trying lopdf", e),
        }

        match Self::extract_with_lopdf(data) {
            Ok(text) => Ok(ExtractedText::new(text, LOPDF_BACKEND)),
            Err(fallback_err) => match primary {
                // Both backends ran; an empty document is still a valid result
                Ok(text) => Ok(ExtractedText::new(text, PDF_EXTRACT_BACKEND)),
                Err(_) => Err(fallback_err),
            },
        }
    }

    fn extract_with_pdf_extract(data: &[u8]) -> Result<String> {
        // pdf-extract panics on some malformed font tables
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(data)
        }));

        match outcome {
            Ok(Ok(text)) => Ok(text.trim().to_string()),
            Ok(Err(e)) => Err(Error::extraction(PDF_EXTRACT_BACKEND, e.to_string())),
            Err(_) => Err(Error::extraction(
                PDF_EXTRACT_BACKEND,
                "extraction panicked on this document",
            )),
        }
    }

    fn extract_with_lopdf(data: &[u8]) -> Result<String> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::extraction(LOPDF_BACKEND, format!("Failed to load PDF: {}", e)))?;

        let mut parts = Vec::new();
        for page_num in doc.get_pages().keys() {
            match doc.extract_text(&[*page_num]) {
                Ok(text) => parts.push(text.trim_end().to_string()),
                Err(e) => {
                    tracing::debug!("Could not extract text for page {}: {}", page_num, e);
                    parts.push(String::new());
                }
            }
        }

        Ok(parts.join("\n\n").trim().to_string())
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedText> {
        let data = std::fs::read(path)?;
        self.extract_from_mem(&data)
    }
}

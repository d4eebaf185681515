//! PDF text extraction with an ordered strategy fallback.
//!
//! Extraction is pipeline-layer: ingestion supplies raw bytes, this module
//! returns plain UTF-8 text. Two strategies run in order — `pdf-extract`
//! first (better layout handling), then a `lopdf` page-text pass for
//! documents the primary parser rejects.
//!
//! A strategy that *fails* is distinct from one that *succeeds with empty
//! text*: the runner falls back to the next strategy in both cases, but the
//! final error reports [`ExtractError::Empty`] when at least one strategy
//! parsed the document and found nothing usable, and
//! [`ExtractError::Unreadable`] when every strategy failed outright.

use std::path::Path;

use thiserror::Error;

/// Extraction failure for a single document.
///
/// Reported per-document; never aborts processing of other documents in an
/// ingestion batch.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{strategy}: {message}")]
    Strategy { strategy: &'static str, message: String },
    #[error("no text could be extracted from the document")]
    Empty,
    #[error("failed to read document: {0}")]
    Unreadable(String),
}

/// One extraction backend in the fallback chain.
pub trait ExtractStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Attempt extraction. `Ok` with an empty string means the document
    /// parsed but contained no recoverable text.
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Primary strategy: the `pdf-extract` crate.
pub struct PdfExtractStrategy;

impl ExtractStrategy for PdfExtractStrategy {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Strategy {
            strategy: self.name(),
            message: e.to_string(),
        })
    }
}

/// Fallback strategy: `lopdf` page-by-page text extraction.
///
/// Handles some malformed PDFs the primary parser rejects.
pub struct LopdfStrategy;

impl ExtractStrategy for LopdfStrategy {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let doc = lopdf::Document::load_mem(bytes).map_err(|e| ExtractError::Strategy {
            strategy: self.name(),
            message: e.to_string(),
        })?;
        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        doc.extract_text(&pages).map_err(|e| ExtractError::Strategy {
            strategy: self.name(),
            message: e.to_string(),
        })
    }
}

/// Ordered-fallback extractor over a strategy list.
pub struct Extractor {
    strategies: Vec<Box<dyn ExtractStrategy>>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            strategies: vec![Box::new(PdfExtractStrategy), Box::new(LopdfStrategy)],
        }
    }
}

impl Extractor {
    pub fn new(strategies: Vec<Box<dyn ExtractStrategy>>) -> Self {
        Self { strategies }
    }

    /// Extract text from raw PDF bytes.
    ///
    /// Tries each strategy in order. The first non-empty result wins. When a
    /// strategy fails, the next is tried with a stderr note (the degraded
    /// path is visible but non-fatal).
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let mut saw_empty = false;
        let mut last_failure: Option<ExtractError> = None;

        for strategy in &self.strategies {
            match strategy.extract(bytes) {
                Ok(text) => {
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        saw_empty = true;
                        continue;
                    }
                    return Ok(trimmed.to_string());
                }
                Err(e) => {
                    eprintln!("warning: {} failed, trying next strategy: {}", strategy.name(), e);
                    last_failure = Some(e);
                }
            }
        }

        if saw_empty {
            Err(ExtractError::Empty)
        } else {
            Err(last_failure.unwrap_or(ExtractError::Empty))
        }
    }

    /// Extract text from a PDF file on disk.
    pub fn extract_file(&self, path: &Path) -> Result<String, ExtractError> {
        let bytes = std::fs::read(path).map_err(|e| ExtractError::Unreadable(e.to_string()))?;
        self.extract_bytes(&bytes)
    }
}

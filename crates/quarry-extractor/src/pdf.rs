//! PDF page counting and page-range splitting

use lopdf::Document;
use quarry_domain::traits::DocumentSplitter;
use quarry_domain::PageRange;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors from the PDF splitter
#[derive(Error, Debug)]
pub enum PdfError {
    /// Document could not be parsed
    #[error("Failed to parse PDF: {0}")]
    Parse(#[from] lopdf::Error),

    /// Requested range lies outside the document
    #[error("Page range [{start}, {end}) exceeds document of {pages} pages")]
    OutOfRange {
        /// Range start (0-based)
        start: usize,
        /// Range end (exclusive)
        end: usize,
        /// Pages in the document
        pages: usize,
    },

    /// Fragment could not be serialized
    #[error("Failed to write PDF fragment: {0}")]
    Write(String),
}

/// lopdf-backed [`DocumentSplitter`]
///
/// Each fragment is a standalone PDF holding only the requested pages, with
/// unreferenced objects pruned.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfSplitter;

impl PdfSplitter {
    /// Create a splitter
    pub fn new() -> Self {
        Self
    }
}

impl DocumentSplitter for PdfSplitter {
    type Error = PdfError;

    fn page_count(&self, document: &[u8]) -> Result<usize, PdfError> {
        let doc = Document::load_mem(document)?;
        Ok(doc.get_pages().len())
    }

    fn split(&self, document: &[u8], ranges: &[PageRange]) -> Result<Vec<Vec<u8>>, PdfError> {
        let source = Document::load_mem(document)?;
        // Page numbers are 1-based, in page-tree order
        let page_numbers: Vec<u32> = source.get_pages().keys().copied().collect();
        let total = page_numbers.len();

        ranges
            .iter()
            .map(|range| {
                if range.end > total || range.is_empty() {
                    return Err(PdfError::OutOfRange {
                        start: range.start,
                        end: range.end,
                        pages: total,
                    });
                }

                let keep: BTreeSet<u32> = page_numbers[range.start..range.end]
                    .iter()
                    .copied()
                    .collect();
                let drop: Vec<u32> = page_numbers
                    .iter()
                    .copied()
                    .filter(|number| !keep.contains(number))
                    .collect();

                let mut fragment = source.clone();
                fragment.delete_pages(&drop);
                fragment.prune_objects();
                fragment.compress();

                let mut buffer = Vec::new();
                fragment
                    .save_to(&mut buffer)
                    .map_err(|e| PdfError::Write(e.to_string()))?;
                Ok(buffer)
            })
            .collect()
    }
}

//! Page-window chunk planning for large documents

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use quarry_domain::traits::DocumentSplitter;
use quarry_domain::{Chunk, Job, PageRange};
use tracing::{info, warn};

/// How a job is processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingMode {
    /// The whole document is one unit of work
    Single,
    /// The document is split into page windows
    Chunked,
}

/// Output of [`ChunkPlanner::plan`]
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    /// Single or chunked processing
    pub mode: ProcessingMode,

    /// Pages in the document, `None` when the parser could not tell
    pub page_count: Option<usize>,

    /// Units of work in ascending page order (never empty)
    pub chunks: Vec<Chunk>,
}

/// Decides whether a document needs splitting and materializes the chunks
pub struct ChunkPlanner<D> {
    splitter: D,
    page_threshold: usize,
    size_threshold: usize,
    chunk_page_size: usize,
    max_pages: usize,
}

impl<D> ChunkPlanner<D>
where
    D: DocumentSplitter,
{
    /// Create a planner using the thresholds from `config`
    pub fn new(splitter: D, config: &ExtractorConfig) -> Self {
        Self {
            splitter,
            page_threshold: config.page_threshold,
            size_threshold: config.size_threshold_bytes,
            chunk_page_size: config.chunk_page_size,
            max_pages: config.max_pages,
        }
    }

    /// True when a document of this shape must be chunked (strictly above
    /// either threshold)
    pub fn needs_chunking(&self, page_count: usize, byte_size: usize) -> bool {
        page_count > self.page_threshold || byte_size > self.size_threshold
    }

    /// Plan the units of work for `job`
    ///
    /// Parse and split failures degrade to a single chunk holding the whole
    /// document; they are logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns `ExtractorError::DocumentTooLarge` when the page count exceeds
    /// the configured maximum.
    pub fn plan(&self, job: &Job) -> Result<ChunkPlan, ExtractorError> {
        let page_count = match self.splitter.page_count(&job.document) {
            Ok(count) => count,
            Err(e) => {
                warn!("Could not determine page count, processing as a single chunk: {}", e);
                return Ok(Self::single(job, None));
            }
        };

        if page_count > self.max_pages {
            return Err(ExtractorError::DocumentTooLarge {
                pages: page_count,
                max_pages: self.max_pages,
            });
        }

        if !self.needs_chunking(page_count, job.byte_len()) {
            return Ok(Self::single(job, Some(page_count)));
        }

        let ranges = PageRange::windows(page_count, self.chunk_page_size);
        if ranges.len() <= 1 {
            // Over the size threshold but not enough pages to split
            return Ok(Self::single(job, Some(page_count)));
        }

        info!(
            "Document has {} pages ({} bytes), splitting into chunks of {} pages",
            page_count,
            job.byte_len(),
            self.chunk_page_size
        );

        let fragments = match self.splitter.split(&job.document, &ranges) {
            Ok(fragments) if fragments.len() == ranges.len() => fragments,
            Ok(fragments) => {
                warn!(
                    "Splitter returned {} fragments for {} ranges, processing as a single chunk",
                    fragments.len(),
                    ranges.len()
                );
                return Ok(Self::single(job, Some(page_count)));
            }
            Err(e) => {
                warn!("Failed to split document, processing as a single chunk: {}", e);
                return Ok(Self::single(job, Some(page_count)));
            }
        };

        let chunks: Vec<Chunk> = ranges
            .into_iter()
            .zip(fragments)
            .enumerate()
            .map(|(index, (range, payload))| {
                info!(
                    "Chunk {} created: {} ({} bytes)",
                    index + 1,
                    range,
                    payload.len()
                );
                Chunk {
                    index,
                    page_range: Some(range),
                    payload,
                }
            })
            .collect();

        Ok(ChunkPlan {
            mode: ProcessingMode::Chunked,
            page_count: Some(page_count),
            chunks,
        })
    }

    fn single(job: &Job, page_count: Option<usize>) -> ChunkPlan {
        ChunkPlan {
            mode: ProcessingMode::Single,
            page_count,
            chunks: vec![Chunk {
                index: 0,
                page_range: page_count.map(|end| PageRange { start: 0, end }),
                payload: job.document.clone(),
            }],
        }
    }
}

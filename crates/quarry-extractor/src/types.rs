//! Result types for extraction runs

use crate::chunking::ProcessingMode;
use quarry_domain::{JobId, Record};

/// Result of a successful extraction run
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Records of every chunk, concatenated in chunk order
    pub records: Vec<Record>,

    /// Metadata about the run
    pub metadata: ExtractionMetadata,
}

/// Metadata about an extraction run
#[derive(Debug, Clone)]
pub struct ExtractionMetadata {
    /// Job the run belonged to
    pub job_id: JobId,

    /// Single or chunked processing
    pub mode: ProcessingMode,

    /// Pages in the document, if the parser could tell
    pub page_count: Option<usize>,

    /// Units of work processed
    pub chunks: usize,

    /// Extraction calls issued across all chunks
    pub calls: usize,

    /// Credential rotations across all chunks
    pub rotations: usize,

    /// Wall-clock time of the run in milliseconds
    pub processing_time_ms: u64,
}

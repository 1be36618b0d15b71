//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between orchestration logic and
//! infrastructure. Implementations live in other crates.

use crate::{Credential, PageRange, Record};
use std::future::Future;

/// Trait for the structured-extraction backend
///
/// Implemented by the infrastructure layer (quarry-llm). The credential is an
/// explicit parameter: implementations must not read ambient process state to
/// decide which key to use.
pub trait ExtractionClient {
    /// Error type for backend failures
    ///
    /// The orchestrator classifies failures by their `Display` text and hands
    /// fatal ones back to the caller unchanged.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Extract records from one document fragment
    fn extract(
        &self,
        instruction: &str,
        fragment: &[u8],
        credential: &Credential,
    ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send;
}

/// Trait for the document parsing/splitting primitive
///
/// Implemented by the application layer (quarry-extractor, lopdf-backed).
pub trait DocumentSplitter {
    /// Error type for parse or split failures
    type Error: std::fmt::Display;

    /// Count the pages of a document
    fn page_count(&self, document: &[u8]) -> Result<usize, Self::Error>;

    /// Materialize one self-contained fragment per requested page range,
    /// in the order given
    fn split(&self, document: &[u8], ranges: &[PageRange]) -> Result<Vec<Vec<u8>>, Self::Error>;
}

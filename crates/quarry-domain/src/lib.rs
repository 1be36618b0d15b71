//! Quarry Domain Layer
//!
//! Value types and collaborator traits shared by every Quarry crate.
//!
//! ## Key Concepts
//!
//! - **Credential**: an opaque secret granting one quota allotment against the
//!   extraction backend
//! - **Job**: a submitted document plus the instruction describing what to extract
//! - **Chunk**: a contiguous page-range fragment processed as one unit of work
//! - **Record**: one extracted structured item, opaque beyond "a list of them"
//!
//! ## Architecture
//!
//! - Pure value types, no I/O
//! - Trait definitions for the external collaborators (extraction backend,
//!   document splitter); implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod credential;
pub mod document;
pub mod job;
pub mod record;
pub mod traits;

// Re-exports for convenience
pub use credential::Credential;
pub use document::{Chunk, PageRange};
pub use job::{Job, JobId};
pub use record::Record;

//! Quarry Extractor
//!
//! Drives a large document through a quota-limited extraction backend.
//!
//! # Overview
//!
//! Documents above the page or size threshold are split into page windows.
//! Each window is sent to the backend under a bounded retry budget that
//! rotates through a pool of API keys, backing off progressively when the
//! backend reports quota or capacity trouble. Records from every window are
//! concatenated in page order.
//!
//! # Architecture
//!
//! ```text
//! Job → ChunkPlanner → [Chunk] → RetryScheduler ⇄ CredentialPool
//!                                      ↓
//!                              ExtractionClient → ResultAggregator → Records
//! ```
//!
//! # Example Usage
//!
//! ```
//! use quarry_domain::Job;
//! use quarry_extractor::{Extractor, ExtractorConfig, RecordingSleeper};
//! use quarry_llm::{LlmError, ScriptedProvider};
//! use serde_json::json;
//!
//! # tokio_test_block(async {
//! let provider = ScriptedProvider::default();
//! provider.push_err(LlmError::RateLimited("quota exceeded".to_string()));
//! provider.push_ok(vec![json!({"folio": "A-1"}).into()]);
//!
//! let config = ExtractorConfig {
//!     api_keys: vec!["key-1".to_string(), "key-2".to_string()],
//!     ..ExtractorConfig::default()
//! };
//! let sleeper = RecordingSleeper::new();
//! let extractor = Extractor::new(provider, config)
//!     .unwrap()
//!     .with_sleeper(sleeper.clone());
//!
//! // Not a parseable PDF, so the whole payload is a single unit of work
//! let result = extractor.extract(Job::new(b"raw".to_vec(), "extract")).await.unwrap();
//!
//! assert_eq!(result.records.len(), 1);
//! assert_eq!(result.metadata.rotations, 1);
//! assert_eq!(sleeper.delays().len(), 1);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

#![warn(missing_docs)]

mod aggregator;
mod chunking;
mod classifier;
mod config;
mod credentials;
mod error;
mod extractor;
mod pacing;
mod pdf;
mod scheduler;
mod types;


pub use aggregator::ResultAggregator;
pub use chunking::{ChunkPlan, ChunkPlanner, ProcessingMode};
pub use classifier::{Classification, ErrorClassifier, LexicalClassifier, DEFAULT_RETRYABLE_TERMS};
pub use config::ExtractorConfig;
pub use credentials::CredentialPool;
pub use error::ExtractorError;
pub use extractor::{extract_records, Extractor};
pub use pacing::{RecordingSleeper, Sleeper, TokioSleeper};
pub use pdf::{PdfError, PdfSplitter};
pub use scheduler::{AttemptOutcome, AttemptResult, RetryPolicy, RetryScheduler, UnitReport};
pub use types::{ExtractionMetadata, ExtractionResult};

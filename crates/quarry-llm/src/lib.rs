//! Quarry LLM Provider Layer
//!
//! Implementations of the `ExtractionClient` trait from `quarry-domain`.
//!
//! # Providers
//!
//! - `ScriptedProvider`: Deterministic mock for testing
//! - `GeminiProvider`: Google Gemini `generateContent` API with inline PDF input
//!
//! # Examples
//!
//! ```
//! use quarry_domain::traits::ExtractionClient;
//! use quarry_domain::{Credential, Record};
//! use quarry_llm::ScriptedProvider;
//! use serde_json::json;
//!
//! # tokio_test_block(async {
//! let provider = ScriptedProvider::new(vec![Record::new(json!({"folio": "A-1"}))]);
//! let records = provider
//!     .extract("extract reports", b"%PDF-1.5", &Credential::new("key"))
//!     .await
//!     .unwrap();
//! assert_eq!(records.len(), 1);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

#![warn(missing_docs)]

pub mod gemini;
pub mod parser;

use quarry_domain::traits::ExtractionClient;
use quarry_domain::{Credential, Record};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

pub use gemini::GeminiProvider;
pub use parser::parse_records;

/// Errors that can occur during LLM operations
///
/// Messages deliberately echo what the backend reported (status codes,
/// "Content field missing") because callers classify failures by text.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Non-success HTTP status from the backend
    #[error("HTTP {status}: {body}")]
    Http {
        /// Status code
        status: u16,
        /// Response body, as returned
        body: String,
    },

    /// Quota or rate limit exceeded (HTTP 429)
    #[error("HTTP 429 rate limit exceeded: {0}")]
    RateLimited(String),

    /// The model answered without a content field
    #[error("Content field missing from model response{}", finish_reason.as_ref().map(|r| format!(" (finish reason: {})", r)).unwrap_or_default())]
    MissingContent {
        /// Finish reason reported alongside the empty candidate, if any
        finish_reason: Option<String>,
    },

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Credential rejected
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// One call observed by [`ScriptedProvider`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Instruction passed to the call
    pub instruction: String,
    /// Credential the call was authorized with
    pub credential: Credential,
    /// Fragment size in bytes
    pub fragment_len: usize,
}

/// Mock extraction backend for deterministic testing
///
/// Replies are consumed from a script in call order; once the script runs
/// dry every call returns the default records. Clones share the script and
/// the call log.
///
/// # Examples
///
/// ```
/// use quarry_llm::{LlmError, ScriptedProvider};
///
/// let provider = ScriptedProvider::default();
/// provider.push_err(LlmError::RateLimited("quota exceeded".to_string()));
/// provider.push_ok(Vec::new());
/// assert_eq!(provider.remaining(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    default_records: Arc<Vec<Record>>,
    script: Arc<Mutex<VecDeque<Result<Vec<Record>, LlmError>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl ScriptedProvider {
    /// Create a provider that returns `default_records` once the script is empty
    pub fn new(default_records: Vec<Record>) -> Self {
        Self {
            default_records: Arc::new(default_records),
            ..Self::default()
        }
    }

    /// Queue a successful reply
    pub fn push_ok(&self, records: Vec<Record>) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(records));
    }

    /// Queue a failing reply
    pub fn push_err(&self, error: LlmError) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(error));
    }

    /// Number of scripted replies not yet consumed
    pub fn remaining(&self) -> usize {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Get the number of times extract was called
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Snapshot of every call made so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn next_reply(&self) -> Result<Vec<Record>, LlmError> {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Ok(self.default_records.as_ref().clone()))
    }
}

impl ExtractionClient for ScriptedProvider {
    type Error = LlmError;

    async fn extract(
        &self,
        instruction: &str,
        fragment: &[u8],
        credential: &Credential,
    ) -> Result<Vec<Record>, Self::Error> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                instruction: instruction.to_string(),
                credential: credential.clone(),
                fragment_len: fragment.len(),
            });

        self.next_reply()
    }
}

//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Configuration error (including an empty credential pool)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Attempt budget exhausted on retryable failures
    #[error(
        "Exhausted all attempts with {credentials} API keys. Total attempts: {attempts}. \
         Last error: {last_error}. The document may be too complex or large to process; \
         try splitting it into smaller sections."
    )]
    ExhaustedRetries {
        /// Number of credentials in the pool
        credentials: usize,
        /// Extraction calls issued for the failing unit of work
        attempts: usize,
        /// Message of the last retryable failure
        last_error: String,
    },

    /// Failure the backend reported that was not recognized as transient,
    /// passed through unchanged
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync + 'static>),

    /// Document exceeds the configured page limit
    #[error("Document has {pages} pages, more than the allowed maximum of {max_pages}")]
    DocumentTooLarge {
        /// Pages in the submitted document
        pages: usize,
        /// Configured limit
        max_pages: usize,
    },
}

impl ExtractorError {
    /// Wrap a backend error verbatim
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ExtractorError::Backend(Box::new(error))
    }

    /// Downcast a passed-through backend error to the client's error type
    pub fn backend_error<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            ExtractorError::Backend(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for ExtractorError {
    fn from(e: toml::de::Error) -> Self {
        ExtractorError::Config(format!("Failed to parse TOML: {}", e))
    }
}

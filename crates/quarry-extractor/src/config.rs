//! Configuration for the Extractor

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
///
/// Durations are whole seconds so the file form stays readable.
///
/// # Examples
///
/// ```
/// use quarry_extractor::ExtractorConfig;
///
/// let config = ExtractorConfig::from_toml(r#"
///     api_keys = ["key-a", "key-b"]
///     chunk_page_size = 4
/// "#).unwrap();
///
/// assert_eq!(config.api_keys.len(), 2);
/// assert_eq!(config.chunk_page_size, 4);
/// assert_eq!(config.page_threshold, 12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Ordered API keys; blanks and duplicates are dropped when the pool is built
    pub api_keys: Vec<String>,

    /// Attempts allowed per credential for one unit of work
    pub max_retries_per_credential: u32,

    /// Documents with more pages than this are chunked
    pub page_threshold: usize,

    /// Documents larger than this (bytes) are chunked
    pub size_threshold_bytes: usize,

    /// Pages per chunk when chunking
    pub chunk_page_size: usize,

    /// Escalating pauses after retryable failures (seconds), plateauing at the last
    pub progressive_delays_secs: Vec<u64>,

    /// Pause between consecutive chunks (seconds)
    pub inter_chunk_pause_secs: u64,

    /// Pause after a non-retryable failure before trying the next credential (seconds)
    pub fatal_retry_pause_secs: u64,

    /// Wall-clock limit for one extraction call (seconds); 0 disables it
    pub call_timeout_secs: u64,

    /// Documents with more pages are rejected before any call
    pub max_pages: usize,

    /// Suffix each chunk's instruction with its position and page span
    pub annotate_chunks: bool,

    /// Extra case-insensitive phrases treated as transient failures
    pub extra_retryable_terms: Vec<String>,
}

impl ExtractorConfig {
    /// Backoff table as Durations
    pub fn progressive_delays(&self) -> Vec<Duration> {
        self.progressive_delays_secs
            .iter()
            .copied()
            .map(Duration::from_secs)
            .collect()
    }

    /// Get the inter-chunk pause as a Duration
    pub fn inter_chunk_pause(&self) -> Duration {
        Duration::from_secs(self.inter_chunk_pause_secs)
    }

    /// Get the post-fatal pause as a Duration
    pub fn fatal_retry_pause(&self) -> Duration {
        Duration::from_secs(self.fatal_retry_pause_secs)
    }

    /// Per-call timeout, `None` when disabled
    pub fn call_timeout(&self) -> Option<Duration> {
        (self.call_timeout_secs > 0).then(|| Duration::from_secs(self.call_timeout_secs))
    }

    /// Validate the configuration
    ///
    /// API keys are not checked here: they may still be merged from the
    /// environment. An empty pool is rejected when the Extractor is built.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_retries_per_credential == 0 {
            return Err("max_retries_per_credential must be greater than 0".to_string());
        }
        if self.page_threshold == 0 {
            return Err("page_threshold must be greater than 0".to_string());
        }
        if self.size_threshold_bytes == 0 {
            return Err("size_threshold_bytes must be greater than 0".to_string());
        }
        if self.chunk_page_size == 0 {
            return Err("chunk_page_size must be greater than 0".to_string());
        }
        if self.max_pages == 0 {
            return Err("max_pages must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration mirroring observed backend quotas
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            max_retries_per_credential: 2,
            page_threshold: 12,
            size_threshold_bytes: 4 * 1024 * 1024,
            chunk_page_size: 8,
            progressive_delays_secs: vec![5, 10, 20, 30, 60],
            inter_chunk_pause_secs: 8,
            fatal_retry_pause_secs: 5,
            call_timeout_secs: 300,
            max_pages: 60,
            annotate_chunks: true,
            extra_retryable_terms: Vec::new(),
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: smaller chunks, short pauses, fewer attempts
    pub fn aggressive() -> Self {
        Self {
            max_retries_per_credential: 1,
            page_threshold: 6,
            size_threshold_bytes: 2 * 1024 * 1024,
            chunk_page_size: 4,
            progressive_delays_secs: vec![2, 5, 10],
            inter_chunk_pause_secs: 3,
            fatal_retry_pause_secs: 2,
            call_timeout_secs: 120,
            ..Self::default()
        }
    }

    /// Lenient preset: larger chunks, longer pauses, more attempts
    pub fn lenient() -> Self {
        Self {
            max_retries_per_credential: 3,
            page_threshold: 20,
            size_threshold_bytes: 8 * 1024 * 1024,
            chunk_page_size: 12,
            progressive_delays_secs: vec![10, 20, 40, 60, 120],
            inter_chunk_pause_secs: 15,
            fatal_retry_pause_secs: 10,
            call_timeout_secs: 600,
            max_pages: 120,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

//! Integration tests for quarry-extractor
//!
//! These tests drive the public API with a scripted backend and a splitter
//! that fakes page structure, checking ordering, budget and pacing together.

use quarry_domain::traits::DocumentSplitter;
use quarry_domain::{Job, PageRange, Record};
use quarry_extractor::{Extractor, ExtractorConfig, ExtractorError, RecordingSleeper};
use quarry_llm::{LlmError, ScriptedProvider};
use serde_json::json;
use std::time::Duration;

/// Pretends every document has a fixed number of pages and tags each
/// fragment with its first page
struct PagedSplitter(usize);

impl DocumentSplitter for PagedSplitter {
    type Error = String;

    fn page_count(&self, _document: &[u8]) -> Result<usize, String> {
        Ok(self.0)
    }

    fn split(&self, _document: &[u8], ranges: &[PageRange]) -> Result<Vec<Vec<u8>>, String> {
        Ok(ranges.iter().map(|r| vec![r.start as u8; r.len()]).collect())
    }
}

fn config(keys: &[&str]) -> ExtractorConfig {
    ExtractorConfig {
        api_keys: keys.iter().map(|k| k.to_string()).collect(),
        ..ExtractorConfig::default()
    }
}

fn record(n: u64) -> Record {
    json!({ "n": n }).into()
}

#[tokio::test]
async fn test_flaky_backend_completes_in_order() {
    let provider = ScriptedProvider::default();
    // Chunk 1: two transient failures, then success
    provider.push_err(LlmError::RateLimited("quota exceeded".to_string()));
    provider.push_err(LlmError::MissingContent { finish_reason: None });
    provider.push_ok(vec![record(1), record(2)]);
    // Chunk 2: overloaded once
    provider.push_err(LlmError::Http {
        status: 503,
        body: "UNAVAILABLE".to_string(),
    });
    provider.push_ok(vec![record(3)]);
    // Chunk 3: clean
    provider.push_ok(vec![record(4)]);

    let sleeper = RecordingSleeper::new();
    let extractor = Extractor::new(provider.clone(), config(&["a", "b", "c"]))
        .unwrap()
        .with_splitter(PagedSplitter(24))
        .with_sleeper(sleeper.clone());

    let result = extractor
        .extract(Job::new(vec![0u8; 16], "extract"))
        .await
        .unwrap();

    assert_eq!(
        result.records,
        vec![record(1), record(2), record(3), record(4)]
    );
    assert_eq!(result.metadata.chunks, 3);
    assert_eq!(result.metadata.calls, 6);
    assert_eq!(result.metadata.rotations, 3);

    // Backoff restarts for each chunk; inter-chunk pauses sit between them
    let secs: Vec<u64> = sleeper.delays().iter().map(Duration::as_secs).collect();
    assert_eq!(secs, vec![5, 10, 8, 5, 8]);
}

#[tokio::test]
async fn test_budget_is_per_chunk() {
    let provider = ScriptedProvider::default();
    // Chunk 1 consumes three of its four attempts
    for _ in 0..3 {
        provider.push_err(LlmError::RateLimited("quota exceeded".to_string()));
    }
    provider.push_ok(vec![record(1)]);
    // Chunk 2 still gets a full budget of four
    for _ in 0..3 {
        provider.push_err(LlmError::RateLimited("quota exceeded".to_string()));
    }
    provider.push_ok(vec![record(2)]);

    let extractor = Extractor::new(provider.clone(), config(&["a", "b"]))
        .unwrap()
        .with_splitter(PagedSplitter(16))
        .with_sleeper(RecordingSleeper::new());

    let result = extractor
        .extract(Job::new(vec![0u8; 16], "extract"))
        .await
        .unwrap();

    assert_eq!(result.records, vec![record(1), record(2)]);
    assert_eq!(provider.call_count(), 8);
}

#[tokio::test]
async fn test_exhaustion_message_is_actionable() {
    let provider = ScriptedProvider::default();
    for _ in 0..2 {
        provider.push_err(LlmError::RateLimited("quota exceeded".to_string()));
    }

    let mut cfg = config(&["a", "b"]);
    cfg.max_retries_per_credential = 1;
    let extractor = Extractor::new(provider, cfg)
        .unwrap()
        .with_splitter(PagedSplitter(3))
        .with_sleeper(RecordingSleeper::new());

    let err = extractor
        .extract(Job::new(vec![0u8; 16], "extract"))
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractorError::ExhaustedRetries { .. }));
    let message = err.to_string();
    assert!(message.contains("2 API keys"));
    assert!(message.contains("Total attempts: 2"));
    assert!(message.contains("smaller sections"));
}

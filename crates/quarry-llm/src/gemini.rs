//! Gemini Provider Implementation
//!
//! Sends a document fragment inline (base64, `application/pdf`) to the
//! Gemini `generateContent` API and parses the JSON answer into records.
//!
//! The API key is supplied per call, so one provider instance serves every
//! credential in a pool.
//!
//! # Examples
//!
//! ```no_run
//! use quarry_llm::GeminiProvider;
//!
//! let provider = GeminiProvider::default_endpoint("gemini-2.5-flash")
//!     .unwrap()
//!     .with_system_prompt("You extract soil analysis reports.");
//! ```

use crate::parser::parse_records;
use crate::LlmError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use quarry_domain::traits::ExtractionClient;
use quarry_domain::{Credential, Record};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Gemini API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default connect timeout (10 seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const PDF_MIME_TYPE: &str = "application/pdf";
const JSON_MIME_TYPE: &str = "application/json";

/// Gemini API provider for structured extraction
pub struct GeminiProvider {
    endpoint: String,
    model: String,
    system_prompt: Option<String>,
    client: reqwest::Client,
}

/// Request body for the generateContent API
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

/// Response from the generateContent API
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: API base URL (e.g., "https://generativelanguage.googleapis.com")
    /// - `model`: Model to use (e.g., "gemini-2.5-flash")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            model: model.into(),
            system_prompt: None,
            client,
        })
    }

    /// Create a provider against the public Gemini endpoint
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the system prompt sent with every call
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Model name in use
    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    fn build_request<'a>(&'a self, instruction: &'a str, fragment: &[u8]) -> GenerateRequest<'a> {
        let system_instruction = self.system_prompt.as_deref().map(|text| Content {
            role: None,
            parts: vec![Part::Text { text }],
        });

        GenerateRequest {
            system_instruction,
            contents: vec![Content {
                role: Some("user"),
                parts: vec![
                    Part::Text { text: instruction },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: PDF_MIME_TYPE,
                            data: STANDARD.encode(fragment),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME_TYPE,
            },
        }
    }
}

/// Pull the answer text out of the first candidate
fn answer_text(response: GenerateResponse) -> Result<String, LlmError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(LlmError::MissingContent { finish_reason: None })?;

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LlmError::MissingContent {
            finish_reason: candidate.finish_reason,
        });
    }

    Ok(text)
}

impl ExtractionClient for GeminiProvider {
    type Error = LlmError;

    async fn extract(
        &self,
        instruction: &str,
        fragment: &[u8],
        credential: &Credential,
    ) -> Result<Vec<Record>, Self::Error> {
        let request_body = self.build_request(instruction, fragment);

        debug!(
            "Calling {} with {} byte fragment",
            self.model,
            fragment.len()
        );

        let response = self
            .client
            .post(self.request_url())
            .header("x-goog-api-key", credential.expose())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let error = if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                LlmError::RateLimited(body)
            } else if status == reqwest::StatusCode::UNAUTHORIZED
                || status == reqwest::StatusCode::FORBIDDEN
            {
                LlmError::Unauthorized(format!("HTTP {}: {}", status.as_u16(), body))
            } else {
                LlmError::Http {
                    status: status.as_u16(),
                    body,
                }
            };
            return Err(error);
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let text = answer_text(parsed)?;
        parse_records(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_gemini_provider_creation() {
        let provider = GeminiProvider::new("http://localhost:8080/", "gemini-test").unwrap();
        assert_eq!(provider.model(), "gemini-test");
        assert_eq!(
            provider.request_url(),
            "http://localhost:8080/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn test_gemini_provider_default_endpoint() {
        let provider = GeminiProvider::default_endpoint(DEFAULT_MODEL).unwrap();
        assert!(provider.request_url().starts_with(DEFAULT_ENDPOINT));
    }

    #[test]
    fn test_request_body_shape() {
        let provider = GeminiProvider::default_endpoint(DEFAULT_MODEL)
            .unwrap()
            .with_system_prompt("system");

        let body = serde_json::to_value(provider.build_request("extract", b"abc")).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "system");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "extract");
        assert_eq!(
            body["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "application/pdf"
        );
        assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["data"], "YWJj");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_request_without_system_prompt() {
        let provider = GeminiProvider::default_endpoint(DEFAULT_MODEL).unwrap();
        let body = serde_json::to_value(provider.build_request("extract", b"")).unwrap();
        assert_eq!(body.get("systemInstruction"), None);
    }

    fn response(value: Value) -> GenerateResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_answer_text_joins_parts() {
        let text = answer_text(response(json!({
            "candidates": [{
                "content": {"parts": [{"text": "[{\"a\":"}, {"text": " 1}]"}]},
                "finishReason": "STOP"
            }]
        })))
        .unwrap();
        assert_eq!(text, "[{\"a\": 1}]");
    }

    #[test]
    fn test_answer_without_candidates_is_missing_content() {
        let err = answer_text(response(json!({}))).unwrap_err();
        assert!(err.to_string().contains("Content field missing"));
    }

    #[test]
    fn test_answer_without_content_keeps_finish_reason() {
        let err = answer_text(response(json!({
            "candidates": [{"finishReason": "MAX_TOKENS"}]
        })))
        .unwrap_err();

        match err {
            LlmError::MissingContent { finish_reason } => {
                assert_eq!(finish_reason.as_deref(), Some("MAX_TOKENS"));
            }
            other => panic!("Expected MissingContent, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_gemini_error_handling() {
        // Use invalid endpoint to trigger error
        let provider = GeminiProvider::new("http://localhost:99999", "gemini-test").unwrap();

        let result = provider
            .extract("test", b"%PDF", &Credential::new("key"))
            .await;

        match result {
            Err(LlmError::Communication(_)) => {} // Expected
            other => panic!("Expected Communication error, got {:?}", other),
        }
    }
}

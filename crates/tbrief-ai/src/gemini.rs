//! Gemini API client.
//!
//! Completions run against an ordered list of models. Quota failures
//! fall through to the next model; any other failure aborts the whole
//! attempt, since retrying a malformed request elsewhere cannot help.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AiError, AiResult};

/// Models tried in order when the caller has no preference.
pub const DEFAULT_MODELS: [&str; 4] = [
    "gemini-2.5-flash",
    "gemini-2.0-flash-lite",
    "gemini-flash-latest",
    "gemini-1.5-flash",
];

/// Model priority list: the preferred model first, then the defaults,
/// deduplicated.
pub fn model_priority(preferred: Option<&str>) -> Vec<String> {
    let mut models: Vec<String> = Vec::new();
    if let Some(preferred) = preferred {
        if !preferred.is_empty() {
            models.push(preferred.to_string());
        }
    }
    for model in DEFAULT_MODELS {
        if !models.iter().any(|m| m == model) {
            models.push(model.to_string());
        }
    }
    models
}

/// Completion seam used by the summary pipeline.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Text completion for a prompt.
    async fn complete(&self, prompt: &str, models: &[String]) -> AiResult<String>;

    /// Completion over an audio file plus an instruction prompt.
    async fn complete_with_audio(
        &self,
        audio_path: &Path,
        prompt: &str,
        models: &[String],
    ) -> AiResult<String>;
}

// =============================================================================
// Configuration
// =============================================================================

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> AiResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| AiError::config_error("GEMINI_API_KEY not set"))?;
        if api_key.is_empty() {
            return Err(AiError::config_error("GEMINI_API_KEY cannot be empty"));
        }

        Ok(Self {
            api_key,
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout: Duration::from_secs(120),
        })
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn audio(data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: "audio/mp3".to_string(),
                data,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

// =============================================================================
// Client
// =============================================================================

/// Gemini API client.
pub struct GeminiClient {
    api_key: String,
    api_base: String,
    client: Client,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(config: GeminiConfig) -> AiResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("tbrief-ai/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(AiError::Network)?;

        Ok(Self {
            api_key: config.api_key,
            api_base: config.api_base,
            client,
        })
    }

    async fn generate(&self, request: &GeminiRequest, models: &[String]) -> AiResult<String> {
        let mut last_error = None;

        for model in models {
            info!("Attempting Gemini API with model: {}", model);
            match self.call_model(model, request).await {
                Ok(text) => {
                    info!("Got completion from {}", model);
                    return Ok(text);
                }
                Err(e) if e.is_quota_exceeded() => {
                    warn!("Model {} quota exhausted, trying next: {}", model, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        match last_error {
            Some(e) => Err(AiError::QuotaExceeded(format!(
                "all {} configured models exhausted, last error: {}",
                models.len(),
                e
            ))),
            None => Err(AiError::generation_failed("no Gemini models configured")),
        }
    }

    async fn call_model(&self, model: &str, request: &GeminiRequest) -> AiResult<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base, model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AiError::generation_failed(format!("Gemini API request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            if status == StatusCode::TOO_MANY_REQUESTS
                || error_text.contains("RESOURCE_EXHAUSTED")
                || error_text.contains("quotaExceeded")
            {
                return Err(AiError::QuotaExceeded(format!(
                    "Gemini API returned {status}"
                )));
            }
            return Err(AiError::generation_failed(format!(
                "Gemini API returned {status}: {error_text}"
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponse(format!("Failed to parse Gemini response: {e}")))?;

        let text = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| AiError::InvalidResponse("No content in Gemini response".to_string()))?;

        Ok(strip_markdown_fences(text).to_string())
    }
}

#[async_trait]
impl AiProvider for GeminiClient {
    async fn complete(&self, prompt: &str, models: &[String]) -> AiResult<String> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompt)],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "text/plain".to_string(),
            },
        };
        self.generate(&request, models).await
    }

    async fn complete_with_audio(
        &self,
        audio_path: &Path,
        prompt: &str,
        models: &[String],
    ) -> AiResult<String> {
        let bytes = tokio::fs::read(audio_path).await?;
        let encoded = BASE64.encode(bytes);

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part::audio(encoded), Part::text(prompt)],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "text/plain".to_string(),
            },
        };
        self.generate(&request, models).await
    }
}

/// Strip a markdown code fence if the model wrapped its output in one.
fn strip_markdown_fences(text: &str) -> &str {
    let text = text.trim();
    let text = if let Some(rest) = text.strip_prefix("```json") {
        rest
    } else if let Some(rest) = text.strip_prefix("```") {
        rest
    } else {
        text
    };
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new(GeminiConfig {
            api_key: "test-key".to_string(),
            api_base: server.uri(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn completion(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [
                { "content": { "parts": [{ "text": text }] } }
            ]
        })
    }

    fn models(names: &[&str]) -> Vec<String> {
        names.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_model_priority_prepends_and_dedupes() {
        let priority = model_priority(Some("gemini-2.0-flash-lite"));
        assert_eq!(priority[0], "gemini-2.0-flash-lite");
        assert_eq!(priority.len(), DEFAULT_MODELS.len());

        let priority = model_priority(Some("custom-model"));
        assert_eq!(priority[0], "custom-model");
        assert_eq!(priority.len(), DEFAULT_MODELS.len() + 1);

        assert_eq!(model_priority(None).len(), DEFAULT_MODELS.len());
    }

    #[test]
    fn test_strip_markdown_fences() {
        assert_eq!(strip_markdown_fences("plain text"), "plain text");
        assert_eq!(strip_markdown_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_markdown_fences("```\nsummary\n```"), "summary");
    }

    #[tokio::test]
    async fn test_complete_uses_first_working_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-a:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("the summary")))
            .mount(&server)
            .await;

        let result = client(&server)
            .complete("prompt", &models(&["gemini-a", "gemini-b"]))
            .await
            .unwrap();
        assert_eq!(result, "the summary");
    }

    #[tokio::test]
    async fn test_quota_error_falls_through_to_next_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-a:generateContent"))
            .respond_with(
                ResponseTemplate::new(429).set_body_string(r#"{"error": {"status": "RESOURCE_EXHAUSTED"}}"#),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-b:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("from backup")))
            .mount(&server)
            .await;

        let result = client(&server)
            .complete("prompt", &models(&["gemini-a", "gemini-b"]))
            .await
            .unwrap();
        assert_eq!(result, "from backup");
    }

    #[tokio::test]
    async fn test_non_quota_error_fails_immediately() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-a:generateContent"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-b:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("unused")))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server)
            .complete("prompt", &models(&["gemini-a", "gemini-b"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::GenerationFailed(_)));
    }

    #[tokio::test]
    async fn test_all_models_exhausted_aggregates_quota_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quotaExceeded"))
            .mount(&server)
            .await;

        let err = client(&server)
            .complete("prompt", &models(&["gemini-a", "gemini-b"]))
            .await
            .unwrap_err();
        assert!(err.is_quota_exceeded());
        assert!(err.to_string().contains("all 2"));
    }

    #[tokio::test]
    async fn test_complete_with_audio_inlines_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-a:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("audio summary")))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let audio_path = dir.path().join("clip.mp3");
        std::fs::write(&audio_path, b"fake-mp3-bytes").unwrap();

        let result = client(&server)
            .complete_with_audio(&audio_path, "prompt", &models(&["gemini-a"]))
            .await
            .unwrap();
        assert_eq!(result, "audio summary");

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("inlineData"));
        assert!(body.contains("audio/mp3"));
        assert!(body.contains(&BASE64.encode(b"fake-mp3-bytes")));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .complete("prompt", &models(&["gemini-a"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::InvalidResponse(_)));
    }
}

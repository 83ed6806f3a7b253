use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::ProviderError;
use crate::models::Provider;
use crate::providers::{error_from_reqwest, error_from_status, require_key, ModelBackend};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Text parts of the first candidate, concatenated.
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// generateContent style backend (contents + generationConfig payload,
/// API key header).
pub struct GeminiBackend {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f64,
    max_tokens: u32,
    timeout: Duration,
}

impl GeminiBackend {
    pub fn new(cfg: &Config) -> Result<Self> {
        let backend = cfg.backend(Provider::Gemini);
        let timeout = cfg.request_timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Gemini HTTP client")?;

        Ok(Self {
            client,
            api_key: backend.api_key.clone(),
            model: backend.model.clone(),
            base_url: backend.base_url.trim_end_matches('/').to_string(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            timeout,
        })
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        require_key(Provider::Gemini, &self.api_key, "GEMINI_API_KEY")?;

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| error_from_reqwest(Provider::Gemini, e, self.timeout))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(error_from_status(Provider::Gemini, status, &text));
        }

        let data: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| error_from_reqwest(Provider::Gemini, e, self.timeout))?;

        data.text().ok_or_else(|| ProviderError::Transport {
            provider: Provider::Gemini,
            message: "response contained no candidate text".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::default_test_config;

    #[test]
    fn request_payload_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: "hi" }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 1024,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1024);
    }

    #[test]
    fn response_text_joins_parts() {
        let raw = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"MARKET ANALYSIS:\n"},{"text":"ranging"}]},"finishReason":"STOP"}]}"#;
        let data: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(data.text().as_deref(), Some("MARKET ANALYSIS:\nranging"));
    }

    #[test]
    fn blocked_response_has_no_text() {
        let raw = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let data: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(data.text(), None);
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let mut cfg = default_test_config();
        cfg.gemini.api_key = " ".to_string();
        let backend = GeminiBackend::new(&cfg).unwrap();
        let err = backend.complete("prompt").await.unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}

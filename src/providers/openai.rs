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
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions style backend (model + messages payload, bearer auth).
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f64,
    max_tokens: u32,
    timeout: Duration,
}

impl OpenAiBackend {
    pub fn new(cfg: &Config) -> Result<Self> {
        let backend = cfg.backend(Provider::OpenAi);
        let timeout = cfg.request_timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build OpenAI HTTP client")?;

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
impl ModelBackend for OpenAiBackend {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        require_key(Provider::OpenAi, &self.api_key, "OPENAI_API_KEY")?;

        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!("POST {}/chat/completions model={}", self.base_url, self.model);

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| error_from_reqwest(Provider::OpenAi, e, self.timeout))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(error_from_status(Provider::OpenAi, status, &text));
        }

        let data: ChatResponse = resp
            .json()
            .await
            .map_err(|e| error_from_reqwest(Provider::OpenAi, e, self.timeout))?;

        data.choices
            .into_iter()
            .find_map(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ProviderError::Transport {
                provider: Provider::OpenAi,
                message: "response contained no message content".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::default_test_config;

    #[test]
    fn request_payload_shape() {
        let body = ChatRequest {
            model: "gpt-test",
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
            temperature: 0.2,
            max_tokens: 64,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-test");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
        assert_eq!(json["max_tokens"], 64);
    }

    #[test]
    fn response_parsing() {
        let raw = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"SIGNAL SUMMARY:\nType: HOLD"}}]}"#;
        let data: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            data.choices[0].message.content.as_deref(),
            Some("SIGNAL SUMMARY:\nType: HOLD")
        );
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let mut cfg = default_test_config();
        cfg.openai.api_key = String::new();
        let backend = OpenAiBackend::new(&cfg).unwrap();
        let err = backend.complete("prompt").await.unwrap_err();
        assert!(matches!(err, ProviderError::Configuration { provider: Provider::OpenAi, .. }));
    }
}

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use crate::config::Config;

const BASE_URL: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Posts formatted messages to a bot chat.
pub struct TelegramNotifier {
    client: Client,
    bot_token: String,
    chat_id: String,
    base_url: String,
}

impl TelegramNotifier {
    /// `None` when no bot token or chat id is configured.
    pub fn from_config(cfg: &Config) -> Result<Option<Self>> {
        if !cfg.telegram_enabled() {
            return Ok(None);
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to build Telegram HTTP client")?;

        Ok(Some(Self {
            client,
            bot_token: cfg.telegram_bot_token.clone(),
            chat_id: cfg.telegram_chat_id.clone(),
            base_url: BASE_URL.to_string(),
        }))
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.bot_token)
    }

    pub async fn send(&self, text: &str) -> Result<()> {
        let resp = self
            .client
            .post(self.endpoint())
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text,
                disable_web_page_preview: true,
            })
            .send()
            .await
            .context("Failed to reach Telegram")?;

        let status = resp.status();
        let body: TelegramResponse = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse Telegram response ({})", status))?;

        if !body.ok {
            anyhow::bail!(
                "Telegram sendMessage error {}: {}",
                status,
                body.description.unwrap_or_default()
            );
        }

        info!("Delivered {} chars to Telegram chat {}", text.chars().count(), self.chat_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::default_test_config;

    #[test]
    fn disabled_without_credentials() {
        let cfg = default_test_config();
        assert!(TelegramNotifier::from_config(&cfg).unwrap().is_none());
    }

    #[test]
    fn endpoint_embeds_token() {
        let mut cfg = default_test_config();
        cfg.telegram_bot_token = "123:abc".into();
        cfg.telegram_chat_id = "42".into();
        let notifier = TelegramNotifier::from_config(&cfg).unwrap().unwrap();
        assert_eq!(
            notifier.endpoint(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn error_response_parses() {
        let raw = r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#;
        let body: TelegramResponse = serde_json::from_str(raw).unwrap();
        assert!(!body.ok);
        assert_eq!(body.description.as_deref(), Some("Bad Request: chat not found"));
    }
}

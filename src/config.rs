use chrono_tz::Tz;
use std::time::Duration;

use crate::models::Provider;

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Model backends
    pub openai: BackendConfig,
    pub gemini: BackendConfig,
    pub default_provider: Provider,

    // Generation
    pub request_timeout_secs: u64,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Candles per timeframe kept in the prompt
    pub candle_limit: usize,

    // Delivery
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    pub message_timezone: Tz,

    // History
    pub history_file: String,
    pub user_id: String,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        Config {
            openai: BackendConfig {
                api_key: env("OPENAI_API_KEY", ""),
                model: env("OPENAI_MODEL", "gpt-4o-mini"),
                base_url: env("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            },
            gemini: BackendConfig {
                api_key: env("GEMINI_API_KEY", ""),
                model: env("GEMINI_MODEL", "gemini-1.5-flash"),
                base_url: env(
                    "GEMINI_BASE_URL",
                    "https://generativelanguage.googleapis.com/v1beta",
                ),
            },
            default_provider: Provider::from_str_loose(&env("DEFAULT_PROVIDER", "openai"))
                .unwrap_or(Provider::OpenAi),
            request_timeout_secs: env("LLM_TIMEOUT_SECS", "30").parse().unwrap_or(30),
            temperature: env("LLM_TEMPERATURE", "0.7").parse().unwrap_or(0.7),
            max_tokens: env("LLM_MAX_TOKENS", "4096").parse().unwrap_or(4096),
            candle_limit: env("CANDLE_LIMIT", "100").parse().unwrap_or(100),
            telegram_bot_token: env("TELEGRAM_BOT_TOKEN", ""),
            telegram_chat_id: env("TELEGRAM_CHAT_ID", ""),
            message_timezone: env("MESSAGE_TIMEZONE", "UTC").parse().unwrap_or(Tz::UTC),
            history_file: env("HISTORY_FILE", "logs/recommendations.json"),
            user_id: env("USER_ID", "local"),
            log_level: env("LOG_LEVEL", "info"),
        }
    }

    pub fn backend(&self, provider: Provider) -> &BackendConfig {
        match provider {
            Provider::OpenAi => &self.openai,
            Provider::Gemini => &self.gemini,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn telegram_enabled(&self) -> bool {
        !self.telegram_bot_token.is_empty() && !self.telegram_chat_id.is_empty()
    }
}

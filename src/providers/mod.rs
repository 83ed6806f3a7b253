pub mod abort;
pub mod gateway;
pub mod gemini;
pub mod openai;

pub use abort::{abort_pair, AbortHandle, AbortSignal};
pub use gateway::{transition, GatewayState, ProviderGateway};
pub use gemini::GeminiBackend;
pub use openai::OpenAiBackend;

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

use crate::error::ProviderError;
use crate::models::Provider;

/// One LLM REST endpoint. Implementations hold no per-request state.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    fn provider(&self) -> Provider;
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Maps a non-success HTTP response onto the error taxonomy.
pub(crate) fn error_from_status(provider: Provider, status: StatusCode, body: &str) -> ProviderError {
    let message = api_error_message(body);
    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited { provider, message },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::Configuration { provider, message }
        }
        _ => ProviderError::Api {
            provider,
            status: status.as_u16(),
            message,
        },
    }
}

/// Both backends wrap errors as `{"error": {"message": ...}}`. Falls back to
/// the raw body when it is not shaped that way.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

pub(crate) fn error_from_reqwest(
    provider: Provider,
    err: reqwest::Error,
    timeout: Duration,
) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout {
            provider,
            secs: timeout.as_secs(),
        }
    } else {
        ProviderError::Transport {
            provider,
            message: err.to_string(),
        }
    }
}

pub(crate) fn require_key(provider: Provider, key: &str, var: &str) -> Result<(), ProviderError> {
    if key.trim().is_empty() {
        return Err(ProviderError::Configuration {
            provider,
            message: format!("{} is not set", var),
        });
    }
    Ok(())
}

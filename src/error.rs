use thiserror::Error;

use crate::models::Provider;

/// Failures from a model backend call. Extraction and classification never
/// produce errors; only the network side does.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Missing or rejected credentials, or a request the backend refuses as
    /// malformed. Never retried.
    #[error("{provider} configuration error: {message}")]
    Configuration { provider: Provider, message: String },

    #[error("{provider} rate limited: {message}")]
    RateLimited { provider: Provider, message: String },

    /// Non-success HTTP status not covered by the variants above.
    #[error("{provider} API error {status}: {message}")]
    Api {
        provider: Provider,
        status: u16,
        message: String,
    },

    #[error("{provider} transport error: {message}")]
    Transport { provider: Provider, message: String },

    #[error("{provider} request timed out after {secs}s")]
    Timeout { provider: Provider, secs: u64 },

    #[error("request cancelled by caller")]
    Cancelled,
}

const QUOTA_MARKERS: &[&str] = &["429", "quota", "rate limit", "rate-limit", "ratelimit"];

fn mentions_quota(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    QUOTA_MARKERS.iter().any(|m| lower.contains(m))
}

impl ProviderError {
    pub fn provider(&self) -> Option<Provider> {
        match self {
            ProviderError::Configuration { provider, .. }
            | ProviderError::RateLimited { provider, .. }
            | ProviderError::Api { provider, .. }
            | ProviderError::Transport { provider, .. }
            | ProviderError::Timeout { provider, .. } => Some(*provider),
            ProviderError::Cancelled => None,
        }
    }

    /// The only condition under which the gateway switches backends.
    pub fn is_quota_signature(&self) -> bool {
        match self {
            ProviderError::RateLimited { .. } => true,
            ProviderError::Api { status, message, .. } => *status == 429 || mentions_quota(message),
            ProviderError::Transport { message, .. } => mentions_quota(message),
            ProviderError::Configuration { .. }
            | ProviderError::Timeout { .. }
            | ProviderError::Cancelled => false,
        }
    }

    /// Short message suitable for showing to the person who asked for the
    /// analysis.
    pub fn user_message(&self) -> String {
        match self {
            ProviderError::Configuration { provider, .. } => format!(
                "The {} provider is not configured correctly. Check its API key and try again.",
                provider
            ),
            ProviderError::RateLimited { .. } => {
                "All analysis providers are over quota right now. Try again in a few minutes."
                    .to_string()
            }
            ProviderError::Api { .. }
            | ProviderError::Transport { .. }
            | ProviderError::Timeout { .. } => {
                "Analysis provider unavailable, try again.".to_string()
            }
            ProviderError::Cancelled => "Analysis cancelled.".to_string(),
        }
    }
}

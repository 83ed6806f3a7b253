use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::MarketDataset;

/// The two interchangeable model backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Gemini,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
        }
    }

    /// The backend tried when this one reports a quota error.
    pub fn other(self) -> Provider {
        match self {
            Provider::OpenAi => Provider::Gemini,
            Provider::Gemini => Provider::OpenAi,
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Provider> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "gpt" | "chatgpt" => Some(Provider::OpenAi),
            "gemini" | "google" => Some(Provider::Gemini),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub symbol: String,
    pub market_data: MarketDataset,
    pub school_prompt: String,
    pub provider: Provider,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResult {
    pub analysis_text: String,
    pub provider_used: Provider,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_swaps_backends() {
        assert_eq!(Provider::OpenAi.other(), Provider::Gemini);
        assert_eq!(Provider::Gemini.other(), Provider::OpenAi);
    }

    #[test]
    fn loose_parsing() {
        assert_eq!(Provider::from_str_loose("Gemini"), Some(Provider::Gemini));
        assert_eq!(Provider::from_str_loose(" openai "), Some(Provider::OpenAi));
        assert_eq!(Provider::from_str_loose("claude"), None);
    }
}

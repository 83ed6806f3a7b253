pub mod json_file;

pub use json_file::JsonFileStore;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Provider, TradingSignal};

/// A generated analysis as kept in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(default)]
    pub id: u64,
    pub symbol: String,
    pub methodology: String,
    pub provider_used: Provider,
    pub signal: TradingSignal,
    pub analysis: String,
    pub created_at: DateTime<Utc>,
}

/// History of recommendations per user.
pub trait RecommendationStore: Send + Sync {
    /// Stores `rec` and returns the id assigned to it.
    fn save(&mut self, user_id: &str, rec: Recommendation) -> Result<u64>;
    /// Most recent first, at most `limit` entries.
    fn list(&self, user_id: &str, limit: usize) -> Result<Vec<Recommendation>>;
}

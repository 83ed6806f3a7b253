use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::storage::{Recommendation, RecommendationStore};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreState {
    #[serde(default)]
    counter: u64,
    #[serde(default)]
    users: HashMap<String, Vec<Recommendation>>,
}

/// Keeps the whole history in one pretty-printed JSON file, rewritten on
/// every save.
pub struct JsonFileStore {
    path: PathBuf,
    state: StoreState,
}

impl JsonFileStore {
    /// Opens `path`, starting empty when it is missing or unreadable.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let state = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring unreadable history file {}: {}", path.display(), e);
                StoreState::default()
            }),
            Err(_) => StoreState::default(),
        };
        Self { path, state }
    }

    fn persist(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.state)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

impl RecommendationStore for JsonFileStore {
    fn save(&mut self, user_id: &str, mut rec: Recommendation) -> Result<u64> {
        self.state.counter += 1;
        rec.id = self.state.counter;
        self.state
            .users
            .entry(user_id.to_string())
            .or_default()
            .push(rec);
        self.persist()?;
        Ok(self.state.counter)
    }

    fn list(&self, user_id: &str, limit: usize) -> Result<Vec<Recommendation>> {
        Ok(self
            .state
            .users
            .get(user_id)
            .map(|recs| recs.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

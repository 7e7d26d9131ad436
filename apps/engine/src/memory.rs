//! Persistent memory across runs: free-text knowledge entries and per-session
//! outcome records, each stored as a JSON array on disk. Both files are
//! append-only — the engine reads a snapshot at run start and appends after
//! the run; it never edits or deletes past records.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::models::profile::MemoryEntry;

/// What a finished session left behind, for the next run's context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub session_id: Uuid,
    pub date: DateTime<Utc>,
    pub topic: String,
    pub description: String,
    pub notes: String,
}

#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Read-only snapshot of all knowledge entries, oldest first.
    async fn snapshot(&self) -> anyhow::Result<Vec<MemoryEntry>>;
    async fn append_entry(&self, entry: MemoryEntry) -> anyhow::Result<()>;
    async fn append_outcome(&self, outcome: OutcomeRecord) -> anyhow::Result<()>;
}

/// File-backed store: `entries.json` and `outcomes.json` under the data
/// directory. Missing files read as empty, so a fresh install needs no setup.
pub struct JsonMemoryStore {
    entries_path: PathBuf,
    outcomes_path: PathBuf,
}

impl JsonMemoryStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let dir = data_dir.into();
        Self {
            entries_path: dir.join("entries.json"),
            outcomes_path: dir.join("outcomes.json"),
        }
    }

    async fn read_array<T: DeserializeOwned>(path: &PathBuf) -> anyhow::Result<Vec<T>> {
        match tokio::fs::read_to_string(path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn append<T: Serialize + DeserializeOwned>(
        path: &PathBuf,
        item: T,
    ) -> anyhow::Result<()> {
        let mut items: Vec<T> = Self::read_array(path).await?;
        items.push(item);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(&items)?;
        tokio::fs::write(path, raw).await?;
        debug!(path = %path.display(), count = items.len(), "memory file updated");
        Ok(())
    }
}

#[async_trait]
impl MemoryStore for JsonMemoryStore {
    async fn snapshot(&self) -> anyhow::Result<Vec<MemoryEntry>> {
        Self::read_array(&self.entries_path).await
    }

    async fn append_entry(&self, entry: MemoryEntry) -> anyhow::Result<()> {
        Self::append(&self.entries_path, entry).await
    }

    async fn append_outcome(&self, outcome: OutcomeRecord) -> anyhow::Result<()> {
        Self::append(&self.outcomes_path, outcome).await
    }
}

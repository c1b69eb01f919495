//! File-based store: one JSON document for the whole dataset.
//!
//! The file holds a single mapping from `user_id` to the user's record
//! (`{profile fields..., "chat_history": [...]}`). The dataset is loaded
//! whole at construction and re-encoded whole on every mutation. This
//! backend is simple, portable, and human-inspectable.
//!
//! A corrupt or missing file is treated as an empty dataset (logged, not
//! raised), so the chat path stays available after a bad shutdown.
//! Write failures DO propagate: losing history silently is worse than
//! failing the request.
//!
//! Every mutation runs load-merge-flush under one write guard, so a
//! concurrent append for the same user can never be clobbered by another
//! request's write-back.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use mindmate_core::error::StoreError;
use mindmate_core::history::{Turn, WRITE_WINDOW};
use mindmate_core::profile::{ProfileUpdate, UserRecord};
use mindmate_core::store::ProfileStore;

type Dataset = HashMap<String, UserRecord>;

/// A file-backed profile store using a single JSON document.
pub struct JsonFileStore {
    path: PathBuf,
    records: Arc<RwLock<Dataset>>,
}

impl JsonFileStore {
    /// Create a new file-based store at the given path.
    ///
    /// If the file exists and decodes, records are loaded from it.
    /// If it is missing or malformed, starts empty (file created on
    /// first write).
    pub fn new(path: PathBuf) -> Self {
        let records = Self::load_from_disk(&path);
        debug!(path = %path.display(), users = records.len(), "JSON file store loaded");
        Self {
            path,
            records: Arc::new(RwLock::new(records)),
        }
    }

    fn load_from_disk(path: &PathBuf) -> Dataset {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            // File doesn't exist yet: start empty
            Err(_) => return Dataset::new(),
        };

        match serde_json::from_str(&content) {
            Ok(records) => records,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Memory file is empty or malformed, starting with empty memory");
                Dataset::new()
            }
        }
    }

    /// Flush the dataset to disk. Called with the write guard still held
    /// so that merge and persist are one atomic step.
    fn flush_locked(&self, records: &Dataset) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Write {
                path: self.path.display().to_string(),
                reason: format!("Failed to create store directory: {e}"),
            })?;
        }

        let content = serde_json::to_string_pretty(records)
            .map_err(|e| StoreError::Encode(e.to_string()))?;

        std::fs::write(&self.path, &content).map_err(|e| StoreError::Write {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(())
    }
}

#[async_trait]
impl ProfileStore for JsonFileStore {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn get(&self, user_id: &str) -> Result<UserRecord, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(user_id).cloned().unwrap_or_default())
    }

    async fn update(&self, user_id: &str, update: ProfileUpdate) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.entry(user_id.to_string()).or_default().apply(update);
        self.flush_locked(&records)
    }

    async fn append_history(&self, user_id: &str, turns: Vec<Turn>) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let history = &mut records.entry(user_id.to_string()).or_default().chat_history;
        history.extend(turns);
        if history.len() > WRITE_WINDOW {
            let excess = history.len() - WRITE_WINDOW;
            history.drain(..excess);
        }
        self.flush_locked(&records)
    }
}

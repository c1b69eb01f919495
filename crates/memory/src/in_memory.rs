//! In-memory store, for tests and for running without persistence.
//!
//! Same merge and windowing semantics as the file-backed store, minus
//! the disk. Data dies with the process.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use mindmate_core::error::StoreError;
use mindmate_core::history::{Turn, WRITE_WINDOW};
use mindmate_core::profile::{ProfileUpdate, UserRecord};
use mindmate_core::store::ProfileStore;

/// A volatile profile store.
#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn get(&self, user_id: &str) -> Result<UserRecord, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(user_id).cloned().unwrap_or_default())
    }

    async fn update(&self, user_id: &str, update: ProfileUpdate) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.entry(user_id.to_string()).or_default().apply(update);
        Ok(())
    }

    async fn append_history(&self, user_id: &str, turns: Vec<Turn>) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let history = &mut records.entry(user_id.to_string()).or_default().chat_history;
        history.extend(turns);
        if history.len() > WRITE_WINDOW {
            let excess = history.len() - WRITE_WINDOW;
            history.drain(..excess);
        }
        Ok(())
    }
}

//! ProfileStore trait: keyed persistence of per-user records.
//!
//! The store owns every merge. Callers never hold a record across a
//! write; they hand the store a partial update or a finished exchange and
//! the store applies it atomically. This is what closes the classic
//! lost-update hazard of load-mutate-save cycles: two concurrent requests
//! for the same user each append their own turns, and both survive.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::history::Turn;
use crate::profile::{ProfileUpdate, UserRecord};

/// Keyed persistence for profile fields and conversation history.
///
/// Implementations: JSON file (production), in-memory (tests, ephemeral
/// deployments).
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// The backend name (e.g., "json-file", "in-memory").
    fn name(&self) -> &str;

    /// Fetch the full record for a user. An unknown id is not an error;
    /// it yields an empty record.
    async fn get(&self, user_id: &str) -> std::result::Result<UserRecord, StoreError>;

    /// Merge profile fields into the user's record, creating it if
    /// absent. Fields unset in `update` are left unchanged.
    async fn update(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> std::result::Result<(), StoreError>;

    /// Append a completed exchange (the user turn and the bot turn
    /// together) to the user's history, then truncate to the write
    /// window. The append and truncation are atomic with respect to
    /// other calls on the same store: no partial exchange is ever
    /// visible, and concurrent appends cannot clobber each other.
    async fn append_history(
        &self,
        user_id: &str,
        turns: Vec<Turn>,
    ) -> std::result::Result<(), StoreError>;
}

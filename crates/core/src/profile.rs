//! Per-user profile and record types.
//!
//! A [`UserRecord`] is everything the store keeps for one `user_id`:
//! four independently-nullable profile fields plus the chat history.
//! Records are created implicitly on first update and are never replaced
//! wholesale; all writes merge field-by-field.

use serde::{Deserialize, Serialize};

use crate::history::Turn;

/// The profile fields remembered for a user. All fields are free-form
/// text and independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_mood: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub career_goals: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_session_summary: Option<String>,
}

/// The full persisted record for one user: profile fields plus the
/// bounded chat history.
///
/// Serializes flat, so the stored JSON matches
/// `{"name": ..., "recent_mood": ..., "chat_history": [...]}` with
/// absent fields omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(flatten)]
    pub profile: UserProfile,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chat_history: Vec<Turn>,
}

/// A partial profile update. Fields left `None` are not touched by the
/// merge; fields set overwrite the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_mood: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub career_goals: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_session_summary: Option<String>,
}

impl ProfileUpdate {
    /// Whether any field is set. Empty updates are rejected at the API
    /// boundary before they reach a store.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.recent_mood.is_none()
            && self.career_goals.is_none()
            && self.last_session_summary.is_none()
    }
}

impl UserRecord {
    /// Merge a partial update into this record. Set fields overwrite,
    /// unset fields are left untouched; the chat history is never
    /// affected by a profile merge.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.profile.name = Some(name);
        }
        if let Some(mood) = update.recent_mood {
            self.profile.recent_mood = Some(mood);
        }
        if let Some(goals) = update.career_goals {
            self.profile.career_goals = Some(goals);
        }
        if let Some(summary) = update.last_session_summary {
            self.profile.last_session_summary = Some(summary);
        }
    }
}

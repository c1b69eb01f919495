//! Conversation history domain types.
//!
//! A conversation is persisted as an ordered list of [`Turn`]s per user.
//! Two window sizes govern it: only the most recent [`WRITE_WINDOW`] turns
//! are ever persisted (oldest discarded first), and only the most recent
//! [`READ_WINDOW`] turns are fed back into a new prompt.

use serde::{Deserialize, Serialize};

/// Number of most-recent turns included when composing a new prompt.
pub const READ_WINDOW: usize = 10;

/// Number of most-recent turns retained in persisted storage.
pub const WRITE_WINDOW: usize = 20;

/// The speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant
    Bot,
}

impl Role {
    /// The capitalized label used when rendering a turn into a prompt
    /// (`"User"` / `"Bot"`).
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Bot => "Bot",
        }
    }
}

/// One message in a conversation, tagged with its speaker.
///
/// Serializes as `{"role": "user", "message": "..."}`, the shape the
/// store persists and the prompt composer consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who sent this message
    pub role: Role,

    /// The text content
    pub message: String,
}

impl Turn {
    /// Create a user turn.
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            message: message.into(),
        }
    }

    /// Create a bot turn.
    pub fn bot(message: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            message: message.into(),
        }
    }
}

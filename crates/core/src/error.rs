//! Error types for the MindMate domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the failure taxonomy
//! follows how each class of fault is handled:
//! - corrupt persisted state is recovered inside the store, never raised;
//! - store *write* failures propagate (silent history loss is unacceptable);
//! - inference transport failures are typed, and the orchestrator decides
//!   how to render them to the user.

use thiserror::Error;

/// The top-level error type for all MindMate operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Inference errors ---
    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures from the profile/history store.
///
/// Note what is *not* here: a corrupt or missing data file. The store
/// contract treats those as an empty dataset so the chat path stays
/// available; only failures to persist are surfaced.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to write store at {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("Failed to encode store contents: {0}")]
    Encode(String),
}

/// Failures from the inference collaborator, classified by transport
/// outcome so callers can choose a user-facing rendering per category.
#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Could not reach inference backend at {host}")]
    Unreachable { host: String },

    #[error("Inference backend returned an error: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Inference backend returned an unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(String),
}

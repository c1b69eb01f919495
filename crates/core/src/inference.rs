//! CompletionClient trait: the abstraction over the inference backend.
//!
//! A CompletionClient knows how to send one fully-composed prompt string
//! to a language model and return the generated text. That is the entire
//! contract; prompt assembly and output refinement live in the engine.
//!
//! Implementations: Ollama (HTTP), scripted stubs for tests.

use async_trait::async_trait;

use crate::error::InferenceError;

/// The inference collaborator contract.
///
/// Failures are *typed* ([`InferenceError`]), never pre-rendered as chat
/// text. The orchestration layer decides how a timeout or an unreachable
/// backend reads to the user; this keeps failure classification testable
/// independent of formatting.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// A human-readable name for this backend (e.g., "ollama").
    fn name(&self) -> &str;

    /// Send a prompt and get the generated text back.
    async fn complete(&self, prompt: &str) -> std::result::Result<String, InferenceError>;

    /// Health check: can we reach the backend?
    async fn health_check(&self) -> std::result::Result<bool, InferenceError> {
        Ok(true)
    }
}

//! Inference backend implementations for MindMate.
//!
//! One production backend: [`OllamaClient`], an HTTP client for a locally
//! hosted Ollama server. Anything implementing
//! `mindmate_core::CompletionClient` can stand in for it.

pub mod ollama;

pub use ollama::OllamaClient;

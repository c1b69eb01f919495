//! Ollama inference client.
//!
//! Talks to a locally hosted Ollama server over its native generate API:
//! `POST {host}/api/generate` with `{model, prompt, stream: false}`, one
//! complete response per call. Streaming is intentionally not used; the
//! engine wants the whole reply before refining it.
//!
//! Transport failures come back as typed [`InferenceError`] variants.
//! This client never invents reply text for the user; that rendering
//! decision belongs to the orchestrator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use mindmate_config::InferenceConfig;
use mindmate_core::error::InferenceError;
use mindmate_core::inference::CompletionClient;

/// HTTP client for a local Ollama generation endpoint.
pub struct OllamaClient {
    base_url: String,
    model: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a client from the inference section of the app config.
    ///
    /// The request timeout is baked into the underlying HTTP client here,
    /// once, at construction.
    pub fn new(config: &InferenceConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: config.host.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
            client,
        }
    }

    /// Classify a transport-level reqwest failure into our error taxonomy.
    fn classify(&self, e: reqwest::Error) -> InferenceError {
        if e.is_timeout() {
            InferenceError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else if e.is_connect() {
            InferenceError::Unreachable {
                host: self.base_url.clone(),
            }
        } else {
            InferenceError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, prompt: &str) -> Result<String, InferenceError> {
        let url = format!("{}/api/generate", self.base_url);

        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Sending generate request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Ollama returned error");
            return Err(InferenceError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let text = generated
            .response
            .ok_or_else(|| InferenceError::InvalidResponse("No response field in body".into()))?;

        debug!(reply_len = text.len(), "Generate request complete");
        Ok(text)
    }

    async fn health_check(&self) -> Result<bool, InferenceError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        Ok(response.status().is_success())
    }
}

// --- Ollama API types (internal) ---

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

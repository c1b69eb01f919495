//! Chat orchestration.
//!
//! One linear flow per incoming message: load the user's record, compose
//! the prompt, call inference, refine the output, persist the finished
//! exchange, return the reply. No loops, no retries.
//!
//! Failure policy (fail-soft): an inference failure is rendered as a
//! category-specific apology string and flows through refinement and
//! persistence like any model reply, so the chat endpoint keeps
//! answering while the model is down. A store *write* failure is the one
//! error that propagates.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use mindmate_core::error::{Error, InferenceError};
use mindmate_core::history::Turn;
use mindmate_core::inference::CompletionClient;
use mindmate_core::store::ProfileStore;

use crate::composer::PromptComposer;
use crate::refiner::Refiner;

/// The result of one chat exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// The refined reply text.
    pub response: String,

    /// Whether the exchange was persisted. Always true on the success
    /// path; kept explicit because the API response reports it.
    pub memory_updated: bool,
}

/// Coordinates store, composer, inference, and refiner for each message.
pub struct ChatEngine {
    store: Arc<dyn ProfileStore>,
    client: Arc<dyn CompletionClient>,
    composer: PromptComposer,
    refiner: Refiner,
}

impl ChatEngine {
    /// Create an engine with the default composer and refiner.
    pub fn new(store: Arc<dyn ProfileStore>, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            store,
            client,
            composer: PromptComposer::default(),
            refiner: Refiner::default(),
        }
    }

    /// Replace the prompt composer.
    pub fn with_composer(mut self, composer: PromptComposer) -> Self {
        self.composer = composer;
        self
    }

    /// Replace the refiner.
    pub fn with_refiner(mut self, refiner: Refiner) -> Self {
        self.refiner = refiner;
        self
    }

    /// Handle one user message end to end.
    ///
    /// The caller guarantees `user_id` and the trimmed `message` are
    /// non-empty; the gateway enforces that before this runs.
    pub async fn handle(&self, user_id: &str, message: &str) -> Result<ChatReply, Error> {
        let message = message.trim();
        let request_id = Uuid::new_v4();

        let record = self.store.get(user_id).await?;
        let prompt = self.composer.compose(&record.chat_history, message);

        let raw = match self.client.complete(&prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(%request_id, user_id, error = %e, "Inference failed, substituting apology");
                apology(&e)
            }
        };

        let reply = self.refiner.refine(&raw, message);

        // The user turn and the bot turn are persisted together; a
        // partial exchange must never be visible.
        self.store
            .append_history(user_id, vec![Turn::user(message), Turn::bot(reply.clone())])
            .await?;

        info!(
            %request_id,
            user_id,
            history_len = record.chat_history.len(),
            reply_len = reply.len(),
            "Chat exchange complete"
        );

        Ok(ChatReply {
            response: reply,
            memory_updated: true,
        })
    }
}

/// Render a typed inference failure as the user-facing apology for its
/// category. This is the orchestrator's one formatting decision; the
/// client itself never produces reply text.
fn apology(error: &InferenceError) -> String {
    match error {
        InferenceError::Timeout { .. } => {
            "Sorry, the AI is taking too long to respond. Please try again later.".to_string()
        }
        InferenceError::Unreachable { .. } => {
            "Sorry, I can't connect to my brain right now. Please check the backend.".to_string()
        }
        InferenceError::InvalidResponse(_) => {
            "An unexpected error occurred with the AI response format.".to_string()
        }
        InferenceError::Api { .. } | InferenceError::Network(_) => {
            format!("An error occurred with the AI: {error}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mindmate_core::history::{READ_WINDOW, Role, WRITE_WINDOW};
    use mindmate_memory::InMemoryStore;
    use std::sync::Mutex;

    /// A scripted inference client: returns a fixed outcome and records
    /// the prompts it was given.
    struct StubClient {
        outcome: Result<String, InferenceError>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubClient {
        fn ok(reply: &str) -> Self {
            Self {
                outcome: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing(error: InferenceError) -> Self {
            Self {
                outcome: Err(error),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for StubClient {
        fn name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, prompt: &str) -> Result<String, InferenceError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.outcome.clone()
        }
    }

    /// A store whose writes always fail, for the propagation path.
    struct ReadOnlyStore;

    #[async_trait]
    impl ProfileStore for ReadOnlyStore {
        fn name(&self) -> &str {
            "read-only"
        }

        async fn get(
            &self,
            _user_id: &str,
        ) -> Result<mindmate_core::UserRecord, mindmate_core::StoreError> {
            Ok(mindmate_core::UserRecord::default())
        }

        async fn update(
            &self,
            _user_id: &str,
            _update: mindmate_core::ProfileUpdate,
        ) -> Result<(), mindmate_core::StoreError> {
            Err(mindmate_core::StoreError::Write {
                path: "nowhere".into(),
                reason: "read-only".into(),
            })
        }

        async fn append_history(
            &self,
            _user_id: &str,
            _turns: Vec<Turn>,
        ) -> Result<(), mindmate_core::StoreError> {
            Err(mindmate_core::StoreError::Write {
                path: "nowhere".into(),
                reason: "read-only".into(),
            })
        }
    }

    fn engine_with(client: StubClient) -> (ChatEngine, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let engine = ChatEngine::new(store.clone(), Arc::new(client));
        (engine, store)
    }

    #[tokio::test]
    async fn exchange_refines_and_persists() {
        let (engine, store) = engine_with(StubClient::ok(
            "MindMate: You did well today.\nYou did well today.\nRest now.",
        ));

        let reply = engine.handle("u1", "long day").await.unwrap();
        assert_eq!(reply.response, "You did well today.\nRest now.");
        assert!(reply.memory_updated);

        let history = store.get("u1").await.unwrap().chat_history;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].message, "long day");
        assert_eq!(history[1].role, Role::Bot);
        assert_eq!(history[1].message, "You did well today.\nRest now.");
    }

    #[tokio::test]
    async fn incoming_message_is_trimmed() {
        let (engine, store) = engine_with(StubClient::ok("ok"));

        engine.handle("u1", "  hello  ").await.unwrap();
        let history = store.get("u1").await.unwrap().chat_history;
        assert_eq!(history[0].message, "hello");
    }

    #[tokio::test]
    async fn timeout_yields_apology_reply_and_is_persisted() {
        let (engine, store) = engine_with(StubClient::failing(InferenceError::Timeout {
            timeout_secs: 300,
        }));

        let reply = engine.handle("u1", "hello?").await.unwrap();
        assert_eq!(
            reply.response,
            "Sorry, the AI is taking too long to respond. Please try again later."
        );
        assert!(reply.memory_updated);

        // The apology is recorded as a bot turn like any reply
        let history = store.get("u1").await.unwrap().chat_history;
        assert_eq!(history.len(), 2);
        assert!(history[1].message.contains("taking too long"));
    }

    #[tokio::test]
    async fn unreachable_backend_yields_its_own_apology() {
        let (engine, _) = engine_with(StubClient::failing(InferenceError::Unreachable {
            host: "http://localhost:11434".into(),
        }));

        let reply = engine.handle("u1", "hello?").await.unwrap();
        assert!(reply.response.contains("can't connect to my brain"));
    }

    #[tokio::test]
    async fn api_error_apology_carries_detail() {
        let (engine, _) = engine_with(StubClient::failing(InferenceError::Api {
            status_code: 503,
            message: "model loading".into(),
        }));

        let reply = engine.handle("u1", "hello?").await.unwrap();
        assert!(reply.response.starts_with("An error occurred with the AI:"));
        assert!(reply.response.contains("503"));
    }

    #[tokio::test]
    async fn tail_follows_user_message_not_model_output() {
        let (engine, _) = engine_with(StubClient::ok("Time heals."));

        let reply = engine.handle("u1", "my breakup is killing me").await.unwrap();
        assert!(reply.response.starts_with("Time heals."));
        assert!(reply.response.contains("Keep going"));
    }

    #[tokio::test]
    async fn prompt_carries_stored_history_within_read_window() {
        let store = Arc::new(InMemoryStore::new());
        let mut turns = Vec::new();
        for i in 0..12 {
            turns.push(Turn::user(format!("q{i}")));
            turns.push(Turn::bot(format!("a{i}")));
        }
        store.append_history("u1", turns).await.unwrap();

        let client = Arc::new(StubClient::ok("ok"));
        let engine = ChatEngine::new(store, client.clone());
        engine.handle("u1", "latest").await.unwrap();

        let prompts = client.prompts.lock().unwrap();
        let prompt = &prompts[0];
        // 24 appended, 20 kept (q2..a11), 10 composed (q7..a11):
        // a5 is stored but outside the read window
        assert!(prompt.contains("User: q9"));
        assert!(!prompt.contains("Bot: a5"));
        assert!(prompt.ends_with("User: latest\nMindMate:"));
        // Sanity: the window really is READ_WINDOW turns of history
        let history_lines = prompt
            .lines()
            .filter(|l| l.starts_with("User: ") || l.starts_with("Bot: "))
            .count();
        assert_eq!(history_lines, READ_WINDOW + 1); // plus the new message
    }

    #[tokio::test]
    async fn repeated_exchanges_respect_write_window() {
        let (engine, store) = engine_with(StubClient::ok("noted"));

        for i in 0..15 {
            engine.handle("u1", &format!("message {i}")).await.unwrap();
        }

        let history = store.get("u1").await.unwrap().chat_history;
        assert_eq!(history.len(), WRITE_WINDOW);
        assert_eq!(history.last().unwrap().message, "noted");
    }

    #[tokio::test]
    async fn store_write_failure_propagates() {
        let engine = ChatEngine::new(Arc::new(ReadOnlyStore), Arc::new(StubClient::ok("ok")));

        let result = engine.handle("u1", "hello").await;
        assert!(matches!(result, Err(Error::Store(_))));
    }
}

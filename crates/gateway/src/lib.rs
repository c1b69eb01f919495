//! HTTP API gateway for MindMate.
//!
//! Endpoints:
//!
//! - `GET  /`                           — Health marker, 200 always
//! - `POST /chat`                       — Send a message, get a refined reply
//! - `POST /update_user_profile`        — Merge profile fields for a user
//! - `GET  /get_user_profile/{user_id}` — Read a user's profile
//!
//! Built on Axum. The chat route is designed to always answer 200 with
//! some reply text: inference failures surface as apology replies, and
//! only a storage write failure turns into a 500. The profile-update
//! route is the one place that validates and rejects input.

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use mindmate_config::AppConfig;
use mindmate_core::profile::ProfileUpdate;
use mindmate_core::store::ProfileStore;
use mindmate_engine::ChatEngine;
use mindmate_memory::JsonFileStore;
use mindmate_providers::OllamaClient;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub engine: ChatEngine,
    pub store: Arc<dyn ProfileStore>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// Layers applied: open CORS (any origin, per the original deployment
/// model of a separate localhost frontend), request trace logging, and a
/// 1 MB body limit.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/chat", post(chat_handler))
        .route("/update_user_profile", post(update_profile_handler))
        .route("/get_user_profile/{user_id}", get(get_profile_handler))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
///
/// Builds the store, inference client, and engine once from the config
/// and shares them across all requests.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let store: Arc<dyn ProfileStore> = Arc::new(JsonFileStore::new(config.storage.path.clone()));
    let client = Arc::new(OllamaClient::new(&config.inference));
    let engine = ChatEngine::new(store.clone(), client);

    let state = Arc::new(GatewayState { engine, store });
    let app = build_router(state);

    info!(addr = %addr, model = %config.inference.model, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Request / Response types ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Deserialize)]
struct ChatRequest {
    user_id: String,
    message: String,
}

/// Shared response shape for the chat and profile-update routes.
#[derive(Serialize)]
struct ChatResponse {
    response: String,
    user_memory_updated: bool,
}

#[derive(Deserialize)]
struct ProfileUpdateRequest {
    user_id: String,

    #[serde(flatten)]
    fields: ProfileUpdate,
}

/// Profile read response: every field present, null when never set, the
/// queried id always echoed back.
#[derive(Serialize)]
struct UserMemoryResponse {
    user_id: String,
    name: Option<String>,
    recent_mood: Option<String>,
    career_goals: Option<String>,
    last_session_summary: Option<String>,
}

// --- Handlers ---

async fn root_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, StatusCode> {
    if payload.user_id.trim().is_empty() || payload.message.trim().is_empty() {
        warn!("Rejected chat request with blank user_id or message");
        return Err(StatusCode::BAD_REQUEST);
    }

    match state.engine.handle(&payload.user_id, &payload.message).await {
        Ok(reply) => Ok(Json(ChatResponse {
            response: reply.response,
            user_memory_updated: reply.memory_updated,
        })),
        Err(e) => {
            // Only store write failures reach here; inference failures
            // were already rendered into the reply.
            error!(error = %e, "Chat exchange failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn update_profile_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ProfileUpdateRequest>,
) -> Result<Json<ChatResponse>, StatusCode> {
    if payload.user_id.trim().is_empty() || payload.fields.is_empty() {
        warn!("Rejected profile update with missing id or empty payload");
        return Err(StatusCode::BAD_REQUEST);
    }

    state
        .store
        .update(&payload.user_id, payload.fields)
        .await
        .map_err(|e| {
            error!(error = %e, "Profile update failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(ChatResponse {
        response: "Profile updated.".into(),
        user_memory_updated: true,
    }))
}

async fn get_profile_handler(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserMemoryResponse>, StatusCode> {
    let record = state.store.get(&user_id).await.map_err(|e| {
        error!(error = %e, "Profile read failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(UserMemoryResponse {
        user_id,
        name: record.profile.name,
        recent_mood: record.profile.recent_mood,
        career_goals: record.profile.career_goals,
        last_session_summary: record.profile.last_session_summary,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use mindmate_core::error::InferenceError;
    use mindmate_core::inference::CompletionClient;
    use mindmate_memory::InMemoryStore;
    use tower::ServiceExt;

    struct StubClient {
        outcome: Result<String, InferenceError>,
    }

    #[async_trait]
    impl CompletionClient for StubClient {
        fn name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, InferenceError> {
            self.outcome.clone()
        }
    }

    fn test_app(outcome: Result<String, InferenceError>) -> (Router, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let engine = ChatEngine::new(store.clone(), Arc::new(StubClient { outcome }));
        let state = Arc::new(GatewayState {
            engine,
            store: store.clone(),
        });
        (build_router(state), store)
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (app, _) = test_app(Ok("hi".into()));

        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn chat_returns_refined_reply() {
        let (app, store) = test_app(Ok("MindMate: Take a breath.\nTake a breath.".into()));

        let req = post_json(
            "/chat",
            serde_json::json!({"user_id": "u1", "message": "stressful day"}),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["response"], "Take a breath.");
        assert_eq!(body["user_memory_updated"], true);

        let history = store.get("u1").await.unwrap().chat_history;
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn chat_rejects_blank_user_id() {
        let (app, store) = test_app(Ok("hi".into()));

        let req = post_json(
            "/chat",
            serde_json::json!({"user_id": "  ", "message": "hello"}),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.get("  ").await.unwrap().chat_history.is_empty());
    }

    #[tokio::test]
    async fn chat_rejects_blank_message() {
        let (app, _) = test_app(Ok("hi".into()));

        let req = post_json("/chat", serde_json::json!({"user_id": "u1", "message": ""}));
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chat_stays_up_when_inference_times_out() {
        let (app, store) = test_app(Err(InferenceError::Timeout { timeout_secs: 300 }));

        let req = post_json(
            "/chat",
            serde_json::json!({"user_id": "u1", "message": "anyone there?"}),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert!(
            body["response"]
                .as_str()
                .unwrap()
                .contains("taking too long")
        );

        // The apology exchange is persisted like any other
        let history = store.get("u1").await.unwrap().chat_history;
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn profile_update_merges_fields() {
        let (app, store) = test_app(Ok("hi".into()));

        let req = post_json(
            "/update_user_profile",
            serde_json::json!({"user_id": "u1", "name": "Ann"}),
        );
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["response"], "Profile updated.");
        assert_eq!(body["user_memory_updated"], true);

        let req = post_json(
            "/update_user_profile",
            serde_json::json!({"user_id": "u1", "recent_mood": "calm"}),
        );
        app.oneshot(req).await.unwrap();

        let record = store.get("u1").await.unwrap();
        assert_eq!(record.profile.name.as_deref(), Some("Ann"));
        assert_eq!(record.profile.recent_mood.as_deref(), Some("calm"));
    }

    #[tokio::test]
    async fn profile_update_without_fields_is_rejected() {
        let (app, store) = test_app(Ok("hi".into()));

        let req = post_json("/update_user_profile", serde_json::json!({"user_id": "u1"}));
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // No partial write happened
        let record = store.get("u1").await.unwrap();
        assert_eq!(record, mindmate_core::UserRecord::default());
    }

    #[tokio::test]
    async fn profile_update_without_user_id_is_rejected() {
        let (app, _) = test_app(Ok("hi".into()));

        let req = post_json(
            "/update_user_profile",
            serde_json::json!({"user_id": "", "name": "Ann"}),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_profile_reads_as_nulls_with_id_echoed() {
        let (app, _) = test_app(Ok("hi".into()));

        let req = Request::builder()
            .uri("/get_user_profile/stranger")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["user_id"], "stranger");
        assert_eq!(body["name"], serde_json::Value::Null);
        assert_eq!(body["recent_mood"], serde_json::Value::Null);
        assert_eq!(body["career_goals"], serde_json::Value::Null);
        assert_eq!(body["last_session_summary"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn profile_roundtrip_through_api() {
        let (app, _) = test_app(Ok("hi".into()));

        let req = post_json(
            "/update_user_profile",
            serde_json::json!({"user_id": "u1", "career_goals": "ship the app"}),
        );
        app.clone().oneshot(req).await.unwrap();

        let req = Request::builder()
            .uri("/get_user_profile/u1")
            .body(Body::empty())
            .unwrap();
        let body = json_body(app.oneshot(req).await.unwrap()).await;
        assert_eq!(body["career_goals"], "ship the app");
        assert_eq!(body["name"], serde_json::Value::Null);
    }
}

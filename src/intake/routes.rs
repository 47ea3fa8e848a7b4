//! REST endpoints for the intake conversation.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::StoreError;

use super::controller::DialogueController;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared state for intake routes.
#[derive(Clone)]
pub struct IntakeRouteState {
    pub controller: Arc<DialogueController>,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    session_id: Option<String>,
}

fn store_error_response(err: StoreError) -> Response {
    let status = match &err {
        StoreError::InvalidSessionId(_) => {
            warn!(error = %err, "Rejected request");
            StatusCode::BAD_REQUEST
        }
        StoreError::Unavailable(_) => {
            error!(error = %err, "Session store unavailable");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

/// POST /chat
///
/// One conversational turn. A request without `session_id` starts a new
/// session; the reply carries its id.
async fn chat(State(state): State<IntakeRouteState>, Json(req): Json<ChatRequest>) -> Response {
    let session_id = match req.session_id.filter(|s| !s.trim().is_empty()) {
        Some(id) => id,
        None => {
            let id = Uuid::new_v4().simple().to_string();
            debug!(session_id = %id, "Assigned new session id");
            id
        }
    };
    match state.controller.handle_turn(&session_id, &req.message).await {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => store_error_response(e),
    }
}

/// GET /api/intake/{session_id}/state
async fn get_state(
    State(state): State<IntakeRouteState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.controller.get_state(&session_id).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => store_error_response(e),
    }
}

/// POST /api/intake/{session_id}/reset
async fn reset(State(state): State<IntakeRouteState>, Path(session_id): Path<String>) -> Response {
    if let Err(e) = state.controller.reset_state(&session_id).await {
        return store_error_response(e);
    }
    match state.controller.get_state(&session_id).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => store_error_response(e),
    }
}

async fn health(State(state): State<IntakeRouteState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "bizmart-intake",
        "version": env!("CARGO_PKG_VERSION"),
        "rewrite_enabled": state.controller.config().rewrite_enabled,
    }))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin.trim() == "*" {
        return layer.allow_origin(Any);
    }
    match HeaderValue::from_str(origin.trim()) {
        Ok(value) => layer.allow_origin(value),
        Err(e) => {
            warn!(origin = origin, error = %e, "Invalid CORS origin, allowing any");
            layer.allow_origin(Any)
        }
    }
}

/// Build the intake REST routes.
pub fn intake_routes(state: IntakeRouteState, cors_origin: &str) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/api/intake/{session_id}/state", get(get_state))
        .route("/api/intake/{session_id}/reset", post(reset))
        .route("/api/health", get(health))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                // Innermost: CorsLayer needs a `Default` response body.
                .layer(cors_layer(cors_origin)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::config::IntakeConfig;
    use crate::launch::{LaunchConfig, MockOrchestrator};
    use crate::llm::PassthroughRewriter;
    use crate::store::InMemorySessionStore;

    fn app() -> Router {
        let controller = Arc::new(DialogueController::new(
            InMemorySessionStore::new(),
            Arc::new(PassthroughRewriter),
            Arc::new(MockOrchestrator::new(LaunchConfig::default())),
            IntakeConfig::default(),
        ));
        intake_routes(IntakeRouteState { controller }, "*")
    }

    fn chat_request(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json")
            .header("content-length", body.len())
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let message = format!("Name: {}", "x".repeat(MAX_BODY_BYTES));
        let body = serde_json::json!({ "message": message, "session_id": "big" }).to_string();
        let resp = app().oneshot(chat_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn small_body_passes_all_layers() {
        let body = serde_json::json!({ "message": "Type: Idea", "session_id": "s" }).to_string();
        let resp = app().oneshot(chat_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn chat_request_session_is_optional() {
        let req: ChatRequest = serde_json::from_str(r#"{"message":"Type: Idea"}"#).unwrap();
        assert_eq!(req.message, "Type: Idea");
        assert!(req.session_id.is_none());

        let req: ChatRequest =
            serde_json::from_str(r#"{"message":"reset","session_id":"abc"}"#).unwrap();
        assert_eq!(req.session_id.as_deref(), Some("abc"));
    }

    #[test]
    fn invalid_session_maps_to_bad_request() {
        let resp = store_error_response(StoreError::InvalidSessionId("bad id".into()));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = store_error_response(StoreError::Unavailable("down".into()));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

//! HTTP ingress for the honeypot engine
//!
//! One axum `Router` with CORS and a shared application state.
//!
//! ## Endpoint Map
//!
//! | Path                 | Method | Description                      |
//! |----------------------|--------|----------------------------------|
//! | `/health`            | GET    | Load balancer health probe       |
//! | `/honeypot/message`  | POST   | Submit one inbound message       |

use crate::engine::{EngineRequest, Orchestrator};
use crate::session::{ChannelMeta, Message};
use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    /// Expected `x-api-key` value; empty disables the check
    pub api_key: String,
}

/// Build the HTTP application ready to be served by `axum::serve`.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/honeypot/message", post(honeypot_message))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoneypotRequest {
    pub session_id: String,
    pub message: Message,
    #[serde(default)]
    pub conversation_history: Vec<Message>,
    #[serde(default)]
    pub metadata: Option<ChannelMeta>,
}

#[derive(Debug, Serialize)]
pub struct HoneypotResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

// =============================================================================
// Handlers
// =============================================================================

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn honeypot_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<HoneypotRequest>,
) -> impl IntoResponse {
    if !state.api_key.is_empty() {
        let supplied = headers.get("x-api-key").and_then(|v| v.to_str().ok());
        if supplied != Some(state.api_key.as_str()) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(HoneypotResponse {
                    status: "error".to_string(),
                    reply: None,
                    error: Some("Invalid or missing API key".to_string()),
                }),
            );
        }
    }

    if request.session_id.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(HoneypotResponse {
                status: "error".to_string(),
                reply: None,
                error: Some("sessionId must not be empty".to_string()),
            }),
        );
    }

    let outcome = state
        .orchestrator
        .handle_message(EngineRequest {
            session_id: request.session_id,
            message: request.message,
            history: request.conversation_history,
            metadata: request.metadata,
        })
        .await;

    (
        StatusCode::OK,
        Json(HoneypotResponse {
            status: "success".to_string(),
            reply: Some(outcome.reply),
            error: None,
        }),
    )
}

//! HTTP API v1 — what the browser page talks to.
//!
//! Endpoints:
//!
//! - `GET  /v1/models`  — Model catalog and the default selection
//! - `POST /v1/chat`    — Send a message with the page-held history, get the reply
//! - `POST /v1/export`  — Download the history as a plain-text transcript
//!
//! The page owns the history; every request carries it and the server keeps
//! no conversation state.

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use playground_core::export;
use playground_core::message::{Message, MessageBuilder};
use playground_core::models::{ModelId, ModelInfo, SUPPORTED_MODELS};
use playground_core::provider::ChatClient;
use playground_core::session::ChatSession;

// ── State ─────────────────────────────────────────────────────────────────

/// Immutable state shared by all requests.
pub struct ApiV1State {
    pub chat: Arc<dyn ChatClient>,
    pub builder: MessageBuilder,
    pub default_model: ModelId,
    pub max_tokens: u32,
}

pub type SharedApiState = Arc<ApiV1State>;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/models", get(list_models_handler))
        .route("/chat", post(chat_handler))
        .route("/export", post(export_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ChatRequest {
    /// The user's message.
    message: String,
    /// Prior turns, oldest first.
    #[serde(default)]
    history: Vec<Message>,
    /// Model id; the configured default when absent.
    #[serde(default)]
    model: Option<String>,
    /// Output budget; the configured default when absent.
    #[serde(default)]
    max_tokens: Option<u32>,
}

#[derive(Serialize, Deserialize)]
struct ChatResponse {
    reply: String,
    model: String,
}

#[derive(Serialize, Deserialize)]
struct ModelListResponse {
    models: Vec<ModelDto>,
    default_model: String,
}

#[derive(Serialize, Deserialize)]
struct ModelDto {
    label: String,
    id: String,
}

impl From<&ModelInfo> for ModelDto {
    fn from(m: &ModelInfo) -> Self {
        Self {
            label: m.label.to_string(),
            id: m.id.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ExportRequest {
    history: Vec<Message>,
}

#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn list_models_handler(State(state): State<SharedApiState>) -> Json<ModelListResponse> {
    Json(ModelListResponse {
        models: SUPPORTED_MODELS.iter().map(ModelDto::from).collect(),
        default_model: state.default_model.to_string(),
    })
}

async fn chat_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    if payload.message.trim().is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "message must not be empty"));
    }

    let max_tokens = payload.max_tokens.unwrap_or(state.max_tokens);
    if max_tokens == 0 {
        return Err(error_response(StatusCode::BAD_REQUEST, "max_tokens must be greater than 0"));
    }

    let model = payload
        .model
        .filter(|m| !m.trim().is_empty())
        .map(ModelId::from)
        .unwrap_or_else(|| state.default_model.clone());

    info!(model = %model, history = payload.history.len(), "v1/chat request");

    let mut session = ChatSession::new(model.clone())
        .with_history(payload.history)
        .with_max_tokens(max_tokens)
        .with_builder(state.builder.clone());

    match session.send(state.chat.as_ref(), &payload.message).await {
        Ok(reply) => Ok(Json(ChatResponse {
            reply,
            model: model.to_string(),
        })),
        Err(e) => {
            error!(model = %model, error = %e, "Chat request failed");
            Err(error_response(StatusCode::BAD_GATEWAY, "request failed"))
        }
    }
}

async fn export_handler(Json(payload): Json<ExportRequest>) -> Response {
    if payload.history.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "conversation is empty").into_response();
    }

    let filename = export::export_filename(chrono::Local::now().naive_local());
    let body = export::render_transcript(&payload.history);
    info!(filename = %filename, messages = payload.history.len(), "v1/export request");

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

//! HTTP gateway for LLM Playground.
//!
//! Serves the embedded chat page and the small v1 API it talks to, plus a
//! health check. Built on Axum.

pub mod api_v1;
pub mod frontend;

use axum::extract::DefaultBodyLimit;
use axum::{Router, http::HeaderValue, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

use playground_config::AppConfig;
use playground_core::message::MessageBuilder;
use playground_core::models::ModelId;
use playground_core::provider::ChatClient;

/// Build the full router: health, v1 API and the embedded frontend.
///
/// Layers applied:
/// - CORS limited to localhost origins
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(api_state: api_v1::SharedApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
            is_local_origin(origin.as_bytes())
        }))
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api_v1::v1_router(api_state))
        .merge(frontend::frontend_router())
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// `http://localhost` or `http://127.0.0.1`, with an optional numeric port.
fn is_local_origin(origin: &[u8]) -> bool {
    let Some(authority) = origin.strip_prefix(b"http://") else {
        return false;
    };

    let (host, port) = match authority.iter().position(|&b| b == b':') {
        Some(i) => (&authority[..i], Some(&authority[i + 1..])),
        None => (authority, None),
    };

    let host_ok = host == b"localhost" || host == b"127.0.0.1";
    host_ok && port.is_none_or(is_port)
}

fn is_port(port: &[u8]) -> bool {
    (1..=5).contains(&port.len()) && port.iter().all(u8::is_ascii_digit)
}

/// Shared API state from configuration and a chat client.
pub fn api_state(config: &AppConfig, chat: Arc<dyn ChatClient>) -> api_v1::SharedApiState {
    let builder = match &config.system_prompt {
        Some(prompt) => MessageBuilder::with_system_prompt(prompt),
        None => MessageBuilder::new(),
    };

    Arc::new(api_v1::ApiV1State {
        chat,
        builder,
        default_model: ModelId::from(config.default_model.as_str()),
        max_tokens: config.max_tokens,
    })
}

/// Start the gateway HTTP server.
///
/// The dispatcher is built before binding, so a missing token stops startup.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let dispatcher = playground_providers::build_from_config(&config)?;
    let app = build_router(api_state(&config, Arc::new(dispatcher)));

    info!(addr = %addr, model = %config.default_model, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

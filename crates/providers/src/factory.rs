//! Build the chat dispatcher from configuration.

use std::sync::Arc;

use playground_config::AppConfig;
use playground_core::error::ProviderError;
use playground_core::provider::InferenceBackend;
use tracing::info;

use crate::dispatcher::ChatDispatcher;
use crate::hf_inference::HuggingFaceClient;

/// Construct the dispatcher described by `config`.
///
/// Fails before any request is made when no API token is configured.
pub fn build_from_config(config: &AppConfig) -> Result<ChatDispatcher, ProviderError> {
    let token = config
        .require_token()
        .map_err(|e| ProviderError::NotConfigured(e.to_string()))?;

    let backend: Arc<dyn InferenceBackend> =
        Arc::new(HuggingFaceClient::new(token)?.with_base_url(&config.inference.api_url));

    info!(
        backend = %backend.name(),
        api_url = %config.inference.api_url,
        fallback = ?config.fallback,
        "Chat dispatcher ready"
    );

    Ok(ChatDispatcher::new(backend)
        .with_policy(config.fallback)
        .with_temperature(config.temperature))
}

//! Provider traits — the abstraction over the inference service.
//!
//! [`InferenceBackend`] is the raw service: one method per request shape the
//! endpoint may expose. [`ChatClient`] is the single capability the
//! front-ends depend on: turn a conversation into reply text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::{Conversation, Message};
use crate::models::ModelId;

/// Structured request: role-tagged messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// The model to use
    pub model: ModelId,

    /// The conversation messages, system prompt first
    pub messages: Vec<Message>,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature; the service default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Flat-text request: a single prompt string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextGenerationRequest {
    pub model: ModelId,
    pub prompt: String,
    pub max_new_tokens: u32,
}

/// A hosted inference endpoint.
///
/// Deployments expose either operation or both; callers must be ready for
/// either to fail.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// A human-readable name for this backend (e.g., "huggingface").
    fn name(&self) -> &str;

    /// Chat-completion call. Returns the first choice's content, untrimmed.
    async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> std::result::Result<String, ProviderError>;

    /// Raw text-generation call. Returns the generated continuation, untrimmed.
    async fn text_generation(
        &self,
        request: TextGenerationRequest,
    ) -> std::result::Result<String, ProviderError>;
}

/// Anything that can answer a conversation with text.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send `conversation` to `model` with an output budget of `max_tokens`
    /// and return the reply, trimmed of surrounding whitespace.
    async fn chat(
        &self,
        conversation: &Conversation,
        model: &ModelId,
        max_tokens: u32,
    ) -> std::result::Result<String, ProviderError>;
}

/// Which primary-protocol failures switch the dispatcher to the flat-text protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Any failure of the structured call.
    #[default]
    Always,
    /// Only failures where the endpoint does not offer chat completion.
    UnsupportedOnly,
}

impl FallbackPolicy {
    pub fn should_fall_back(&self, error: &ProviderError) -> bool {
        match self {
            FallbackPolicy::Always => true,
            FallbackPolicy::UnsupportedOnly => error.is_unsupported(),
        }
    }
}

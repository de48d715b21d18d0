//! Chat dispatcher — structured chat completion with a flat-text fallback.
//!
//! The conversation goes out as role-tagged messages first. When that call
//! fails (and the [`FallbackPolicy`] allows it) the same conversation is
//! flattened into one prompt and sent to text generation instead. A failure
//! of the fallback call is returned as-is; there is no third attempt.

use async_trait::async_trait;
use playground_core::error::ProviderError;
use playground_core::message::{Conversation, Role};
use playground_core::models::ModelId;
use playground_core::provider::{
    ChatClient, ChatCompletionRequest, FallbackPolicy, InferenceBackend, TextGenerationRequest,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Marker that ends every flat prompt so the model continues as the assistant.
const CONTINUATION_MARKER: &str = "[ASSISTANT] ";

fn role_tag(role: Role) -> &'static str {
    match role {
        Role::System => "[SYSTEM]",
        Role::User => "[USER]",
        Role::Assistant => "[ASSISTANT]",
    }
}

/// Flatten a conversation into a text-generation prompt.
///
/// `[ROLE] content` per message, separated by blank lines, followed by an
/// empty `[ASSISTANT] ` turn.
pub fn render_flat_prompt(conversation: &Conversation) -> String {
    let mut lines: Vec<String> = conversation
        .iter()
        .map(|m| format!("{} {}\n", role_tag(m.role), m.content))
        .collect();
    lines.push(CONTINUATION_MARKER.to_string());
    lines.join("\n")
}

/// The [`ChatClient`] used by every front-end.
pub struct ChatDispatcher {
    backend: Arc<dyn InferenceBackend>,
    policy: FallbackPolicy,
    temperature: Option<f32>,
}

impl ChatDispatcher {
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self {
            backend,
            policy: FallbackPolicy::default(),
            temperature: None,
        }
    }

    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Temperature for the structured call. Text generation uses the service default.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }
}

#[async_trait]
impl ChatClient for ChatDispatcher {
    async fn chat(
        &self,
        conversation: &Conversation,
        model: &ModelId,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        let request = ChatCompletionRequest {
            model: model.clone(),
            messages: conversation.messages().to_vec(),
            max_tokens,
            temperature: self.temperature,
        };

        debug!(backend = %self.backend.name(), model = %model, "Trying chat completion");

        match self.backend.chat_completion(request).await {
            Ok(content) => return Ok(content.trim().to_string()),
            Err(e) if self.policy.should_fall_back(&e) => {
                warn!(
                    backend = %self.backend.name(),
                    model = %model,
                    error = %e,
                    "Chat completion failed, falling back to text generation"
                );
            }
            Err(e) => {
                warn!(
                    backend = %self.backend.name(),
                    model = %model,
                    error = %e,
                    policy = ?self.policy,
                    "Chat completion failed, fallback not allowed for this error"
                );
                return Err(e);
            }
        }

        let prompt = render_flat_prompt(conversation);
        info!(model = %model, prompt_len = prompt.len(), "Sending flat-text fallback");

        let text = self
            .backend
            .text_generation(TextGenerationRequest {
                model: model.clone(),
                prompt,
                max_new_tokens: max_tokens,
            })
            .await?;

        Ok(text.trim().to_string())
    }
}

//! # LLM Playground Core
//!
//! Domain types and traits for the playground: messages and conversations,
//! the chat client abstraction, caller-owned sessions and transcript export.
//! No HTTP or UI code lives here; the providers and gateway crates implement
//! against these types.

pub mod error;
pub mod export;
pub mod message;
pub mod models;
pub mod provider;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result};
pub use message::{Conversation, Message, MessageBuilder, Role, SYSTEM_PROMPT, build_conversation};
pub use models::{ModelId, ModelInfo, SUPPORTED_MODELS};
pub use provider::{
    ChatClient, ChatCompletionRequest, FallbackPolicy, InferenceBackend, TextGenerationRequest,
};
pub use session::ChatSession;

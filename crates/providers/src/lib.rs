//! Inference backends and the chat dispatcher for LLM Playground.
//!
//! `HuggingFaceClient` implements `playground_core::InferenceBackend`;
//! `ChatDispatcher` wraps any backend into the `ChatClient` the front-ends use.

pub mod dispatcher;
pub mod factory;
pub mod hf_inference;

pub use dispatcher::{ChatDispatcher, render_flat_prompt};
pub use factory::build_from_config;
pub use hf_inference::HuggingFaceClient;

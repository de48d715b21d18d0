//! Model identifiers and the catalog of models offered in the front-ends.

use serde::{Deserialize, Serialize};

/// Opaque identifier of a hosted model, e.g. `mistralai/Mistral-7B-Instruct-v0.2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(pub String);

impl ModelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ModelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A catalog entry: display label plus model id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub label: &'static str,
    pub id: &'static str,
}

/// Models offered by default. The first one is the default selection.
pub const SUPPORTED_MODELS: &[ModelInfo] = &[
    ModelInfo {
        label: "Mistral 7B Instruct v0.2",
        id: "mistralai/Mistral-7B-Instruct-v0.2",
    },
    ModelInfo {
        label: "Mistral 7B Instruct v0.3",
        id: "mistralai/Mistral-7B-Instruct-v0.3",
    },
    ModelInfo {
        label: "Llama 3 8B Instruct",
        id: "meta-llama/Meta-Llama-3-8B-Instruct",
    },
    ModelInfo {
        label: "Falcon 7B Instruct",
        id: "tiiuae/falcon-7b-instruct",
    },
];

/// The default model id.
pub fn default_model() -> ModelId {
    ModelId::new(SUPPORTED_MODELS[0].id)
}

/// Look a model up by id or by its display label (case-insensitive).
pub fn find_model(query: &str) -> Option<&'static ModelInfo> {
    SUPPORTED_MODELS
        .iter()
        .find(|m| m.id == query || m.label.eq_ignore_ascii_case(query))
}

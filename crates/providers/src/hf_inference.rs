//! Hugging Face Inference API backend.
//!
//! Two operations, matching what hosted deployments expose:
//! - chat completion at `/models/{model}/v1/chat/completions` (OpenAI-compatible body)
//! - raw text generation at `/models/{model}` (`inputs` + `parameters`)
//!
//! A deployment may only offer one of them; the dispatcher decides what to do
//! when a call fails.

use async_trait::async_trait;
use playground_core::error::ProviderError;
use playground_core::message::Message;
use playground_core::provider::{ChatCompletionRequest, InferenceBackend, TextGenerationRequest};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "https://api-inference.huggingface.co";

/// Wait used when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Client for the hosted Hugging Face inference endpoints.
pub struct HuggingFaceClient {
    base_url: String,
    api_token: String,
    client: reqwest::Client,
}

impl HuggingFaceClient {
    /// Create a client authenticated with `api_token`.
    ///
    /// An empty token is rejected here so no request is ever sent without one.
    pub fn new(api_token: impl Into<String>) -> Result<Self, ProviderError> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(ProviderError::NotConfigured(
                "Hugging Face API token is missing".into(),
            ));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("llm-playground/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: DEFAULT_API_URL.to_string(),
            api_token,
            client,
        })
    }

    /// Point the client at a different deployment (self-hosted TGI, proxy, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn chat_url(&self, model: &str) -> String {
        format!("{}/models/{}/v1/chat/completions", self.base_url, model)
    }

    fn generation_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model)
    }

    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage<'_>> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect()
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_token)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        check_status(response).await
    }
}

/// Map non-success statuses onto [`ProviderError`].
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();
    if response.status().is_success() {
        return Ok(response);
    }

    let retry_after = retry_after_secs(response.headers());
    let body = response.text().await.unwrap_or_default();
    warn!(status, body = %body, "Inference endpoint returned error");

    Err(match status {
        401 | 403 => {
            ProviderError::AuthenticationFailed("Invalid token or insufficient permissions".into())
        }
        404 => ProviderError::ModelNotFound(body),
        405 | 501 => ProviderError::Unsupported(body),
        429 => ProviderError::RateLimited {
            retry_after_secs: retry_after,
        },
        400 | 422 if body.to_ascii_lowercase().contains("not supported") => {
            ProviderError::Unsupported(body)
        }
        _ => ProviderError::ApiError {
            status_code: status,
            message: body,
        },
    })
}

/// Seconds from a delta-seconds `Retry-After` header.
fn retry_after_secs(headers: &reqwest::header::HeaderMap) -> u64 {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

#[async_trait]
impl InferenceBackend for HuggingFaceClient {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<String, ProviderError> {
        let url = self.chat_url(request.model.as_str());
        let body = ApiChatRequest {
            model: request.model.as_str(),
            messages: Self::to_api_messages(&request.messages),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        };

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let response = self.post(&url, &body).await?;
        let api_response: ApiChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("chat completion: {e}")))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("No choices in response".into()))?;

        choice
            .message
            .content
            .ok_or_else(|| ProviderError::MalformedResponse("No content in first choice".into()))
    }

    async fn text_generation(
        &self,
        request: TextGenerationRequest,
    ) -> Result<String, ProviderError> {
        let url = self.generation_url(request.model.as_str());
        let body = ApiGenerationRequest {
            inputs: &request.prompt,
            parameters: ApiGenerationParameters {
                max_new_tokens: request.max_new_tokens,
                return_full_text: false,
            },
        };

        debug!(
            model = %request.model,
            prompt_len = request.prompt.len(),
            "Sending text generation request"
        );

        let response = self.post(&url, &body).await?;
        let generation: ApiGeneration = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("text generation: {e}")))?;

        generation.into_text().ok_or_else(|| {
            ProviderError::MalformedResponse("No generated_text in response".into())
        })
    }
}

// --- Wire types (internal) ---

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ApiChatRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ApiChatResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ApiChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiGenerationRequest<'a> {
    inputs: &'a str,
    parameters: ApiGenerationParameters,
}

#[derive(Debug, Serialize)]
struct ApiGenerationParameters {
    max_new_tokens: u32,
    return_full_text: bool,
}

/// The generation route answers with a list for batched models and a bare
/// object for TGI deployments.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiGeneration {
    Many(Vec<GeneratedText>),
    One(GeneratedText),
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

impl ApiGeneration {
    fn into_text(self) -> Option<String> {
        match self {
            ApiGeneration::Many(items) => items.into_iter().next().map(|g| g.generated_text),
            ApiGeneration::One(g) => Some(g.generated_text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::extract::State;
    use crate::dispatcher::{ChatDispatcher, render_flat_prompt};
    use axum::http::{HeaderMap, HeaderValue, StatusCode};
    use axum::response::{IntoResponse, Json};
    use axum::routing::post;
    use playground_core::message::build_conversation;
    use playground_core::models::ModelId;
    use playground_core::provider::ChatClient;
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    /// What the mock endpoint saw: authorization header and JSON body.
    type Captured = Arc<Mutex<Vec<(String, Value)>>>;

    #[derive(Clone)]
    struct MockState {
        captured: Captured,
        status: StatusCode,
        headers: HeaderMap,
        reply: Value,
        /// Reply for the generation route; `reply` when unset.
        generation_reply: Option<Value>,
    }

    impl MockState {
        fn new(status: StatusCode, reply: Value) -> Self {
            Self {
                captured: Arc::new(Mutex::new(Vec::new())),
                status,
                headers: HeaderMap::new(),
                reply,
                generation_reply: None,
            }
        }

        fn capture(&self, headers: &HeaderMap, body: Value) {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            self.captured.lock().unwrap().push((auth, body));
        }
    }

    async fn record_chat(
        State(state): State<MockState>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> impl IntoResponse {
        state.capture(&headers, body);
        (state.status, state.headers.clone(), Json(state.reply.clone()))
    }

    async fn record_generation(
        State(state): State<MockState>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> impl IntoResponse {
        state.capture(&headers, body);
        let reply = state.generation_reply.clone().unwrap_or(state.reply.clone());
        (state.status, state.headers.clone(), Json(reply))
    }

    /// Serve both routes from a local listener and return its base URL.
    async fn spawn_mock(status: StatusCode, reply: Value) -> (String, Captured) {
        serve_mock(MockState::new(status, reply)).await
    }

    async fn serve_mock(state: MockState) -> (String, Captured) {
        let captured = state.captured.clone();
        let app = Router::new()
            .route("/models/{org}/{name}/v1/chat/completions", post(record_chat))
            .route("/models/{org}/{name}", post(record_generation))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), captured)
    }

    fn client(base_url: &str) -> HuggingFaceClient {
        HuggingFaceClient::new("hf_test").unwrap().with_base_url(base_url)
    }

    fn chat_request() -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: ModelId::from("mistralai/Mistral-7B-Instruct-v0.2"),
            messages: vec![Message::system("Be brief."), Message::user("Hello")],
            max_tokens: 256,
            temperature: None,
        }
    }

    #[test]
    fn empty_token_is_configuration_error() {
        assert!(matches!(
            HuggingFaceClient::new(""),
            Err(ProviderError::NotConfigured(_))
        ));
        assert!(matches!(
            HuggingFaceClient::new("  "),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[test]
    fn urls_include_model_path() {
        let c = client("http://localhost:8080/");
        assert_eq!(c.base_url(), "http://localhost:8080");
        assert_eq!(
            c.chat_url("org/model"),
            "http://localhost:8080/models/org/model/v1/chat/completions"
        );
        assert_eq!(c.generation_url("org/model"), "http://localhost:8080/models/org/model");
    }

    #[test]
    fn message_conversion() {
        let messages = vec![Message::system("You are helpful"), Message::user("Hello")];
        let api = HuggingFaceClient::to_api_messages(&messages);
        assert_eq!(api.len(), 2);
        assert_eq!(api[0].role, "system");
        assert_eq!(api[1].role, "user");
        assert_eq!(api[1].content, "Hello");
    }

    #[tokio::test]
    async fn chat_completion_sends_structured_body() {
        let (url, captured) = spawn_mock(
            StatusCode::OK,
            json!({"choices": [{"message": {"role": "assistant", "content": " Hi there! "}}]}),
        )
        .await;

        let text = client(&url).chat_completion(chat_request()).await.unwrap();
        assert_eq!(text, " Hi there! ");

        let seen = captured.lock().unwrap();
        let (auth, body) = &seen[0];
        assert_eq!(auth, "Bearer hf_test");
        assert_eq!(body["model"], "mistralai/Mistral-7B-Instruct-v0.2");
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Hello");
        assert!(body.get("temperature").is_none());
    }

    #[tokio::test]
    async fn chat_completion_without_choices_is_malformed() {
        let (url, _) = spawn_mock(StatusCode::OK, json!({"choices": []})).await;
        let err = client(&url).chat_completion(chat_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn chat_completion_with_null_content_is_malformed() {
        let (url, _) = spawn_mock(
            StatusCode::OK,
            json!({"choices": [{"message": {"role": "assistant", "content": null}}]}),
        )
        .await;
        let err = client(&url).chat_completion(chat_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn null_chat_content_falls_back_to_text_generation() {
        let mut state = MockState::new(
            StatusCode::OK,
            json!({"choices": [{"message": {"role": "assistant", "content": null}}]}),
        );
        state.generation_reply = Some(json!([{"generated_text": " Hello from generation. "}]));
        let (url, captured) = serve_mock(state).await;

        let backend = Arc::new(client(&url));
        let dispatcher = ChatDispatcher::new(backend);
        let conv = build_conversation("Hello", &[]);
        let reply = dispatcher
            .chat(&conv, &ModelId::from("mistralai/Mistral-7B-Instruct-v0.2"), 128)
            .await
            .unwrap();

        assert_eq!(reply, "Hello from generation.");

        let seen = captured.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].1.get("messages").is_some());
        assert_eq!(seen[1].1["inputs"], render_flat_prompt(&conv));
        assert_eq!(seen[1].1["parameters"]["max_new_tokens"], 128);
    }

    #[tokio::test]
    async fn text_generation_sends_inputs_and_parameters() {
        let (url, captured) =
            spawn_mock(StatusCode::OK, json!([{"generated_text": " Sure thing."}])).await;

        let text = client(&url)
            .text_generation(TextGenerationRequest {
                model: ModelId::from("tiiuae/falcon-7b-instruct"),
                prompt: "[USER] Hi\n\n[ASSISTANT] ".into(),
                max_new_tokens: 100,
            })
            .await
            .unwrap();
        assert_eq!(text, " Sure thing.");

        let seen = captured.lock().unwrap();
        let body = &seen[0].1;
        assert_eq!(body["inputs"], "[USER] Hi\n\n[ASSISTANT] ");
        assert_eq!(body["parameters"]["max_new_tokens"], 100);
        assert_eq!(body["parameters"]["return_full_text"], false);
    }

    #[tokio::test]
    async fn text_generation_accepts_single_object() {
        let (url, _) = spawn_mock(StatusCode::OK, json!({"generated_text": "ok"})).await;
        let text = client(&url)
            .text_generation(TextGenerationRequest {
                model: ModelId::from("org/model"),
                prompt: "p".into(),
                max_new_tokens: 8,
            })
            .await
            .unwrap();
        assert_eq!(text, "ok");
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authentication_failed() {
        let (url, _) = spawn_mock(StatusCode::UNAUTHORIZED, json!({"error": "bad token"})).await;
        let err = client(&url).chat_completion(chat_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn missing_route_is_unsupported() {
        let (url, _) = spawn_mock(StatusCode::NOT_FOUND, json!({"error": "Not Found"})).await;
        let err = client(&url).chat_completion(chat_request()).await.unwrap_err();
        assert!(err.is_unsupported());
    }

    #[tokio::test]
    async fn not_supported_message_is_unsupported() {
        let (url, _) = spawn_mock(
            StatusCode::BAD_REQUEST,
            json!({"error": "Model tiiuae/falcon-7b-instruct is not supported for task chat-completion"}),
        )
        .await;
        let err = client(&url).chat_completion(chat_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unsupported(_)));
    }

    #[tokio::test]
    async fn server_error_keeps_status() {
        let (url, _) = spawn_mock(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({"error": "Model is currently loading"}),
        )
        .await;
        match client(&url).chat_completion(chat_request()).await.unwrap_err() {
            ProviderError::ApiError { status_code, message } => {
                assert_eq!(status_code, 503);
                assert!(message.contains("loading"));
            }
            other => panic!("Expected ApiError, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rate_limit_reads_retry_after_header() {
        let mut state =
            MockState::new(StatusCode::TOO_MANY_REQUESTS, json!({"error": "slow down"}));
        state.headers.insert("retry-after", HeaderValue::from_static("42"));
        let (url, _) = serve_mock(state).await;

        let err = client(&url).chat_completion(chat_request()).await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::RateLimited {
                retry_after_secs: 42
            }
        ));
    }

    #[tokio::test]
    async fn rate_limit_without_header_uses_default_wait() {
        let (url, _) =
            spawn_mock(StatusCode::TOO_MANY_REQUESTS, json!({"error": "slow down"})).await;
        let err = client(&url).chat_completion(chat_request()).await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::RateLimited {
                retry_after_secs: DEFAULT_RETRY_AFTER_SECS
            }
        ));
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{addr}"))
            .chat_completion(chat_request())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)));
    }

    #[test]
    fn parse_generation_variants() {
        let many: ApiGeneration = serde_json::from_str(r#"[{"generated_text":"a"}]"#).unwrap();
        assert_eq!(many.into_text().as_deref(), Some("a"));

        let empty: ApiGeneration = serde_json::from_str("[]").unwrap();
        assert!(empty.into_text().is_none());
    }
}

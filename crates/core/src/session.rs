//! Caller-owned chat session.
//!
//! Holds the history, the selected model and the token budget for one user.
//! Front-ends own a `ChatSession` and pass a [`ChatClient`] into it per turn;
//! nothing here is shared between sessions.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ProviderError, Result};
use crate::export;
use crate::message::{Message, MessageBuilder};
use crate::models::ModelId;
use crate::provider::ChatClient;

/// Default output budget per reply.
pub const DEFAULT_MAX_TOKENS: u32 = 512;

#[derive(Debug, Clone)]
pub struct ChatSession {
    history: Vec<Message>,
    model: ModelId,
    max_tokens: u32,
    builder: MessageBuilder,
}

impl ChatSession {
    pub fn new(model: ModelId) -> Self {
        Self {
            history: Vec::new(),
            model,
            max_tokens: DEFAULT_MAX_TOKENS,
            builder: MessageBuilder::new(),
        }
    }

    /// Resume from an existing history.
    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_builder(mut self, builder: MessageBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn model(&self) -> &ModelId {
        &self.model
    }

    pub fn set_model(&mut self, model: ModelId) {
        self.model = model;
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Run one turn. History grows by the user message and the reply only
    /// when the call succeeds.
    pub async fn send(
        &mut self,
        client: &dyn ChatClient,
        user_input: &str,
    ) -> std::result::Result<String, ProviderError> {
        let conversation = self.builder.build(user_input, &self.history);
        debug!(
            model = %self.model,
            messages = conversation.len(),
            est_tokens = conversation.estimated_tokens(),
            "Sending turn"
        );

        let reply = client
            .chat(&conversation, &self.model, self.max_tokens)
            .await?;

        self.history.push(Message::user(user_input));
        self.history.push(Message::assistant(reply.clone()));
        Ok(reply)
    }

    /// Transcript of the history in export format.
    pub fn transcript(&self) -> String {
        export::render_transcript(&self.history)
    }

    /// Write the transcript to a timestamped file under `dir`.
    pub fn export_to(&self, dir: &Path) -> Result<PathBuf> {
        export::write_transcript(dir, &self.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Conversation, Role, SYSTEM_PROMPT};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every conversation it is asked about.
    struct RecordingClient {
        reply: std::result::Result<String, ProviderError>,
        seen: Mutex<Vec<(Conversation, ModelId, u32)>>,
    }

    impl RecordingClient {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.into()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(ProviderError::Network("connection refused".into())),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatClient for RecordingClient {
        async fn chat(
            &self,
            conversation: &Conversation,
            model: &ModelId,
            max_tokens: u32,
        ) -> std::result::Result<String, ProviderError> {
            self.seen
                .lock()
                .unwrap()
                .push((conversation.clone(), model.clone(), max_tokens));
            self.reply.clone()
        }
    }

    #[tokio::test]
    async fn successful_turn_appends_both_messages() {
        let client = RecordingClient::ok("Hi there!");
        let mut session = ChatSession::new(ModelId::from("org/model"));

        let reply = session.send(&client, "Hello").await.unwrap();

        assert_eq!(reply, "Hi there!");
        assert_eq!(
            session.history(),
            &[Message::user("Hello"), Message::assistant("Hi there!")]
        );
    }

    #[tokio::test]
    async fn second_turn_carries_history() {
        let client = RecordingClient::ok("ok");
        let mut session = ChatSession::new(ModelId::from("org/model")).with_max_tokens(128);

        session.send(&client, "one").await.unwrap();
        session.send(&client, "two").await.unwrap();

        let seen = client.seen.lock().unwrap();
        let (conv, model, budget) = &seen[1];
        assert_eq!(conv.len(), 4);
        assert_eq!(conv.messages()[0], Message::system(SYSTEM_PROMPT));
        assert_eq!(conv.messages()[1], Message::user("one"));
        assert_eq!(conv.messages()[2].role, Role::Assistant);
        assert_eq!(conv.latest(), Some(&Message::user("two")));
        assert_eq!(model.as_str(), "org/model");
        assert_eq!(*budget, 128);
    }

    #[tokio::test]
    async fn failed_turn_leaves_history_untouched() {
        let client = RecordingClient::failing();
        let mut session = ChatSession::new(ModelId::from("org/model"))
            .with_history(vec![Message::user("earlier"), Message::assistant("reply")]);

        let result = session.send(&client, "Hello").await;

        assert!(matches!(result, Err(ProviderError::Network(_))));
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn model_switch_applies_to_next_turn() {
        let client = RecordingClient::ok("ok");
        let mut session = ChatSession::new(ModelId::from("a/one"));
        session.set_model(ModelId::from("b/two"));
        session.send(&client, "hi").await.unwrap();

        assert_eq!(client.seen.lock().unwrap()[0].1.as_str(), "b/two");
        assert_eq!(session.model().as_str(), "b/two");
    }

    #[test]
    fn clear_and_transcript() {
        let mut session = ChatSession::new(ModelId::from("org/model"))
            .with_history(vec![Message::user("Hello"), Message::assistant("Hi")]);
        assert_eq!(session.transcript(), "USER: Hello\n\nASSISTANT: Hi\n\n");

        session.clear();
        assert!(session.history().is_empty());
        assert_eq!(session.max_tokens(), DEFAULT_MAX_TOKENS);
    }
}

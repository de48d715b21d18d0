//! Message and Conversation domain types.
//!
//! A [`Conversation`] is what actually goes over the wire: it is rebuilt for
//! every outbound call from the caller's history, with the system prompt
//! prepended and the new user turn appended. History itself stays with the
//! caller.

use serde::{Deserialize, Serialize};

/// Instruction sent as the first message of every conversation.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful, concise AI assistant. Answer clearly and use markdown when helpful.";

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions
    System,
    /// The end user
    User,
    /// The model
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,
}

impl Message {
    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// An ordered, role-tagged message sequence ready to send to a model.
///
/// Always starts with one system message and ends with the newest user
/// message. Only [`MessageBuilder`] can create one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// All messages, system prompt first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Never true for a built conversation; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The newest user message.
    pub fn latest(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Get the total token count estimate (rough: 4 chars ≈ 1 token).
    pub fn estimated_tokens(&self) -> usize {
        self.messages.iter().map(|m| m.content.len() / 4).sum()
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

/// Assembles outbound conversations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBuilder {
    system_prompt: String,
}

impl MessageBuilder {
    /// A builder using [`SYSTEM_PROMPT`].
    pub fn new() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    /// A builder with an operator-supplied system prompt.
    pub fn with_system_prompt(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// `[system] + history + [user_input]`. `history` is not touched and is
    /// not validated.
    pub fn build(&self, user_input: &str, history: &[Message]) -> Conversation {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(&self.system_prompt));
        messages.extend_from_slice(history);
        messages.push(Message::user(user_input));
        Conversation { messages }
    }
}

impl Default for MessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a conversation with the default system prompt.
pub fn build_conversation(user_input: &str, history: &[Message]) -> Conversation {
    MessageBuilder::new().build(user_input, history)
}

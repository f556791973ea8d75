//! Completion provider abstraction.
//!
//! A provider turns an ordered list of role-tagged messages into generated
//! text. Providers are stateless per call: conversational memory comes from
//! the context window replayed with each request.

use async_trait::async_trait;

use crate::error::LlmError;

/// Message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
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

/// One role-tagged message.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A completion request.
///
/// Stateless providers that accept a single prompt string flatten the
/// message list themselves (in practice they receive a single user message).
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    /// Single-prompt request, for stateless secondary providers.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::user(prompt)],
        }
    }
}

/// Any backend capable of turning a message list into generated text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete the request. Every failure mode maps to a typed [`LlmError`].
    async fn complete(&self, req: CompletionRequest) -> Result<String, LlmError>;

    /// Human-readable provider name, used to label aggregated output.
    fn name(&self) -> &str;
}

//! LLM Completion Abstraction Layer
//!
//! The pipeline only ever needs "send these role-tagged messages, get text
//! back". `CompletionClient` is that contract; `openai` provides the one
//! implementation shipped with the engine, speaking the OpenAI-compatible
//! chat completions protocol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod openai;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Role of the message sender (system, user, assistant)
    pub role: MessageRole,

    /// Content of the message
    pub content: String,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// Completion client trait that all providers must implement
///
/// One client is built per process and shared by every task.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the name of the provider (e.g., "openai")
    fn name(&self) -> &str;

    /// Generate text for the given conversation
    ///
    /// # Arguments
    /// * `messages` - Ordered, role-tagged conversation
    /// * `model` - Model identifier understood by the provider
    async fn complete(&self, messages: &[Message], model: &str) -> Result<String>;
}

/// Parse model output as JSON.
///
/// The whole (trimmed) text is tried first; failing that, the body of the
/// first markdown code fence. The error from the whole-text attempt is the
/// one reported.
pub fn parse_structured(content: &str) -> std::result::Result<serde_json::Value, serde_json::Error> {
    let trimmed = content.trim();

    match serde_json::from_str(trimmed) {
        Ok(value) => Ok(value),
        Err(err) => match extract_fenced_json(trimmed) {
            Some(inner) => serde_json::from_str(inner.trim()).map_err(|_| err),
            None => Err(err),
        },
    }
}

/// Extract the body of the first markdown code fence in the text.
///
/// Works even when there is trailing prose after the closing ```.
/// Returns `None` if no fenced block is found.
fn extract_fenced_json(content: &str) -> Option<&str> {
    let fence_start = content.find("```")?;
    let after_opening = &content[fence_start + 3..];

    // Skip the language tag line (e.g. "json\n")
    let body_start_rel = after_opening.find('\n')? + 1;
    let body_start = fence_start + 3 + body_start_rel;

    let closing = content[body_start..].find("```")?;
    let body_end = body_start + closing;

    if body_start >= body_end {
        return None;
    }

    Some(&content[body_start..body_end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_creation() {
        let user_msg = Message::user("Hello");
        assert_eq!(user_msg.role, MessageRole::User);
        assert_eq!(user_msg.content, "Hello");

        let system_msg = Message::system("Analyze the site");
        assert_eq!(system_msg.role, MessageRole::System);

        let assistant_msg = Message::assistant("Done");
        assert_eq!(assistant_msg.role.to_string(), "assistant");
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::system("test");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({"role": "system", "content": "test"}));
    }

    #[test]
    fn test_parse_structured_raw() {
        let value = parse_structured("  [\"a\", \"b\"]\n").unwrap();
        assert_eq!(value, json!(["a", "b"]));
    }

    #[test]
    fn test_parse_structured_fenced() {
        let content = "Here you go:\n```json\n{\"keywords\": [\"seo\"]}\n```\nEnjoy!";
        let value = parse_structured(content).unwrap();
        assert_eq!(value, json!({"keywords": ["seo"]}));
    }

    #[test]
    fn test_parse_structured_prose_fails() {
        assert!(parse_structured("not json").is_err());
        assert!(parse_structured("```\n```").is_err());
    }
}

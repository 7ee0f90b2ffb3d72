//! Message model shared across the relay.

use serde::{Deserialize, Serialize};

/// Opaque numeric identifier assigned to a user by the messaging platform.
///
/// Stable for the lifetime of the account; never reused.
pub type UserId = i64;

/// Author of a stored conversation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Storage representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }

    /// Parse a stored role string. Unknown values return `None` so the
    /// caller can surface a corrupt-record error instead of guessing.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            _ => None,
        }
    }
}

/// One immutable entry in a user's conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub role: ChatRole,
    pub content: String,
    /// Write sequence; strictly increasing, orders entries within a user.
    pub seq: i64,
}

impl ConversationEntry {
    /// Prompt-message view of this entry.
    pub fn to_prompt(&self) -> PromptMessage {
        let role = match self.role {
            ChatRole::User => PromptRole::User,
            ChatRole::Assistant => PromptRole::Assistant,
        };
        PromptMessage {
            role,
            content: self.content.clone(),
        }
    }
}

/// Role of a message in a completion prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

impl PromptRole {
    /// Wire representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptRole::System => "system",
            PromptRole::User => "user",
            PromptRole::Assistant => "assistant",
        }
    }
}

/// A message in the prompt sent to the completion API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::Assistant,
            content: content.into(),
        }
    }
}

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// One entry of a conversation. Only `role` and `content` go over the wire;
/// `created_at` is stamped locally when the client itself creates the message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(skip)]
    pub created_at: Option<OffsetDateTime>,
}

impl ChatMessage {
    /// Message without a timestamp, e.g. one that only travels in a request.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: None,
        }
    }

    /// Message created by the client right now.
    pub fn stamped(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Some(OffsetDateTime::now_utc()),
        }
    }

    /// Keep an existing stamp, otherwise stamp with the current time.
    pub fn or_stamped(mut self) -> Self {
        if self.created_at.is_none() {
            self.created_at = Some(OffsetDateTime::now_utc());
        }
        self
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// Ordered run of messages produced by the grouping heuristic.
pub type Conversation = Vec<ChatMessage>;

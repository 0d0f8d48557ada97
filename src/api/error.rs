use thiserror::Error;

/// Failures of a single backend exchange.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The request never completed.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// A response arrived but its body was not the expected JSON.
    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    /// The backend answered with an error status (or an unusable success body).
    #[error("{message}")]
    Backend {
        status: u16,
        message: String,
        hint: Option<String>,
    },
}

impl ChatError {
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        ChatError::Backend {
            status,
            message: message.into(),
            hint: None,
        }
    }

    /// True for errors the backend reported itself, as opposed to transport
    /// or decoding failures.
    pub fn is_backend(&self) -> bool {
        matches!(self, ChatError::Backend { .. })
    }
}

pub type ChatResult<T> = Result<T, ChatError>;

/// Backend API module for gemma-chat
///
/// This module talks to the chat backend over HTTP. Everything the UI needs
/// from the server goes through the [`ChatService`] trait so the session flow
/// can be driven by the real client or an in-memory fake.
///
/// # Architecture
///
/// - `client` - reqwest-backed [`ChatClient`]
/// - `error` - [`ChatError`] and the `ChatResult` alias
///
/// # Usage
///
/// ```rust,no_run
/// use gemma_chat::api::{ChatClient, ChatService};
/// use gemma_chat::config::ClientConfig;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = ChatClient::new(&ClientConfig::from_env()?);
/// let history = client.history().await?;
/// # Ok(())
/// # }
/// ```
mod client;
mod error;

pub use client::ChatClient;
pub use error::{ChatError, ChatResult};

use crate::composer::{Attachment, ChatRequest};
use crate::types::ChatMessage;
use async_trait::async_trait;

/// The backend operations the client consumes.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// `POST /api/chat`; returns the assistant reply text.
    async fn chat(&self, request: &ChatRequest) -> ChatResult<String>;

    /// `GET /api/history`; the full ordered log.
    async fn history(&self) -> ChatResult<Vec<ChatMessage>>;

    /// `POST /api/clear-history`.
    async fn clear_history(&self) -> ChatResult<()>;

    /// `POST /api/upload` as multipart field `file`.
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> ChatResult<Attachment>;

    /// `POST /api/save-conversation`; returns the URL of the exported file.
    async fn save_conversation(
        &self,
        conversation: &[ChatMessage],
        filename: &str,
    ) -> ChatResult<String>;
}

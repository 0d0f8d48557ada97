use super::{ChatError, ChatResult, ChatService};
use crate::composer::{Attachment, ChatReplyBody, ChatRequest, ErrorBody};
use crate::config::ClientConfig;
use crate::types::ChatMessage;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

const ADMIN_TOKEN_HEADER: &str = "X-ADMIN-TOKEN";

/// HTTP client for the chat backend.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
    admin_token: Option<String>,
}

#[derive(Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    history: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct SaveRequest<'a> {
    conversation: &'a [ChatMessage],
    filename: &'a str,
}

#[derive(Deserialize)]
struct SaveResponse {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ChatClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_base_url(&config.api_url, config.admin_token.clone())
    }

    pub fn with_base_url(base_url: &str, admin_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            admin_token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Turn a server-relative URL (e.g. `/exports/x.txt`) into an absolute one.
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_token(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.admin_token {
            Some(token) => request.header(ADMIN_TOKEN_HEADER, token.as_str()),
            None => request,
        }
    }
}

/// Read the body of an error response. Bodies that are not JSON fall back to
/// the status reason.
async fn backend_error(response: Response) -> ChatError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
    ChatError::Backend {
        status: status.as_u16(),
        message: parsed
            .reason()
            .unwrap_or_else(|| status_text(status).to_string()),
        hint: parsed.example_install.filter(|hint| !hint.is_empty()),
    }
}

fn status_text(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("")
}

#[async_trait]
impl ChatService for ChatClient {
    async fn chat(&self, request: &ChatRequest) -> ChatResult<String> {
        tracing::debug!(
            messages = request.messages.len(),
            model = request.model.as_deref().unwrap_or("default"),
            "sending chat request"
        );
        let response = self
            .client
            .post(self.endpoint("/api/chat"))
            .json(request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }
        let body = response.text().await?;
        let parsed: ChatReplyBody = serde_json::from_str(&body)?;
        Ok(parsed.into_text())
    }

    async fn history(&self) -> ChatResult<Vec<ChatMessage>> {
        let response = self
            .with_token(self.client.get(self.endpoint("/api/history")))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }
        let body = response.text().await?;
        let parsed: HistoryResponse = serde_json::from_str(&body)?;
        Ok(parsed.history)
    }

    async fn clear_history(&self) -> ChatResult<()> {
        let response = self
            .with_token(self.client.post(self.endpoint("/api/clear-history")))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(backend_error(response).await)
        }
    }

    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> ChatResult<Attachment> {
        let part = Part::bytes(bytes).file_name(filename.to_string());
        let form = Form::new().part("file", part);
        let response = self
            .client
            .post(self.endpoint("/api/upload"))
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        let value: serde_json::Value = serde_json::from_str(&body)?;
        if !status.is_success() {
            return Err(ChatError::backend(status.as_u16(), status_text(status)));
        }
        match serde_json::from_value::<Attachment>(value) {
            Ok(attachment) if !attachment.filename.is_empty() => Ok(attachment),
            _ => Err(ChatError::backend(
                status.as_u16(),
                "upload response has no filename",
            )),
        }
    }

    async fn save_conversation(
        &self,
        conversation: &[ChatMessage],
        filename: &str,
    ) -> ChatResult<String> {
        let response = self
            .with_token(self.client.post(self.endpoint("/api/save-conversation")))
            .json(&SaveRequest {
                conversation,
                filename,
            })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        let parsed: SaveResponse = serde_json::from_str(&body)?;
        match parsed.url.filter(|url| !url.is_empty()) {
            Some(url) if status.is_success() => Ok(url),
            _ => Err(ChatError::backend(
                status.as_u16(),
                parsed
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| "unknown".to_string()),
            )),
        }
    }
}

//! Integration tests for the session send/upload/history flows
//!
//! The flows are driven the way the chat view drives them: a synchronous
//! `begin_*`, the awaited service call, then `finish_*`.

use async_trait::async_trait;
use gemma_chat::api::{ChatClient, ChatError, ChatResult, ChatService};
use gemma_chat::composer::{Attachment, ChatRequest, HomeworkOptions};
use gemma_chat::session::SessionState;
use gemma_chat::types::{ChatMessage, Role};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// In-memory backend with scripted chat replies.
#[derive(Default)]
struct ScriptedBackend {
    replies: Mutex<VecDeque<ChatResult<String>>>,
    requests: Mutex<Vec<ChatRequest>>,
    log: Vec<ChatMessage>,
}

impl ScriptedBackend {
    fn replying(replies: Vec<ChatResult<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatService for ScriptedBackend {
    async fn chat(&self, request: &ChatRequest) -> ChatResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }

    async fn history(&self) -> ChatResult<Vec<ChatMessage>> {
        Ok(self.log.clone())
    }

    async fn clear_history(&self) -> ChatResult<()> {
        Ok(())
    }

    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> ChatResult<Attachment> {
        let text = String::from_utf8(bytes).ok();
        Ok(Attachment::new(filename, text))
    }

    async fn save_conversation(
        &self,
        _conversation: &[ChatMessage],
        filename: &str,
    ) -> ChatResult<String> {
        Ok(format!("/exports/{filename}-1.txt"))
    }
}

async fn send(
    session: &mut SessionState,
    backend: &dyn ChatService,
    text: &str,
    options: &HomeworkOptions,
) -> bool {
    let Some(pending) = session.begin_send(text, options, "") else {
        return false;
    };
    let result = backend.chat(pending.request()).await;
    session.finish_send(pending, result);
    true
}

fn contents(messages: &[ChatMessage]) -> Vec<(Role, &str)> {
    messages
        .iter()
        .map(|m| (m.role, m.content.as_str()))
        .collect()
}

mod send_tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_reply_appends_one_bubble() {
        let backend = ScriptedBackend::replying(vec![Ok("Hi there".into())]);
        let mut session = SessionState::new("Gemma");
        session.new_chat();

        assert!(send(&mut session, &backend, "Hello", &HomeworkOptions::default()).await);

        let tail = &session.current()[1..];
        assert_eq!(
            contents(tail),
            vec![(Role::User, "Hello"), (Role::Assistant, "Hi there")]
        );
        assert!(tail.iter().all(|m| m.created_at.is_some()));
        assert!(!session.is_sending());
        assert_eq!(session.status(), "");
    }

    #[tokio::test]
    async fn test_blank_input_sends_nothing() {
        let backend = ScriptedBackend::default();
        let mut session = SessionState::new("Gemma");
        let before = session.current().to_vec();

        assert!(!send(&mut session, &backend, "  \t ", &HomeworkOptions::default()).await);

        assert!(backend.requests().is_empty());
        assert_eq!(session.current(), before.as_slice());
    }

    #[tokio::test]
    async fn test_backend_error_renders_error_and_hint() {
        let backend = ScriptedBackend::replying(vec![Err(ChatError::Backend {
            status: 404,
            message: "model not found".into(),
            hint: Some("ollama pull gemma".into()),
        })]);
        let mut session = SessionState::new("Gemma");
        session.finish_upload(Ok(Attachment::new("notes.txt", Some("x".into()))));

        send(&mut session, &backend, "Hi", &HomeworkOptions::default()).await;

        let n = session.current().len();
        assert_eq!(
            contents(&session.current()[n - 2..]),
            vec![
                (Role::Assistant, "Error: model not found"),
                (Role::Assistant, "Try: ollama pull gemma")
            ]
        );
        assert_eq!(
            session.attachment().map(|a| a.filename.as_str()),
            Some("notes.txt")
        );
    }

    #[tokio::test]
    async fn test_homework_fields_add_system_message() {
        let backend = ScriptedBackend::replying(vec![Ok("4".into())]);
        let mut session = SessionState::new("Gemma");
        let options = HomeworkOptions {
            subject: "Math".into(),
            difficulty: String::new(),
            step_by_step: true,
        };

        send(&mut session, &backend, "Solve 2+2", &options).await;

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            contents(&requests[0].messages),
            vec![
                (
                    Role::System,
                    "You are a helpful homework assistant. Subject: Math. Provide step-by-step solutions."
                ),
                (Role::User, "Solve 2+2")
            ]
        );
    }

    #[tokio::test]
    async fn test_attachment_is_consumed_by_successful_send() {
        let backend = ScriptedBackend::replying(vec![Ok("Read it".into()), Ok("Sure".into())]);
        let mut session = SessionState::new("Gemma");

        assert!(session.begin_upload(true));
        let uploaded = backend.upload("notes.txt", b"F = ma".to_vec()).await;
        session.finish_upload(uploaded);
        assert_eq!(
            session.attachment_label().as_deref(),
            Some("Attached: notes.txt")
        );

        send(&mut session, &backend, "Summarize", &HomeworkOptions::default()).await;
        assert!(session.attachment().is_none());

        send(&mut session, &backend, "Again", &HomeworkOptions::default()).await;

        let requests = backend.requests();
        assert_eq!(
            contents(&requests[0].messages),
            vec![
                (Role::User, "Attached file (notes.txt):\nF = ma"),
                (Role::User, "Summarize")
            ]
        );
        assert_eq!(contents(&requests[1].messages), vec![(Role::User, "Again")]);
    }

    #[tokio::test]
    async fn test_replaced_attachment_survives_earlier_send() {
        let backend = ScriptedBackend::replying(vec![Ok("ok".into())]);
        let mut session = SessionState::new("Gemma");
        session.finish_upload(Ok(Attachment::new("first.txt", Some("1".into()))));

        let pending = session
            .begin_send("use it", &HomeworkOptions::default(), "")
            .unwrap();
        session.finish_upload(Ok(Attachment::new("second.txt", Some("2".into()))));
        let result = backend.chat(pending.request()).await;
        assert!(!session.finish_send(pending, result));

        assert_eq!(
            session.attachment().map(|a| a.filename.as_str()),
            Some("second.txt")
        );
    }

    #[tokio::test]
    async fn test_network_error_bubble() {
        let client = ChatClient::with_base_url("http://127.0.0.1:9", None);
        let mut session = SessionState::new("Gemma");

        send(&mut session, &client, "Hi", &HomeworkOptions::default()).await;

        let last = session.current().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert!(last.content.starts_with("Network error: "));
        assert!(!session.is_sending());
    }
}

mod backend_round_trip_tests {
    use super::*;

    #[tokio::test]
    async fn test_error_response_from_server_yields_two_bubbles() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": "model not found",
                "example_install": "ollama pull gemma"
            })))
            .mount(&server)
            .await;
        let client = ChatClient::with_base_url(&server.uri(), None);
        let mut session = SessionState::new("Gemma");
        let before = session.current().len();

        send(&mut session, &client, "Hi", &HomeworkOptions::default()).await;

        let added = &session.current()[before..];
        assert_eq!(
            contents(added),
            vec![
                (Role::User, "Hi"),
                (Role::Assistant, "Error: model not found"),
                (Role::Assistant, "Try: ollama pull gemma")
            ]
        );
    }

    #[tokio::test]
    async fn test_history_load_groups_and_selects() {
        let backend = ScriptedBackend {
            log: vec![
                ChatMessage::user("Explain quantum computing in depth please"),
                ChatMessage::assistant("Qubits..."),
                ChatMessage::assistant("Anything else?"),
            ],
            ..Default::default()
        };
        let mut session = SessionState::new("Gemma");

        let log = backend.history().await.unwrap();
        session.load_history(&log);

        assert_eq!(
            session.sidebar_labels(),
            vec!["Explain quantum computing in depth pleas", "Chat"]
        );
        assert_eq!(session.active(), Some(0));
        assert_eq!(session.status(), "Loaded 3 messages across 2 conversations");
        assert!(session.current().iter().all(|m| m.created_at.is_some()));
    }

    #[tokio::test]
    async fn test_save_after_clear_uses_selected_conversation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/clear-history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/save-conversation"))
            .and(body_partial_json(json!({
                "conversation": [
                    {"role": "user", "content": "a"},
                    {"role": "assistant", "content": "b"}
                ]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"url": "/exports/chat-1.txt"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        let client = ChatClient::with_base_url(&server.uri(), None);
        let mut session = SessionState::new("Gemma");
        session.load_history(&[ChatMessage::user("a"), ChatMessage::assistant("b")]);

        let cleared = client.clear_history().await;
        session.finish_clear_history(cleared);
        send(&mut session, &client, "more", &HomeworkOptions::default()).await;

        let conversation = session.export_conversation("save").unwrap();
        let result = client.save_conversation(&conversation, "chat").await;
        assert_eq!(
            session.finish_save(result).as_deref(),
            Some("/exports/chat-1.txt")
        );
    }

    #[tokio::test]
    async fn test_save_returns_url_for_current_conversation() {
        let backend = ScriptedBackend::default();
        let mut session = SessionState::new("Gemma");

        let conversation = session.export_conversation("save").unwrap();
        let result = backend.save_conversation(&conversation, "chat").await;

        assert_eq!(
            session.finish_save(result).as_deref(),
            Some("/exports/chat-1.txt")
        );
    }
}

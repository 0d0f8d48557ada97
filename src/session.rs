//! Client-side session state.
//!
//! One `SessionState` owns everything the chat view mutates: the grouped
//! conversations, the active selection, the messages on screen, the pending
//! attachment and the in-flight flags. Network work happens outside of it;
//! each async action is split into a synchronous `begin_*` that validates and
//! records intent, and a `finish_*` that folds the outcome back in.

use crate::api::{ChatError, ChatResult};
use crate::composer::{Attachment, ChatRequest, HomeworkOptions};
use crate::conversation::{group_conversations, sidebar_label};
use crate::types::{ChatMessage, Conversation, Role};

/// A send that passed validation and is waiting for the backend.
#[derive(Clone, Debug)]
pub struct PendingSend {
    request: ChatRequest,
    attachment: Option<Attachment>,
}

impl PendingSend {
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    assistant_name: String,
    conversations: Vec<Conversation>,
    active: Option<usize>,
    current: Vec<ChatMessage>,
    attachment: Option<Attachment>,
    sending: bool,
    uploading: bool,
    status: String,
    notice: Option<String>,
    notice_id: u64,
}

impl SessionState {
    pub fn new(assistant_name: impl Into<String>) -> Self {
        let mut state = Self {
            assistant_name: assistant_name.into(),
            conversations: Vec::new(),
            active: None,
            current: Vec::new(),
            attachment: None,
            sending: false,
            uploading: false,
            status: String::new(),
            notice: None,
            notice_id: 0,
        };
        let welcome = format!(
            "Hello — I'm {} (via Ollama). Type a message and press Enter.",
            state.assistant_name
        );
        state.push(Role::Assistant, welcome);
        state
    }

    pub fn assistant_name(&self) -> &str {
        &self.assistant_name
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// The conversation currently on screen, including anything appended
    /// after a stored conversation was selected.
    pub fn current(&self) -> &[ChatMessage] {
        &self.current
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub fn attachment_label(&self) -> Option<String> {
        self.attachment
            .as_ref()
            .map(|attachment| format!("Attached: {}", attachment.filename))
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Identifies the notice on screen. Every `notify` gets a fresh id, even
    /// when the text repeats.
    pub fn notice_id(&self) -> Option<u64> {
        self.notice.as_ref().map(|_| self.notice_id)
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.notice_id += 1;
        self.notice = Some(message.into());
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Dismiss the notice only if it is still notice `id`.
    pub fn dismiss_notice_if(&mut self, id: u64) -> bool {
        if self.notice_id() != Some(id) {
            return false;
        }
        self.notice = None;
        true
    }

    pub fn sidebar_labels(&self) -> Vec<String> {
        self.conversations
            .iter()
            .map(|conversation| sidebar_label(conversation))
            .collect()
    }

    fn push(&mut self, role: Role, content: impl Into<String>) {
        self.current.push(ChatMessage::stamped(role, content));
    }

    // ---------------
    // History and selection
    // ---------------

    /// Replace the conversation list. A selection that falls outside the new
    /// list is dropped.
    pub fn replace_conversations(&mut self, conversations: Vec<Conversation>) {
        self.conversations = conversations;
        if self.active.is_some_and(|index| index >= self.conversations.len()) {
            self.active = None;
        }
    }

    /// Group a freshly fetched log, select the first conversation if there is
    /// one, and report the outcome on the status line.
    pub fn load_history(&mut self, log: &[ChatMessage]) {
        self.replace_conversations(group_conversations(log));
        if self.conversations.is_empty() {
            self.status = "No conversations found".to_string();
        } else {
            self.select(0);
            self.status = format!(
                "Loaded {} messages across {} conversations",
                log.len(),
                self.conversations.len()
            );
        }
    }

    /// Show conversation `index`. Out-of-range indices are ignored. Messages
    /// without a creation time are stamped as they are shown.
    pub fn select(&mut self, index: usize) -> bool {
        let Some(conversation) = self.conversations.get(index) else {
            return false;
        };
        self.current = conversation
            .iter()
            .cloned()
            .map(ChatMessage::or_stamped)
            .collect();
        self.active = Some(index);
        true
    }

    pub fn new_chat(&mut self) {
        self.active = None;
        self.current.clear();
        let welcome = format!("New chat — I'm {}. Type a message.", self.assistant_name);
        self.push(Role::Assistant, welcome);
    }

    pub fn finish_clear_history(&mut self, result: ChatResult<()>) {
        match result {
            Ok(()) => {
                self.current.clear();
                self.push(Role::Assistant, "History cleared.");
            }
            Err(err) if err.is_backend() => {
                tracing::warn!(error = %err, "clear history rejected");
                self.push(Role::Assistant, "Failed to clear history");
            }
            Err(err) => {
                tracing::warn!(error = %err, "clear history failed");
                self.push(Role::Assistant, format!("Failed to clear history: {err}"));
            }
        }
    }

    // ---------------
    // Send flow
    // ---------------

    /// Validate the draft and, if it is sendable, show it and build the
    /// request. Returns `None` for blank drafts or while another send is out.
    pub fn begin_send(
        &mut self,
        draft: &str,
        options: &HomeworkOptions,
        model: &str,
    ) -> Option<PendingSend> {
        let text = draft.trim();
        if text.is_empty() || self.sending {
            return None;
        }

        self.push(Role::User, text);
        self.sending = true;
        self.status = format!("{} is typing...", self.assistant_name);

        let request = ChatRequest::build(text, options, self.attachment.as_ref(), model);
        Some(PendingSend {
            request,
            attachment: self.attachment.clone(),
        })
    }

    /// Fold the backend outcome into the chat. Always re-enables sending.
    /// Returns whether the pending attachment was used up by this send.
    pub fn finish_send(&mut self, pending: PendingSend, result: ChatResult<String>) -> bool {
        let mut consumed = false;
        match result {
            Ok(reply) => {
                self.push(Role::Assistant, reply);
                // The attachment may have been replaced while waiting.
                if pending.attachment.is_some() && self.attachment == pending.attachment {
                    self.attachment = None;
                    consumed = true;
                }
            }
            Err(ChatError::Backend { message, hint, .. }) => {
                tracing::warn!(%message, "chat request rejected");
                self.push(Role::Assistant, format!("Error: {message}"));
                if let Some(hint) = hint {
                    self.push(Role::Assistant, format!("Try: {hint}"));
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat request failed");
                self.push(Role::Assistant, format!("Network error: {err}"));
            }
        }
        self.sending = false;
        self.status.clear();
        consumed
    }

    // ---------------
    // Attachments
    // ---------------

    /// Guard an upload. `has_file` is whether the picker holds a file.
    pub fn begin_upload(&mut self, has_file: bool) -> bool {
        if !has_file {
            self.notify("Select a file first");
            return false;
        }
        if self.uploading {
            return false;
        }
        self.uploading = true;
        true
    }

    pub fn finish_upload(&mut self, result: ChatResult<Attachment>) {
        self.uploading = false;
        match result {
            Ok(attachment) => {
                tracing::info!(filename = %attachment.filename, "file attached");
                self.attachment = Some(attachment);
            }
            Err(err) if err.is_backend() => {
                tracing::warn!(error = %err, "upload rejected");
                self.notify("Upload failed");
            }
            Err(err) => {
                tracing::warn!(error = %err, "upload failed");
                self.notify(format!("Upload failed: {err}"));
            }
        }
    }

    pub fn clear_attachment(&mut self) {
        self.attachment = None;
    }

    // ---------------
    // Export
    // ---------------

    /// Conversation to download or save: the selected one if there is a
    /// selection, else the messages on screen. Sets a notice when there is
    /// nothing to export; `action` names the verb in it.
    pub fn export_conversation(&mut self, action: &str) -> Option<Vec<ChatMessage>> {
        let conversation = match self.active.and_then(|i| self.conversations.get(i)) {
            Some(selected) => selected.clone(),
            None => self.current.clone(),
        };
        if conversation.is_empty() {
            self.notify(format!("No conversation to {action}"));
            return None;
        }
        Some(conversation)
    }

    /// Returns the URL to open on success.
    pub fn finish_save(&mut self, result: ChatResult<String>) -> Option<String> {
        match result {
            Ok(url) => {
                tracing::info!(%url, "conversation saved on server");
                Some(url)
            }
            Err(err) => {
                tracing::warn!(error = %err, "save to server failed");
                self.notify(format!("Save failed: {err}"));
                None
            }
        }
    }
}

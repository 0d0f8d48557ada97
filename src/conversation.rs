//! Regrouping of the flat history log into conversations.
//!
//! The backend stores one ordered log without conversation ids, so the client
//! infers boundaries: a conversation ends right after each assistant reply.

use crate::types::{ChatMessage, Conversation};

pub const SIDEBAR_LABEL_CHARS: usize = 40;
pub const FALLBACK_LABEL: &str = "Chat";

/// Split `log` after every assistant message. A trailing run without an
/// assistant reply becomes the last conversation.
pub fn group_conversations(log: &[ChatMessage]) -> Vec<Conversation> {
    let mut conversations = Vec::new();
    let mut current = Vec::new();
    for msg in log {
        current.push(msg.clone());
        if msg.is_assistant() {
            conversations.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        conversations.push(current);
    }
    conversations
}

/// Sidebar text: first user message cut to 40 characters, or "Chat".
pub fn sidebar_label(conversation: &[ChatMessage]) -> String {
    conversation
        .iter()
        .find(|msg| msg.is_user())
        .map(|msg| msg.content.chars().take(SIDEBAR_LABEL_CHARS).collect())
        .unwrap_or_else(|| FALLBACK_LABEL.to_string())
}

use crate::types::ChatMessage;
use serde::{Deserialize, Serialize};

const HOMEWORK_PREAMBLE: &str = "You are a helpful homework assistant.";

/// Homework-assistant fields shown above the composer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HomeworkOptions {
    pub subject: String,
    pub difficulty: String,
    pub step_by_step: bool,
}

impl HomeworkOptions {
    /// Synthesized system instruction, or `None` when no field is set.
    pub fn system_instruction(&self) -> Option<String> {
        let subject = self.subject.trim();
        let difficulty = self.difficulty.trim();
        if subject.is_empty() && difficulty.is_empty() && !self.step_by_step {
            return None;
        }

        let mut instruction = HOMEWORK_PREAMBLE.to_string();
        if !subject.is_empty() {
            instruction.push_str(&format!(" Subject: {subject}."));
        }
        if !difficulty.is_empty() {
            instruction.push_str(&format!(" Difficulty: {difficulty}."));
        }
        if self.step_by_step {
            instruction.push_str(" Provide step-by-step solutions.");
        }
        Some(instruction)
    }
}

/// Server-processed upload waiting to be sent with the next message.
/// Keeps the whole upload response, not just the fields the client reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, text: Option<String>) -> Self {
        Self {
            filename: filename.into(),
            text,
            extra: serde_json::Map::new(),
        }
    }

    /// Prior user message carrying the file's text, if it has any.
    pub fn as_message(&self) -> Option<ChatMessage> {
        let text = self.text.as_deref().filter(|t| !t.is_empty())?;
        Some(ChatMessage::user(format!(
            "Attached file ({}):\n{}",
            self.filename, text
        )))
    }
}

/// Body of `POST /api/chat`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ChatRequest {
    /// Assemble the outgoing messages: optional homework instruction, optional
    /// attachment text, then the user's own message.
    pub fn build(
        text: &str,
        options: &HomeworkOptions,
        attachment: Option<&Attachment>,
        model: &str,
    ) -> Self {
        let mut messages = Vec::with_capacity(3);
        if let Some(instruction) = options.system_instruction() {
            messages.push(ChatMessage::system(instruction));
        }
        if let Some(prior) = attachment.and_then(Attachment::as_message) {
            messages.push(prior);
        }
        messages.push(ChatMessage::user(text));

        let model = model.trim();
        Self {
            messages,
            model: (!model.is_empty()).then(|| model.to_string()),
        }
    }
}

/// Success body of `POST /api/chat`.
#[derive(Debug, Default, Deserialize)]
pub struct ChatReplyBody {
    #[serde(default)]
    pub assistant: Option<String>,
    #[serde(default)]
    pub raw_response: Option<serde_json::Value>,
}

impl ChatReplyBody {
    /// The reply text, falling back to the serialized raw backend response.
    /// Empty raw values (`null`, `false`, `0`, `""`) give an empty reply.
    pub fn into_text(self) -> String {
        if let Some(text) = self.assistant.filter(|t| !t.is_empty()) {
            return text;
        }
        match self.raw_response {
            Some(raw) if !is_empty_value(&raw) => raw.to_string(),
            _ => String::new(),
        }
    }
}

fn is_empty_value(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Error body shared by the backend routes.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub example_install: Option<String>,
}

impl ErrorBody {
    /// `message`, then `error`, ignoring empty strings.
    pub fn reason(&self) -> Option<String> {
        self.message
            .iter()
            .chain(self.error.iter())
            .find(|s| !s.is_empty())
            .cloned()
    }
}

use crate::transcript;
use crate::types::ChatMessage;
use comrak::plugins::syntect::SyntectAdapter;
use comrak::{ComrakOptions, ComrakPlugins, markdown_to_html_with_plugins};
use dioxus::prelude::*;
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

static MARKDOWN_OPTIONS: Lazy<ComrakOptions> = Lazy::new(|| {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options
});

const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] = format_description!(
    "[hour repr:12 padding:zero]:[minute padding:zero]:[second padding:zero] [period case:upper]"
);

const SCROLL_CHAT_JS: &str =
    "const el = document.getElementById('chat'); if (el) { el.scrollTop = el.scrollHeight; }";

const RESET_FILE_INPUT_JS: &str =
    "const el = document.getElementById('fileInput'); if (el) { el.value = ''; }";

pub fn markdown_to_html(md: &str) -> String {
    let adapter = SyntectAdapter::new(Some("base16-ocean.dark"));
    let mut plugins = ComrakPlugins::default();
    plugins.render.codefence_syntax_highlighter = Some(&adapter);
    markdown_to_html_with_plugins(md, &MARKDOWN_OPTIONS, &plugins)
}

pub fn format_message_timestamp(timestamp: Option<OffsetDateTime>) -> Option<String> {
    let mut datetime = timestamp?;
    if let Ok(offset) = UtcOffset::current_local_offset() {
        datetime = datetime.to_offset(offset);
    }
    datetime.format(MESSAGE_TIME_FORMAT).ok()
}

pub fn scroll_chat_to_bottom() {
    let _ = document::eval(SCROLL_CHAT_JS);
}

/// Empty the file picker once its file went out with a message.
pub fn reset_file_input() {
    let _ = document::eval(RESET_FILE_INPUT_JS);
}

/// Open `url` in a new browsing context.
pub fn open_in_new_context(url: &str) {
    match serde_json::to_string(url) {
        Ok(quoted) => {
            let _ = document::eval(&format!("window.open({quoted}, '_blank');"));
        }
        Err(err) => tracing::warn!(error = %err, "could not encode url"),
    }
}

/// Offer the transcript as `<name>.txt`. Native builds write into `dir` and
/// return the written path; web builds hand the file to the browser.
#[cfg(not(target_arch = "wasm32"))]
pub fn offer_download(
    dir: &Path,
    name: &str,
    conversation: &[ChatMessage],
) -> anyhow::Result<Option<PathBuf>> {
    transcript::write_transcript(dir, name, conversation).map(Some)
}

#[cfg(target_arch = "wasm32")]
pub fn offer_download(
    _dir: &Path,
    name: &str,
    conversation: &[ChatMessage],
) -> anyhow::Result<Option<PathBuf>> {
    let text = serde_json::to_string(&transcript::format_transcript(conversation))?;
    let filename = serde_json::to_string(&transcript::download_filename(name))?;
    let script = format!(
        r#"const blob = new Blob([{text}], {{ type: 'text/plain;charset=utf-8' }});
const url = URL.createObjectURL(blob);
const a = document.createElement('a');
a.href = url;
a.download = {filename};
document.body.appendChild(a);
a.click();
a.remove();
URL.revokeObjectURL(url);"#
    );
    let _ = document::eval(&script);
    Ok(None)
}

#[component]
pub fn Bubble(message: ChatMessage) -> Element {
    let role = message.role.as_str();
    let stamp = format_message_timestamp(message.created_at);
    rsx! {
        li { class: "bubble {role}",
            if message.is_user() {
                div { class: "body", "{message.content}" }
            } else {
                AssistantBody { content: message.content.clone() }
            }
            if let Some(ts) = stamp {
                div { class: "meta", "{ts}" }
            }
        }
    }
}

#[component]
fn AssistantBody(content: String) -> Element {
    let content_html = markdown_to_html(&content);
    let copy_payload = content.clone();
    let on_copy = move |_: MouseEvent| {
        let raw = copy_payload.clone();
        spawn(async move {
            #[cfg(all(
                not(target_arch = "wasm32"),
                any(feature = "desktop", feature = "mobile")
            ))]
            {
                if let Ok(mut cb) = arboard::Clipboard::new() {
                    let _ = cb.set_text(raw);
                }
            }
            #[cfg(not(all(
                not(target_arch = "wasm32"),
                any(feature = "desktop", feature = "mobile")
            )))]
            {
                let _ = raw;
            }
        });
    };

    rsx! {
        div { class: "body md", dangerous_inner_html: "{content_html}" }
        if !content.is_empty() {
            div { class: "bubble-controls",
                button { class: "action-btn", title: "Copy markdown", onclick: on_copy, "Copy" }
            }
        }
    }
}

use crate::types::{ChatMessage, Role};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_FILENAME: &str = "conversation";

/// Plain-text transcript: one `User: ` / `Assistant: ` line per message.
pub fn format_transcript(conversation: &[ChatMessage]) -> String {
    conversation
        .iter()
        .map(|msg| {
            let prefix = match msg.role {
                Role::User => "User: ",
                _ => "Assistant: ",
            };
            format!("{prefix}{}", msg.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The name typed by the user, or the default when it is blank.
pub fn requested_name(input: &str) -> &str {
    match input.trim() {
        "" => DEFAULT_FILENAME,
        name => name,
    }
}

/// Sanitize a user-supplied name for use as a single path component
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .take(64)
        .collect()
}

/// `<name>.txt` for a requested download name.
pub fn download_filename(input: &str) -> String {
    format!("{}.txt", sanitize_filename(requested_name(input)))
}

/// Write a transcript into `dir`, creating it if needed.
pub fn write_transcript(dir: &Path, input: &str, conversation: &[ChatMessage]) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create download directory {}", dir.display()))?;
    let path = dir.join(download_filename(input));
    fs::write(&path, format_transcript(conversation))
        .with_context(|| format!("Failed to write transcript {}", path.display()))?;
    Ok(path)
}

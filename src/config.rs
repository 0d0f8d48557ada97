use anyhow::{Result, bail};
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_ASSISTANT_NAME: &str = "Gemma";

/// Runtime settings, read from the environment once at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub model: String,
    pub assistant_name: String,
    pub admin_token: Option<String>,
    pub download_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: String::new(),
            assistant_name: DEFAULT_ASSISTANT_NAME.to_string(),
            admin_token: None,
            download_dir: default_download_dir(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_url = get("CHAT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            bail!("CHAT_API_URL must be an http(s) URL, got '{api_url}'");
        }

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            model: get("CHAT_MODEL").unwrap_or_default(),
            assistant_name: get("CHAT_ASSISTANT_NAME")
                .unwrap_or_else(|| DEFAULT_ASSISTANT_NAME.to_string()),
            admin_token: get("CHAT_ADMIN_TOKEN"),
            download_dir: get("CHAT_DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_download_dir),
        })
    }
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("exports"))
}

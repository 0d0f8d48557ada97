use crate::api::{ChatClient, ChatService};
use crate::config::ClientConfig;
use crate::session::SessionState;
use crate::views::ChatView;
use dioxus::prelude::*;
use once_cell::sync::OnceCell;
use std::time::Duration;

const CHAT_CSS: Asset = asset!("/assets/chat.css");
const NOTICE_HIDE_DELAY: Duration = Duration::from_secs(4);

static CONFIG: OnceCell<ClientConfig> = OnceCell::new();

/// Hand the startup configuration to the UI. Only the first call wins.
pub fn install_config(config: ClientConfig) {
    if CONFIG.set(config).is_err() {
        tracing::warn!("client config already installed");
    }
}

fn installed_config() -> ClientConfig {
    CONFIG.get().cloned().unwrap_or_default()
}

#[component]
pub fn App() -> Element {
    let config = use_hook(installed_config);
    let session = use_signal(|| SessionState::new(config.assistant_name.clone()));
    let client = use_signal(|| ChatClient::new(&config));

    use_history_load(session, client);
    use_notice_dismiss(session);

    rsx! {
        document::Link { rel: "stylesheet", href: CHAT_CSS }
        AppHeader { name: config.assistant_name.clone() }
        NoticeBanner { session }
        ChatView {
            session,
            client,
            initial_model: config.model.clone(),
            download_dir: config.download_dir.clone(),
        }
    }
}

/// Fetch the history log once on mount. Failures leave the welcome bubble.
fn use_history_load(session: Signal<SessionState>, client: Signal<ChatClient>) {
    use_future(move || {
        let mut session = session;
        async move {
            match client().history().await {
                Ok(log) => {
                    tracing::info!(messages = log.len(), "history loaded");
                    session.with_mut(|s| s.load_history(&log));
                }
                Err(err) => tracing::warn!(error = %err, "history load failed"),
            }
        }
    });
}

/// Hide each notice after a delay. The timer belongs to one notice id, so a
/// repeated text shown later keeps its own full delay.
fn use_notice_dismiss(session: Signal<SessionState>) {
    let shown = use_memo(move || session.read().notice_id());
    use_effect(move || {
        let Some(id) = shown() else {
            return;
        };
        let mut control = session;
        spawn(async move {
            tokio::time::sleep(NOTICE_HIDE_DELAY).await;
            control.with_mut(|s| s.dismiss_notice_if(id));
        });
    });
}

#[component]
fn AppHeader(name: String) -> Element {
    rsx! {
        div { class: "header no-divider",
            div { class: "header-content",
                h1 { class: "header-title", "{name} Chat" }
            }
        }
    }
}

#[component]
fn NoticeBanner(session: Signal<SessionState>) -> Element {
    let mut session = session;
    let notice = session.read().notice().map(str::to_string);
    rsx! {
        if let Some(text) = notice {
            div { class: "notice", role: "alert",
                span { "{text}" }
                button {
                    class: "action-btn", r#type: "button",
                    onclick: move |_| session.with_mut(|s| s.dismiss_notice()),
                    "Dismiss"
                }
            }
        }
    }
}

use crate::api::{ChatClient, ChatService};
use crate::composer::HomeworkOptions;
use crate::session::SessionState;
use crate::transcript::{DEFAULT_FILENAME, requested_name};
use crate::views::shared::{
    Bubble, offer_download, open_in_new_context, reset_file_input, scroll_chat_to_bottom,
};
use dioxus::events::Key;
use dioxus::prelude::*;
use std::path::PathBuf;

const DIFFICULTIES: &[(&str, &str)] = &[
    ("", "Any difficulty"),
    ("Beginner", "Beginner"),
    ("Intermediate", "Intermediate"),
    ("Advanced", "Advanced"),
];

/// File chosen in the picker but not uploaded yet.
#[derive(Clone, Debug, PartialEq)]
struct PickedFile {
    name: String,
    bytes: Vec<u8>,
}

#[component]
pub fn ChatView(
    session: Signal<SessionState>,
    client: Signal<ChatClient>,
    initial_model: String,
    download_dir: PathBuf,
) -> Element {
    let mut draft = use_signal(String::new);
    let model = use_signal(|| initial_model.clone());
    let homework = use_signal(HomeworkOptions::default);
    let mut picked = use_signal(|| Option::<PickedFile>::None);

    use_effect(move || {
        let _ = session.read().current().len();
        scroll_chat_to_bottom();
    });

    let mut send_message = {
        let mut session = session;
        let mut draft_signal = draft;
        move |text: String| {
            let options = homework();
            let model_name = model();
            let Some(pending) = session.with_mut(|s| s.begin_send(&text, &options, &model_name))
            else {
                return;
            };
            draft_signal.set(String::new());

            spawn(async move {
                let api = client();
                let result = api.chat(pending.request()).await;
                if session.with_mut(|s| s.finish_send(pending, result)) {
                    picked.set(None);
                    reset_file_input();
                }
            });
        }
    };

    let snapshot = session.read();
    let messages = snapshot.current().to_vec();
    let sending = snapshot.is_sending();
    let status = snapshot.status().to_string();
    drop(snapshot);

    rsx! {
        div { class: "main-container",
            Sidebar { session, client }
            div { class: "chat-wrap",
                ul { id: "chat", class: "chat-list",
                    for (i, msg) in messages.into_iter().enumerate() {
                        Bubble { key: "{i}", message: msg }
                    }
                }
                div { id: "status", class: "status-line", "{status}" }
                HomeworkPanel { homework }
                form { class: "composer no-divider",
                    onsubmit: move |ev| {
                        ev.prevent_default();
                        let text = draft();
                        send_message(text);
                    },
                    div { class: "composer-inner",
                        div { class: "hstack",
                            textarea {
                                rows: "1", placeholder: "Type a message…",
                                value: "{draft}", oninput: move |ev| draft.set(ev.value()),
                                onkeydown: move |ev| {
                                    if ev.key() == Key::Enter && !ev.modifiers().shift() {
                                        ev.prevent_default();
                                        let text = draft();
                                        send_message(text);
                                    }
                                },
                                autofocus: true,
                            }
                            ModelField { model }
                            button {
                                class: "btn btn-primary", r#type: "submit",
                                disabled: sending,
                                "Send"
                            }
                        }
                    }
                }
                Toolbar { session, client, picked, download_dir }
            }
        }
    }
}

#[component]
fn Sidebar(session: Signal<SessionState>, client: Signal<ChatClient>) -> Element {
    let mut session = session;
    let snapshot = session.read();
    let labels = snapshot.sidebar_labels();
    let active = snapshot.active();
    drop(snapshot);

    rsx! {
        aside { class: "sidebar",
            div { class: "sidebar-actions",
                button {
                    class: "btn btn-ghost", r#type: "button",
                    onclick: move |_| session.with_mut(|s| s.new_chat()),
                    "New chat"
                }
                ClearHistoryButton { session, client }
            }
            div { id: "conversations", class: "conversations",
                for (i, label) in labels.into_iter().enumerate() {
                    div {
                        key: "{i}",
                        class: format_args!(
                            "conversation-item {}",
                            if active == Some(i) { "active" } else { "" }
                        ),
                        onclick: move |_| {
                            session.with_mut(|s| s.select(i));
                        },
                        "{label}"
                    }
                }
            }
        }
    }
}

#[component]
fn ClearHistoryButton(session: Signal<SessionState>, client: Signal<ChatClient>) -> Element {
    let mut session = session;
    rsx! {
        button {
            class: "btn btn-ghost", r#type: "button",
            onclick: move |_| {
                spawn(async move {
                    let result = client().clear_history().await;
                    session.with_mut(|s| s.finish_clear_history(result));
                });
            },
            "Clear history"
        }
    }
}

#[component]
fn ModelField(model: Signal<String>) -> Element {
    let mut model = model;
    rsx! {
        input {
            class: "model-input", r#type: "text", placeholder: "Model (optional)",
            value: "{model}", oninput: move |ev| model.set(ev.value()),
        }
    }
}

#[component]
fn HomeworkPanel(homework: Signal<HomeworkOptions>) -> Element {
    let mut homework = homework;
    let current = homework();
    rsx! {
        div { class: "homework-panel",
            input {
                r#type: "text", placeholder: "Subject",
                value: "{current.subject}",
                oninput: move |ev| homework.with_mut(|h| h.subject = ev.value()),
            }
            select {
                value: "{current.difficulty}",
                onchange: move |ev| homework.with_mut(|h| h.difficulty = ev.value()),
                for (value, label) in DIFFICULTIES.iter().copied() {
                    option { value: "{value}", selected: current.difficulty == value, "{label}" }
                }
            }
            label { class: "checkbox",
                input {
                    r#type: "checkbox",
                    checked: current.step_by_step,
                    onchange: move |_| homework.with_mut(|h| h.step_by_step = !h.step_by_step),
                }
                "Step-by-step"
            }
        }
    }
}

#[component]
fn Toolbar(
    session: Signal<SessionState>,
    client: Signal<ChatClient>,
    picked: Signal<Option<PickedFile>>,
    download_dir: PathBuf,
) -> Element {
    let mut session = session;
    let mut picked = picked;
    let mut filename = use_signal(|| DEFAULT_FILENAME.to_string());

    let on_pick = move |ev: FormEvent| {
        spawn(async move {
            let mut chosen = None;
            if let Some(engine) = ev.files()
                && let Some(name) = engine.files().into_iter().next()
                && let Some(bytes) = engine.read_file(&name).await
            {
                chosen = Some(PickedFile { name, bytes });
            }
            if chosen.is_none() {
                session.with_mut(|s| s.clear_attachment());
            }
            picked.set(chosen);
        });
    };

    let on_upload = move |_: MouseEvent| {
        let file = picked();
        if !session.with_mut(|s| s.begin_upload(file.is_some())) {
            return;
        }
        let Some(file) = file else {
            return;
        };
        spawn(async move {
            let result = client().upload(&file.name, file.bytes).await;
            session.with_mut(|s| s.finish_upload(result));
        });
    };

    let on_download = move |_: MouseEvent| {
        let Some(conversation) = session.with_mut(|s| s.export_conversation("download")) else {
            return;
        };
        match offer_download(&download_dir, &filename(), &conversation) {
            Ok(Some(path)) => {
                tracing::info!(path = %path.display(), "transcript downloaded");
                session.with_mut(|s| s.notify(format!("Saved to {}", path.display())));
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "transcript download failed");
                session.with_mut(|s| s.notify(format!("Download failed: {err}")));
            }
        }
    };

    let on_save = move |_: MouseEvent| {
        let Some(conversation) = session.with_mut(|s| s.export_conversation("save")) else {
            return;
        };
        let name = requested_name(&filename()).to_string();
        spawn(async move {
            let api = client();
            let result = api.save_conversation(&conversation, &name).await;
            if let Some(url) = session.with_mut(|s| s.finish_save(result)) {
                open_in_new_context(&api.resolve_url(&url));
            }
        });
    };

    let snapshot = session.read();
    let attached = snapshot.attachment_label().unwrap_or_default();
    let uploading = snapshot.is_uploading();
    drop(snapshot);

    rsx! {
        div { class: "toolbar",
            div { class: "attach",
                input { id: "fileInput", r#type: "file", onchange: on_pick }
                button {
                    class: "btn btn-ghost", r#type: "button",
                    disabled: uploading,
                    onclick: on_upload,
                    "Upload"
                }
                span { id: "attachedFile", class: "attached", "{attached}" }
            }
            div { class: "export",
                input {
                    r#type: "text", placeholder: "Filename",
                    value: "{filename}", oninput: move |ev| filename.set(ev.value()),
                }
                button { class: "btn btn-ghost", r#type: "button", onclick: on_download, "Download" }
                button { class: "btn btn-ghost", r#type: "button", onclick: on_save, "Save to server" }
            }
        }
    }
}

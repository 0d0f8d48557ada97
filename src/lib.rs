pub mod api;
pub mod composer;
pub mod config;
pub mod conversation;
pub mod session;
pub mod transcript;
pub mod types;

#[cfg(feature = "dioxus")]
pub mod ui;
#[cfg(feature = "dioxus")]
pub mod views;

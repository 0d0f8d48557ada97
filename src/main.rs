use gemma_chat::config::ClientConfig;

/// Bundled config for builds without a .env file (mobile, web)
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

#[cfg(not(target_arch = "wasm32"))]
fn load_dotenv() {
    // First try to load from .env file (desktop dev)
    if dotenvy::dotenv().is_ok() {
        return;
    }

    // Fall back to bundled config
    load_bundled_config();
}

#[cfg(target_arch = "wasm32")]
fn load_dotenv() {
    load_bundled_config();
}

fn load_bundled_config() {
    for (key, value) in parse_env_lines(BUNDLED_CONFIG) {
        // Only set if not already set (allow env override)
        if std::env::var(key).is_err() {
            // SAFETY: We're setting env vars at startup before any threads are spawned
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
}

/// `KEY=VALUE` pairs, skipping comments and blank lines.
fn parse_env_lines(source: &str) -> impl Iterator<Item = (&str, &str)> {
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
}

#[cfg(not(target_arch = "wasm32"))]
fn init_tracing() {
    let level = if cfg!(debug_assertions) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
}

#[cfg(target_arch = "wasm32")]
fn init_tracing() {}

fn main() {
    load_dotenv();
    init_tracing();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err:#}");
            std::process::exit(2);
        }
    };
    tracing::info!(api_url = %config.api_url, "starting chat client");
    gemma_chat::ui::install_config(config);

    dioxus::launch(gemma_chat::ui::App);
}

//! Telegram Bot API channel.
//!
//! Uses long polling via `getUpdates` and `sendMessage` for responses.
//! Docs: <https://core.telegram.org/bots/api>

mod polling;
mod send;
mod types;


use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use steamwire_core::config::TelegramConfig;
use tokio::sync::Mutex;

/// Telegram channel using the Bot API with long polling.
pub struct TelegramChannel {
    config: TelegramConfig,
    client: reqwest::Client,
    base_url: String,
    /// Tracks the last update_id to avoid reprocessing.
    last_update_id: Arc<Mutex<Option<i64>>>,
    /// Set by `stop()`; the poll loop exits at its next iteration.
    stopped: Arc<AtomicBool>,
}

impl TelegramChannel {
    /// Create a new Telegram channel from config, sharing the process HTTP session.
    pub fn new(config: TelegramConfig, client: reqwest::Client) -> Self {
        let base_url = format!("https://api.telegram.org/bot{}", config.bot_token);
        Self {
            config,
            client,
            base_url,
            last_update_id: Arc::new(Mutex::new(None)),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }
}

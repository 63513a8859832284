//! Message sending: text, chat actions, and command registration.

use super::TelegramChannel;
use crate::utils::split_message;
use serde_json::{json, Value};
use steamwire_core::error::SteamwireError;
use tracing::{info, warn};

/// Telegram's hard limit on message length, in characters.
const MAX_MESSAGE_CHARS: usize = 4096;

/// `sendMessage` payload. Link previews are only shown on the last part,
/// which is where a news reply carries its article link.
pub(super) fn message_body(chat_id: i64, text: &str, markdown: bool, last: bool) -> Value {
    let mut body = json!({
        "chat_id": chat_id,
        "text": text,
        "disable_web_page_preview": !last,
    });
    if markdown {
        body["parse_mode"] = json!("Markdown");
    }
    body
}

/// Telegram rejected the Markdown markup rather than the message.
pub(super) fn is_markup_rejection(error_text: &str) -> bool {
    error_text.contains("can't parse entities")
}

impl TelegramChannel {
    /// Send `text` to `chat_id`, split into Telegram-sized parts.
    ///
    /// Each part goes out as Markdown first. Article text is not ours and
    /// stray `_` or `*` break the markup, so a rejected part is resent plain.
    pub(crate) async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), SteamwireError> {
        let parts = split_message(text, MAX_MESSAGE_CHARS);
        let total = parts.len();

        for (i, part) in parts.into_iter().enumerate() {
            let last = i + 1 == total;
            match self.post_message(chat_id, part, true, last).await? {
                None => {}
                Some(error_text) if is_markup_rejection(&error_text) => {
                    warn!("markdown rejected for part {}/{total}, resending plain", i + 1);
                    let plain = self.post_message(chat_id, part, false, last).await?;
                    if let Some(error_text) = plain {
                        return Err(SteamwireError::Channel(format!(
                            "telegram send (plain) failed: {error_text}"
                        )));
                    }
                }
                Some(error_text) => {
                    return Err(SteamwireError::Channel(format!(
                        "telegram send failed: {error_text}"
                    )));
                }
            }
        }

        Ok(())
    }

    /// POST one `sendMessage`. `Ok(Some(text))` carries the API's error body.
    async fn post_message(
        &self,
        chat_id: i64,
        text: &str,
        markdown: bool,
        last: bool,
    ) -> Result<Option<String>, SteamwireError> {
        let resp = self
            .client
            .post(format!("{}/sendMessage", self.base_url))
            .json(&message_body(chat_id, text, markdown, last))
            .send()
            .await
            .map_err(|e| SteamwireError::Channel(format!("telegram send failed: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(None);
        }
        let error_text = resp.text().await.unwrap_or_default();
        Ok(Some(format!("{status}: {error_text}")))
    }

    /// Send a chat action (e.g. "typing") indicator.
    pub(crate) async fn send_chat_action(
        &self,
        chat_id: i64,
        action: &str,
    ) -> Result<(), SteamwireError> {
        let url = format!("{}/sendChatAction", self.base_url);
        let body = json!({
            "chat_id": chat_id,
            "action": action,
        });

        self.client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SteamwireError::Channel(format!("telegram sendChatAction failed: {e}")))?;

        Ok(())
    }

    /// Register bot commands with Telegram so users see an autocomplete menu.
    /// Best-effort: logs failures but does not propagate errors.
    pub(crate) async fn register_commands(&self) {
        let commands = json!({
            "commands": [
                { "command": "steam_news", "description": "Latest Steam news for a game, translated" },
                { "command": "help", "description": "How to use the bot" },
            ]
        });

        let url = format!("{}/setMyCommands", self.base_url);
        match self.client.post(&url).json(&commands).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("Telegram bot commands registered");
            }
            Ok(resp) => {
                let text = resp.text().await.unwrap_or_default();
                warn!("Telegram setMyCommands failed: {text}");
            }
            Err(e) => {
                warn!("Telegram setMyCommands request failed: {e}");
            }
        }
    }
}

use std::time::Duration;
use thiserror::Error;

/// Top-level error type for Steamwire.
#[derive(Debug, Error)]
pub enum SteamwireError {
    /// Error from a messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

/// Why a news command did not produce (fully) translated content.
///
/// The `Display` form is for logs. Users only ever see [`CommandError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Malformed command; never reaches the network.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The sender is still cooling down.
    #[error("cooldown: {remaining:?} remaining")]
    Cooldown { remaining: Duration },

    /// Unsupported or disabled target language code.
    #[error("invalid language: {0}")]
    InvalidLanguage(String),

    /// The catalog had no match for the searched term.
    #[error("game not found: {0}")]
    GameNotFound(String),

    /// The game exists but has no news.
    #[error("no news available for {0}")]
    NoNewsAvailable(String),

    /// Catalog search or news failed after retry.
    #[error("catalog unavailable")]
    CatalogUnavailable,

    /// Translation failed; content is still delivered untranslated.
    #[error("translation unavailable")]
    TranslationUnavailable,
}

impl CommandError {
    /// Remaining cooldown in whole seconds, rounded up.
    pub fn remaining_secs(&self) -> Option<u64> {
        match self {
            Self::Cooldown { remaining } => Some(ceil_secs(*remaining)),
            _ => None,
        }
    }

    /// Concise, human-readable message sent back to the chat.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(hint) => format!("❌ {hint}"),
            Self::Cooldown { remaining } => format!(
                "⏰ Please wait {} seconds before using this command again.",
                ceil_secs(*remaining)
            ),
            Self::InvalidLanguage(code) => {
                format!("❌ Unsupported language '{code}'. Use `!help-steam` for the list.")
            }
            Self::GameNotFound(term) => {
                format!("❌ Could not find a game named '{term}' on Steam.")
            }
            Self::NoNewsAvailable(game) => format!("📭 No recent news found for '{game}'."),
            Self::CatalogUnavailable => {
                "❌ Steam is currently unavailable. Please try again later.".to_string()
            }
            Self::TranslationUnavailable => {
                "⚠️ Translation is currently unavailable, showing the original article."
                    .to_string()
            }
        }
    }
}

fn ceil_secs(d: Duration) -> u64 {
    let secs = d.as_secs();
    if d.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

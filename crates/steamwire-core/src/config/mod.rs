mod channels;
mod defaults;

#[cfg(test)]
mod tests;

pub use channels::*;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::error::SteamwireError;
use crate::language::Language;
use defaults::*;

/// Most articles a single command may fetch.
pub const MAX_NEWS_COUNT: usize = 3;

/// Window over which `translation.max_per_minute` is counted.
pub const TRANSLATION_QUOTA_WINDOW: Duration = Duration::from_secs(60);

/// Top-level Steamwire configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub command: CommandConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
}

/// Deployment profile, selects a bundle of overrides.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Default,
    Development,
    Production,
}

impl Environment {
    /// Parse a profile name; unknown names fall back to `Default`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            "production" | "prod" => Self::Production,
            _ => Self::Default,
        }
    }
}

/// General bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory for the rolling log file. Empty = console only.
    #[serde(default)]
    pub log_dir: String,
    #[serde(default)]
    pub environment: Environment,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            log_dir: String::new(),
            environment: Environment::Default,
        }
    }
}

/// News command settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Prefix for text commands (`!steam-news`).
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Minimum seconds between two commands from the same user.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Articles fetched and delivered per command, at most [`MAX_NEWS_COUNT`].
    #[serde(default = "default_news_count")]
    pub news_count: usize,
    /// Article bodies are cut to this many characters before translation.
    #[serde(default = "default_max_body_chars")]
    pub max_body_chars: usize,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            cooldown_secs: default_cooldown_secs(),
            news_count: default_news_count(),
            max_body_chars: default_max_body_chars(),
        }
    }
}

impl CommandConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

/// Steam catalog upstream settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_search_url")]
    pub search_url: String,
    #[serde(default = "default_news_url")]
    pub news_url: String,
    #[serde(default = "default_app_list_url")]
    pub app_list_url: String,
    /// Store search language (`l` parameter).
    #[serde(default = "default_store_language")]
    pub language: String,
    /// Store search country (`cc` parameter).
    #[serde(default = "default_country")]
    pub country: String,
    /// Minimum milliseconds between two catalog requests.
    #[serde(default = "default_catalog_pacing_ms")]
    pub pacing_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// `maxlength` requested from the news endpoint.
    #[serde(default = "default_news_max_length")]
    pub max_length: u32,
    /// Scan the full app list when store search finds nothing.
    #[serde(default = "default_true")]
    pub fallback_app_list: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            news_url: default_news_url(),
            app_list_url: default_app_list_url(),
            language: default_store_language(),
            country: default_country(),
            pacing_ms: default_catalog_pacing_ms(),
            timeout_secs: default_timeout_secs(),
            max_length: default_news_max_length(),
            fallback_app_list: true,
        }
    }
}

impl CatalogConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Translation upstream settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default = "default_translate_url")]
    pub base_url: String,
    /// Minimum milliseconds between two translation requests.
    #[serde(default = "default_translation_pacing_ms")]
    pub pacing_ms: u64,
    /// Requests allowed per minute, across all chunks. 0 = no quota.
    #[serde(default = "default_translation_max_per_minute")]
    pub max_per_minute: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Longest text sent in a single translation request.
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,
    /// Language news is published in. Absent = let the upstream detect it.
    #[serde(default = "default_source_language")]
    pub source: Option<Language>,
    /// Target used when a command names no language.
    #[serde(default = "default_target_language")]
    pub default_target: Language,
    /// Languages users may request.
    #[serde(default = "default_languages")]
    pub languages: Vec<Language>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            base_url: default_translate_url(),
            pacing_ms: default_translation_pacing_ms(),
            max_per_minute: default_translation_max_per_minute(),
            timeout_secs: default_timeout_secs(),
            max_chunk_chars: default_max_chunk_chars(),
            source: default_source_language(),
            default_target: default_target_language(),
            languages: default_languages(),
        }
    }
}

impl TranslationConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_enabled(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }
}

impl Config {
    /// Apply environment-variable overrides using `lookup` as the source.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN").filter(|t| !t.is_empty()) {
            let tg = self.channel.telegram.get_or_insert_with(|| TelegramConfig {
                enabled: true,
                ..Default::default()
            });
            if tg.bot_token.is_empty() {
                tg.bot_token = token;
            }
        }
        if let Some(env) = lookup("STEAMWIRE_ENV") {
            self.bot.environment = Environment::from_name(&env);
        }
    }

    /// Apply the overrides bundled with the configured deployment profile.
    pub fn apply_profile(&mut self) {
        match self.bot.environment {
            Environment::Default => {}
            Environment::Development => {
                self.bot.log_level = "debug".to_string();
                self.command.cooldown_secs = 10;
                self.command.news_count = self.command.news_count.min(2);
            }
            Environment::Production => {
                self.bot.log_level = "warn".to_string();
                self.command.cooldown_secs = 60;
                self.translation.pacing_ms = self.translation.pacing_ms.max(4000);
                if self.translation.max_per_minute == 0 || self.translation.max_per_minute > 15 {
                    self.translation.max_per_minute = 15;
                }
            }
        }
    }

    /// Reject settings the bot cannot run with.
    pub fn validate(&self) -> Result<(), SteamwireError> {
        if self.command.news_count == 0 {
            return Err(SteamwireError::Config(
                "command.news_count must be at least 1".into(),
            ));
        }
        if self.command.news_count > MAX_NEWS_COUNT {
            return Err(SteamwireError::Config(format!(
                "command.news_count must be at most {MAX_NEWS_COUNT}"
            )));
        }
        if self.command.max_body_chars == 0 {
            return Err(SteamwireError::Config(
                "command.max_body_chars must be at least 1".into(),
            ));
        }
        if self.translation.max_chunk_chars == 0 {
            return Err(SteamwireError::Config(
                "translation.max_chunk_chars must be at least 1".into(),
            ));
        }
        if self.translation.languages.is_empty() {
            return Err(SteamwireError::Config(
                "translation.languages must not be empty".into(),
            ));
        }
        if !self.translation.is_enabled(self.translation.default_target) {
            return Err(SteamwireError::Config(format!(
                "translation.default_target '{}' is not in translation.languages",
                self.translation.default_target.code()
            )));
        }
        Ok(())
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Parse configuration from TOML text. No overrides are applied.
pub fn parse(content: &str) -> Result<Config, SteamwireError> {
    toml::from_str(content)
        .map_err(|e| SteamwireError::Config(format!("failed to parse config: {}", e)))
}

/// Load configuration from a TOML file, apply environment overrides and the
/// deployment profile, then validate.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, SteamwireError> {
    let path = Path::new(path);
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SteamwireError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        parse(&content)?
    } else {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        Config::default()
    };

    config.apply_env(|key| std::env::var(key).ok());
    config.apply_profile();
    config.validate()?;
    Ok(config)
}

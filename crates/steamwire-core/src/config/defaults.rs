//! Default value functions used by serde for config deserialization.

use crate::language::Language;

pub fn default_name() -> String {
    "Steamwire".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_prefix() -> String {
    "!".to_string()
}

pub fn default_cooldown_secs() -> u64 {
    30
}

pub fn default_news_count() -> usize {
    1
}

pub fn default_max_body_chars() -> usize {
    600
}

pub fn default_search_url() -> String {
    "https://store.steampowered.com/api/storesearch".to_string()
}

pub fn default_news_url() -> String {
    "https://api.steampowered.com/ISteamNews/GetNewsForApp/v2/".to_string()
}

pub fn default_app_list_url() -> String {
    "https://api.steampowered.com/ISteamApps/GetAppList/v2/".to_string()
}

pub fn default_store_language() -> String {
    "english".to_string()
}

pub fn default_country() -> String {
    "US".to_string()
}

pub fn default_catalog_pacing_ms() -> u64 {
    500
}

pub fn default_timeout_secs() -> u64 {
    30
}

pub fn default_news_max_length() -> u32 {
    1000
}

pub fn default_translate_url() -> String {
    "https://translate.googleapis.com".to_string()
}

pub fn default_translation_pacing_ms() -> u64 {
    1000
}

pub fn default_translation_max_per_minute() -> u32 {
    20
}

pub fn default_max_chunk_chars() -> usize {
    1500
}

pub fn default_source_language() -> Option<Language> {
    Some(Language::English)
}

pub fn default_target_language() -> Language {
    Language::French
}

pub fn default_languages() -> Vec<Language> {
    Language::ALL.to_vec()
}

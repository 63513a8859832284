//! Closed set of languages the bot can translate into.
//!
//! User input only becomes a [`Language`] through [`Language::parse`]; anything
//! it rejects is refused before a single request leaves the process.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A supported translation language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "ru")]
    Russian,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "zh")]
    Chinese,
}

impl Language {
    /// Every supported language, in display order.
    pub const ALL: [Language; 10] = [
        Self::English,
        Self::French,
        Self::Spanish,
        Self::German,
        Self::Italian,
        Self::Portuguese,
        Self::Russian,
        Self::Japanese,
        Self::Korean,
        Self::Chinese,
    ];

    /// ISO-639-1 code as typed by users (e.g. `fr`).
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::French => "fr",
            Self::Spanish => "es",
            Self::German => "de",
            Self::Italian => "it",
            Self::Portuguese => "pt",
            Self::Russian => "ru",
            Self::Japanese => "ja",
            Self::Korean => "ko",
            Self::Chinese => "zh",
        }
    }

    /// English display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::French => "French",
            Self::Spanish => "Spanish",
            Self::German => "German",
            Self::Italian => "Italian",
            Self::Portuguese => "Portuguese",
            Self::Russian => "Russian",
            Self::Japanese => "Japanese",
            Self::Korean => "Korean",
            Self::Chinese => "Chinese",
        }
    }

    /// Code understood by the translation upstream.
    pub fn upstream_code(&self) -> &'static str {
        match self {
            Self::Chinese => "zh-CN",
            other => other.code(),
        }
    }

    /// Map an upstream code (as reported by language detection) back to a language.
    pub fn from_upstream_code(code: &str) -> Option<Self> {
        let lower = code.trim().to_ascii_lowercase();
        let primary = lower.split(['-', '_']).next().unwrap_or(&lower);
        Self::ALL.into_iter().find(|l| l.code() == primary)
    }

    /// Parse a user-supplied code or English name, case-insensitive.
    pub fn parse(input: &str) -> Option<Self> {
        let needle = input.trim();
        if needle.is_empty() {
            return None;
        }
        Self::ALL.into_iter().find(|l| {
            l.code().eq_ignore_ascii_case(needle) || l.name().eq_ignore_ascii_case(needle)
        })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes_and_names() {
        assert_eq!(Language::parse("fr"), Some(Language::French));
        assert_eq!(Language::parse("FR"), Some(Language::French));
        assert_eq!(Language::parse(" french "), Some(Language::French));
        assert_eq!(Language::parse("Deutsch"), None);
        assert_eq!(Language::parse("xx"), None);
        assert_eq!(Language::parse(""), None);
    }

    #[test]
    fn test_every_code_round_trips_once() {
        for lang in Language::ALL {
            let hits: Vec<_> = Language::ALL
                .into_iter()
                .filter(|l| Language::parse(lang.code()) == Some(*l))
                .collect();
            assert_eq!(hits, vec![lang], "code {} must resolve uniquely", lang.code());
        }
    }

    #[test]
    fn test_upstream_codes() {
        assert_eq!(Language::Chinese.upstream_code(), "zh-CN");
        assert_eq!(Language::German.upstream_code(), "de");
        assert_eq!(Language::from_upstream_code("zh-CN"), Some(Language::Chinese));
        assert_eq!(Language::from_upstream_code("en"), Some(Language::English));
        assert_eq!(Language::from_upstream_code("nl"), None);
    }

    #[test]
    fn test_serde_uses_codes() {
        #[derive(Deserialize)]
        struct Wrap {
            langs: Vec<Language>,
        }
        let w: Wrap = toml::from_str(r#"langs = ["en", "ja"]"#).unwrap();
        assert_eq!(w.langs, vec![Language::English, Language::Japanese]);
    }
}

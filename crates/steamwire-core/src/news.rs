//! Catalog and news data model.

use crate::language::Language;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;

/// Steam application identifier. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppId(NonZeroU64);

impl AppId {
    pub fn new(id: u64) -> Option<Self> {
        NonZeroU64::new(id).map(Self)
    }

    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalog search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMatch {
    pub app_id: AppId,
    pub name: String,
    pub store_url: String,
}

impl GameMatch {
    pub fn new(app_id: AppId, name: impl Into<String>) -> Self {
        Self {
            app_id,
            name: name.into(),
            store_url: format!("https://store.steampowered.com/app/{app_id}"),
        }
    }
}

/// A news article as published, in its source language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsArticle {
    pub title: String,
    pub body: String,
    pub author: Option<String>,
    pub published_at: DateTime<Utc>,
    pub url: String,
}

/// A translated copy of a [`NewsArticle`]; the original is kept for attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedArticle {
    pub title: String,
    pub body: String,
    pub language: Language,
    /// Language the article was translated from, when known.
    pub source: Option<Language>,
    pub original: NewsArticle,
}

//! Steam catalog client: game search and news feed.
//!
//! Store search: `GET {search_url}?term=..&l=english&cc=US`
//! App list:     `GET {app_list_url}`
//! News:         `GET {news_url}?appid=..&count=..&maxlength=..&format=json`

use crate::html::{clean_html, strip_bbcode};
use crate::transport::{HttpTransport, TransportError};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use steamwire_core::{
    config::{CatalogConfig, MAX_NEWS_COUNT},
    news::{AppId, GameMatch, NewsArticle},
    ratelimit::{RateLimiter, CATALOG_SERVICE},
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Catalog failures.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// The request was rejected locally; no network call was made.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The upstream failed, after one retry where applicable.
    #[error("catalog upstream error: {0}")]
    Upstream(String),
}

#[derive(Debug, Deserialize)]
struct StoreSearchResponse {
    #[serde(default)]
    items: Vec<StoreItem>,
}

#[derive(Debug, Deserialize)]
struct StoreItem {
    id: u64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct AppListResponse {
    applist: AppList,
}

#[derive(Debug, Deserialize)]
struct AppList {
    #[serde(default)]
    apps: Vec<AppListEntry>,
}

#[derive(Debug, Deserialize)]
struct AppListEntry {
    appid: u64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    appnews: AppNews,
}

#[derive(Debug, Deserialize)]
struct AppNews {
    #[serde(default)]
    newsitems: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    contents: String,
    #[serde(default)]
    date: i64,
}

impl NewsItem {
    fn into_article(self) -> NewsArticle {
        let author = self.author.trim();
        NewsArticle {
            title: clean_html(&self.title),
            body: clean_html(&strip_bbcode(&self.contents)),
            author: (!author.is_empty()).then(|| author.to_string()),
            published_at: DateTime::<Utc>::from_timestamp(self.date, 0).unwrap_or_default(),
            url: self.url,
        }
    }
}

/// Client for the Steam store search and news endpoints.
pub struct CatalogClient {
    transport: Arc<dyn HttpTransport>,
    limiter: Arc<RateLimiter>,
    config: CatalogConfig,
}

impl CatalogClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        limiter: Arc<RateLimiter>,
        config: CatalogConfig,
    ) -> Self {
        Self {
            transport,
            limiter,
            config,
        }
    }

    /// Per-call timeout from config.
    pub fn timeout(&self) -> Duration {
        self.config.timeout()
    }

    /// Resolve a free-text game name to the catalog's best match.
    ///
    /// Takes the first item of the store's ranked search results. When the
    /// store finds nothing and the app-list fallback is enabled, scans the
    /// full app list for a case-insensitive name match.
    pub async fn search_game(
        &self,
        query: &str,
        timeout: Duration,
    ) -> Result<Option<GameMatch>, CatalogError> {
        let term = query.trim();
        if term.is_empty() {
            return Err(CatalogError::InvalidInput("empty game name".into()));
        }

        let params = [
            ("term", term.to_string()),
            ("l", self.config.language.clone()),
            ("cc", self.config.country.clone()),
        ];
        let body = self.get(&self.config.search_url, &params, timeout).await?;
        let parsed: StoreSearchResponse = decode(body, "store search")?;

        if let Some(game) = parsed
            .items
            .into_iter()
            .find_map(|item| AppId::new(item.id).map(|id| GameMatch::new(id, item.name)))
        {
            debug!("store search '{term}' -> {} ({})", game.name, game.app_id);
            return Ok(Some(game));
        }

        if !self.config.fallback_app_list {
            return Ok(None);
        }

        info!("store search found nothing for '{term}', scanning app list");
        let body = self.get(&self.config.app_list_url, &[], timeout).await?;
        let parsed: AppListResponse = decode(body, "app list")?;
        Ok(best_app_list_match(&parsed.applist.apps, term))
    }

    /// Newest `count` articles for `app_id`, in upstream order. `count` is
    /// capped at [`MAX_NEWS_COUNT`].
    ///
    /// An empty vector means the game has no news; it is not an error.
    pub async fn fetch_latest_news(
        &self,
        app_id: AppId,
        count: usize,
        timeout: Duration,
    ) -> Result<Vec<NewsArticle>, CatalogError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let count = count.min(MAX_NEWS_COUNT);

        let params = [
            ("appid", app_id.to_string()),
            ("count", count.to_string()),
            ("maxlength", self.config.max_length.to_string()),
            ("format", "json".to_string()),
        ];
        let body = self.get(&self.config.news_url, &params, timeout).await?;
        let parsed: NewsResponse = decode(body, "news")?;

        Ok(parsed
            .appnews
            .newsitems
            .into_iter()
            .take(count)
            .map(NewsItem::into_article)
            .collect())
    }

    /// Paced GET with a single retry on retryable failures.
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Value, CatalogError> {
        let mut attempt = 1;
        loop {
            self.limiter
                .pace(CATALOG_SERVICE, self.config.pacing())
                .await;
            match self.transport.get_json(url, query, timeout).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt == 1 && e.is_retryable() => {
                    warn!("catalog request to {url} failed ({e}), retrying once");
                    attempt += 1;
                }
                Err(e) => {
                    warn!("catalog request to {url} failed: {e}");
                    return Err(upstream(e));
                }
            }
        }
    }
}

fn upstream(e: TransportError) -> CatalogError {
    CatalogError::Upstream(e.to_string())
}

fn decode<T: serde::de::DeserializeOwned>(body: Value, what: &str) -> Result<T, CatalogError> {
    serde_json::from_value(body)
        .map_err(|e| CatalogError::Upstream(format!("malformed {what} response: {e}")))
}

/// Exact case-insensitive name first, else first name containing the term.
fn best_app_list_match(apps: &[AppListEntry], term: &str) -> Option<GameMatch> {
    let needle = term.to_lowercase();
    let to_match = |app: &AppListEntry| AppId::new(app.appid).map(|id| GameMatch::new(id, &app.name));

    apps.iter()
        .filter(|a| !a.name.is_empty())
        .find(|a| a.name.to_lowercase() == needle)
        .and_then(to_match)
        .or_else(|| {
            apps.iter()
                .filter(|a| !a.name.is_empty())
                .filter(|a| a.name.to_lowercase().contains(&needle))
                .find_map(to_match)
        })
}

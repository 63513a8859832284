//! The news command state machine.
//!
//! Cooldown → language → search → news → translate → format. Catalog
//! failures end the command; translation failures degrade it to the original
//! text with a notice.

use super::format;
use futures_util::future::{join, join_all};
use std::sync::Arc;
use steamwire_core::{
    config::{CommandConfig, Config, TranslationConfig},
    error::CommandError,
    language::Language,
    news::{GameMatch, NewsArticle, TranslatedArticle},
    ratelimit::{Acquire, RateLimiter},
};
use steamwire_upstream::{
    catalog::{CatalogClient, CatalogError},
    translation::TranslationClient,
};
use tracing::{debug, info, warn};

/// A response ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub text: String,
    /// Matched game name.
    pub game: String,
    /// True when translation failed and the original text was delivered.
    pub degraded: bool,
}

/// Runs news commands against the catalog and translation upstreams.
pub struct Dispatcher {
    catalog: CatalogClient,
    translator: TranslationClient,
    limiter: Arc<RateLimiter>,
    command: CommandConfig,
    translation: TranslationConfig,
}

impl Dispatcher {
    pub fn new(
        catalog: CatalogClient,
        translator: TranslationClient,
        limiter: Arc<RateLimiter>,
        config: &Config,
    ) -> Self {
        Self {
            catalog,
            translator,
            limiter,
            command: config.command.clone(),
            translation: config.translation.clone(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.command.prefix
    }

    pub fn help_text(&self) -> String {
        format::help_text(&self.command, &self.translation)
    }

    /// Run one news command for the sender identified by `sender_key`.
    pub async fn run_news(
        &self,
        sender_key: &str,
        query: &str,
        language: Option<&str>,
    ) -> Result<Delivery, CommandError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CommandError::InvalidInput(format::usage_hint(
                &self.command.prefix,
            )));
        }

        if let Acquire::Wait(remaining) = self.limiter.check(sender_key, self.command.cooldown()) {
            debug!("{sender_key} is cooling down for {remaining:?}");
            return Err(CommandError::Cooldown { remaining });
        }

        let target = self.resolve_language(language)?;

        let game = match self.catalog.search_game(query, self.catalog.timeout()).await {
            Ok(Some(game)) => game,
            Ok(None) => return Err(CommandError::GameNotFound(query.to_string())),
            Err(CatalogError::InvalidInput(hint)) => return Err(CommandError::InvalidInput(hint)),
            Err(e) => {
                warn!("catalog search for '{query}' failed: {e}");
                return Err(CommandError::CatalogUnavailable);
            }
        };
        info!("'{query}' matched {} ({})", game.name, game.app_id);

        let articles = match self
            .catalog
            .fetch_latest_news(game.app_id, self.command.news_count, self.catalog.timeout())
            .await
        {
            Ok(articles) if articles.is_empty() => {
                return Err(CommandError::NoNewsAvailable(game.name.clone()))
            }
            Ok(articles) => articles,
            Err(e) => {
                warn!("news fetch for {} failed: {e}", game.app_id);
                return Err(CommandError::CatalogUnavailable);
            }
        };

        let articles: Vec<NewsArticle> = articles
            .into_iter()
            .map(|mut article| {
                article.body = format::truncate_body(&article.body, self.command.max_body_chars);
                article
            })
            .collect();

        Ok(self.translate_and_format(&game, articles, target).await)
    }

    /// Absent token → configured default. Unknown or disabled → rejected.
    fn resolve_language(&self, token: Option<&str>) -> Result<Language, CommandError> {
        let Some(token) = token else {
            return Ok(self.translation.default_target);
        };
        Language::parse(token)
            .filter(|l| self.translation.is_enabled(*l))
            .ok_or_else(|| CommandError::InvalidLanguage(token.to_string()))
    }

    async fn translate_and_format(
        &self,
        game: &GameMatch,
        articles: Vec<NewsArticle>,
        target: Language,
    ) -> Delivery {
        let source = self.translator.source();
        let timeout = self.translator.timeout();

        // Title and body are attempted independently; the command still
        // needs every part of every article to succeed.
        let results = join_all(articles.iter().map(|article| {
            join(
                self.translator.translate(&article.title, target, source, timeout),
                self.translator.translate(&article.body, target, source, timeout),
            )
        }))
        .await;

        let mut translated = Vec::with_capacity(articles.len());
        let mut failure = None;
        for (article, (title, body)) in articles.iter().zip(results) {
            match (title, body) {
                (Ok(title), Ok(body)) => translated.push(TranslatedArticle {
                    source: title.source.or(body.source),
                    title: title.text,
                    body: body.text,
                    language: target,
                    original: article.clone(),
                }),
                (Err(e), _) | (_, Err(e)) => {
                    failure.get_or_insert(e);
                }
            }
        }

        match failure {
            None => Delivery {
                text: format::translated_articles(game, &translated),
                game: game.name.clone(),
                degraded: false,
            },
            Some(e) => {
                warn!(
                    "translation to {} failed, delivering original: {e}",
                    target.code()
                );
                Delivery {
                    text: format::original_articles(
                        game,
                        &articles,
                        &CommandError::TranslationUnavailable.user_message(),
                    ),
                    game: game.name.clone(),
                    degraded: true,
                }
            }
        }
    }
}

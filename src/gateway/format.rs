//! Response text for news deliveries and help.

use steamwire_core::{
    config::{CommandConfig, TranslationConfig},
    language::Language,
    news::{GameMatch, NewsArticle, TranslatedArticle},
};

const ARTICLE_SEPARATOR: &str = "\n\n――――――\n\n";

/// Cut `body` to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", body[..cut].trim_end()),
        None => body.to_string(),
    }
}

/// Render translated articles.
///
/// An article whose source is known and equals its target went through
/// untouched and is rendered without translation attribution.
pub fn translated_articles(game: &GameMatch, articles: &[TranslatedArticle]) -> String {
    articles
        .iter()
        .map(|article| {
            let untouched = article.source == Some(article.language);
            let mut block = article_block(
                game,
                &article.title,
                &article.body,
                &article.original,
            );
            if untouched {
                return block;
            }
            if article.title != article.original.title {
                block.push_str(&format!("\n🌐 Original title: {}", article.original.title));
            }
            block.push_str(&format!(
                "\n\n{}",
                footer(article.source, article.language)
            ));
            block
        })
        .collect::<Vec<_>>()
        .join(ARTICLE_SEPARATOR)
}

/// Render articles in their source language, headed by `notice`.
pub fn original_articles(game: &GameMatch, articles: &[NewsArticle], notice: &str) -> String {
    let blocks = articles
        .iter()
        .map(|article| article_block(game, &article.title, &article.body, article))
        .collect::<Vec<_>>()
        .join(ARTICLE_SEPARATOR);
    format!("{notice}\n\n{blocks}")
}

fn article_block(game: &GameMatch, title: &str, body: &str, original: &NewsArticle) -> String {
    let mut block = format!("📰 {title}\n\n");
    if !body.trim().is_empty() {
        block.push_str(body);
        block.push_str("\n\n");
    }
    block.push_str(&format!(
        "🎮 {} · {}",
        game.name,
        original.published_at.format("%Y-%m-%d")
    ));
    if let Some(ref author) = original.author {
        block.push_str(&format!(" · {author}"));
    }
    block.push_str(&format!("\n🔗 {}", original.url));
    block
}

fn footer(source: Option<Language>, target: Language) -> String {
    match source {
        Some(source) => format!("Translated from {source} to {target}"),
        None => format!("Translated to {target}"),
    }
}

/// Usage text for the help command.
pub fn help_text(command: &CommandConfig, translation: &TranslationConfig) -> String {
    let prefix = &command.prefix;
    let languages = translation
        .languages
        .iter()
        .map(|l| format!("{} ({})", l.code(), l.name()))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "🎮 Steam News\n\n\
         {prefix}steam-news <game> [lang]\n\
         {prefix}steam-news \"<game>\" [lang]\n\
         /news <game> [lang]\n\n\
         Fetches the latest Steam news for a game and translates it.\n\
         Example: {prefix}steam-news \"Counter-Strike 2\" fr\n\n\
         Default language: {} ({})\n\
         Languages: {languages}\n\
         Cooldown: one command every {} seconds per user.",
        translation.default_target.code(),
        translation.default_target.name(),
        command.cooldown_secs,
    )
}

/// Usage hint for a news command without a game name.
pub fn usage_hint(prefix: &str) -> String {
    format!("Please provide a game name. Usage: {prefix}steam-news <game> [lang]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use steamwire_core::news::AppId;

    fn game() -> GameMatch {
        GameMatch::new(AppId::new(70).unwrap(), "Half-Life")
    }

    fn article() -> NewsArticle {
        NewsArticle {
            title: "Update Released".into(),
            body: "New content is live.".into(),
            author: Some("Valve".into()),
            published_at: Utc.with_ymd_and_hms(2024, 3, 9, 18, 30, 0).unwrap(),
            url: "https://store.steampowered.com/news/app/70/view/1?l=english&x=1".into(),
        }
    }

    #[test]
    fn test_truncate_body_short_is_untouched() {
        assert_eq!(truncate_body("short", 10), "short");
        assert_eq!(truncate_body("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn test_truncate_body_is_char_safe() {
        assert_eq!(truncate_body("héllo wörld", 5), "héllo...");
        assert_eq!(truncate_body("日本語のテキスト", 3), "日本語...");
    }

    #[test]
    fn test_translated_article_rendering() {
        let original = article();
        let translated = TranslatedArticle {
            title: "Mise à jour publiée".into(),
            body: "Le nouveau contenu est disponible.".into(),
            language: Language::French,
            source: Some(Language::English),
            original: original.clone(),
        };
        let text = translated_articles(&game(), &[translated]);

        assert!(text.starts_with("📰 Mise à jour publiée\n\nLe nouveau contenu est disponible."));
        assert!(text.contains("🎮 Half-Life · 2024-03-09 · Valve"));
        assert!(text.contains(&original.url));
        assert!(text.contains("🌐 Original title: Update Released"));
        assert!(text.ends_with("Translated from English to French"));
    }

    #[test]
    fn test_same_language_has_no_attribution() {
        let original = article();
        let same = TranslatedArticle {
            title: original.title.clone(),
            body: original.body.clone(),
            language: Language::English,
            source: Some(Language::English),
            original,
        };
        let text = translated_articles(&game(), &[same]);
        assert!(!text.contains("Translated"));
        assert!(!text.contains("Original title"));
    }

    #[test]
    fn test_unknown_source_footer() {
        let original = article();
        let translated = TranslatedArticle {
            title: "Aktualisierung".into(),
            body: "Neu.".into(),
            language: Language::German,
            source: None,
            original,
        };
        let text = translated_articles(&game(), &[translated]);
        assert!(text.ends_with("Translated to German"));
    }

    #[test]
    fn test_original_articles_with_notice() {
        let text = original_articles(&game(), &[article(), article()], "⚠️ notice");
        assert!(text.starts_with("⚠️ notice\n\n📰 Update Released"));
        assert_eq!(text.matches("📰 Update Released").count(), 2);
        assert_eq!(text.matches(ARTICLE_SEPARATOR).count(), 1);
    }

    #[test]
    fn test_help_text_lists_languages_and_cooldown() {
        let text = help_text(&CommandConfig::default(), &TranslationConfig::default());
        assert!(text.contains("!steam-news <game> [lang]"));
        assert!(text.contains("fr (French)"));
        assert!(text.contains("zh (Chinese)"));
        assert!(text.contains("every 30 seconds"));
    }
}

//! Chat command parsing.


use steamwire_core::language::Language;

/// Known bot commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch news for `query`, optionally in the language named by `language`.
    ///
    /// `language` is the raw token; it is validated by the dispatcher.
    News {
        query: String,
        language: Option<String>,
    },
    Help,
}

impl Command {
    /// Parse a command from message text. Returns `None` for anything that is
    /// not addressed to the bot.
    pub fn parse(text: &str, prefix: &str) -> Option<Self> {
        let text = text.trim_start();
        let first = text.split_whitespace().next()?;
        let rest = text[first.len()..].trim();

        // Strip @botname suffix (e.g. "/news@steamwire_bot" → "/news").
        let cmd = if first.starts_with('/') {
            first.split('@').next().unwrap_or(first)
        } else {
            first
        };

        if let Some(name) = cmd.strip_prefix(prefix).filter(|_| !prefix.is_empty()) {
            return match name {
                "steam-news" => Some(news(rest)),
                "help-steam" => Some(Self::Help),
                _ => None,
            };
        }

        match cmd {
            "/steam_news" | "/news" => Some(news(rest)),
            "/help" | "/start" => Some(Self::Help),
            _ => None,
        }
    }
}

fn news(args: &str) -> Command {
    let (query, language) = split_news_args(args);
    Command::News { query, language }
}

/// Split `<game> [lang]` into the game name and the optional language token.
///
/// A quoted name is taken verbatim and the next token, if any, is the
/// language. Unquoted, the last token is the language only when it parses as
/// one and something remains for the name.
fn split_news_args(args: &str) -> (String, Option<String>) {
    let args = args.trim();

    if let Some(quoted) = args.strip_prefix('"') {
        if let Some(end) = quoted.find('"') {
            let query = quoted[..end].trim().to_string();
            let language = quoted[end + 1..]
                .split_whitespace()
                .next()
                .map(str::to_string);
            return (query, language);
        }
    }

    let tokens: Vec<&str> = args.split_whitespace().collect();
    if let Some((last, head)) = tokens.split_last() {
        if !head.is_empty() && Language::parse(last).is_some() {
            return (head.join(" "), Some(last.to_string()));
        }
    }
    (tokens.join(" "), None)
}

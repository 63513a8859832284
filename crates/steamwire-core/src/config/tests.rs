use super::*;
use std::collections::HashMap;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_defaults_match_documented_values() {
    let cfg = Config::default();
    assert_eq!(cfg.command.cooldown_secs, 30);
    assert_eq!(cfg.command.news_count, 1);
    assert_eq!(cfg.catalog.timeout_secs, 30);
    assert_eq!(cfg.translation.max_chunk_chars, 1500);
    assert_eq!(cfg.translation.pacing_ms, 1000);
    assert_eq!(cfg.translation.max_per_minute, 20);
    assert_eq!(cfg.translation.source, Some(Language::English));
    assert_eq!(cfg.translation.default_target, Language::French);
    assert_eq!(cfg.translation.languages.len(), Language::ALL.len());
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_empty_toml_gives_defaults() {
    let cfg = parse("").unwrap();
    assert_eq!(cfg.command.cooldown_secs, 30);
    assert!(cfg.channel.telegram.is_none());
}

#[test]
fn test_partial_sections() {
    let cfg = parse(
        r#"
        [command]
        cooldown_secs = 5

        [translation]
        default_target = "de"
        languages = ["en", "de"]

        [channel.telegram]
        enabled = true
        bot_token = "123:abc"
        "#,
    )
    .unwrap();
    assert_eq!(cfg.command.cooldown_secs, 5);
    assert_eq!(cfg.command.news_count, 1);
    assert_eq!(cfg.translation.default_target, Language::German);
    assert!(cfg.translation.is_enabled(Language::English));
    assert!(!cfg.translation.is_enabled(Language::French));
    let tg = cfg.channel.telegram.unwrap();
    assert_eq!(tg.bot_token, "123:abc");
    assert!(tg.allow_groups);
}

#[test]
fn test_auto_detect_source() {
    let cfg = parse(
        r#"
        [translation]
        source = "fr"
        "#,
    )
    .unwrap();
    assert_eq!(cfg.translation.source, Some(Language::French));
}

#[test]
fn test_unknown_language_code_is_parse_error() {
    let err = parse(
        r#"
        [translation]
        languages = ["en", "xx"]
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, SteamwireError::Config(_)));
}

#[test]
fn test_env_token_fills_empty_token() {
    let mut cfg = Config::default();
    cfg.apply_env(env(&[("TELEGRAM_BOT_TOKEN", "999:zzz")]));
    let tg = cfg.channel.telegram.unwrap();
    assert!(tg.enabled);
    assert_eq!(tg.bot_token, "999:zzz");
}

#[test]
fn test_env_token_does_not_override_file_token() {
    let mut cfg = parse(
        r#"
        [channel.telegram]
        enabled = true
        bot_token = "from-file"
        "#,
    )
    .unwrap();
    cfg.apply_env(env(&[("TELEGRAM_BOT_TOKEN", "from-env")]));
    assert_eq!(cfg.channel.telegram.unwrap().bot_token, "from-file");
}

#[test]
fn test_development_profile() {
    let mut cfg = Config::default();
    cfg.command.news_count = 3;
    cfg.apply_env(env(&[("STEAMWIRE_ENV", "development")]));
    cfg.apply_profile();
    assert_eq!(cfg.bot.log_level, "debug");
    assert_eq!(cfg.command.cooldown_secs, 10);
    assert_eq!(cfg.command.news_count, 2);
}

#[test]
fn test_production_profile() {
    let mut cfg = parse(
        r#"
        [bot]
        environment = "production"
        "#,
    )
    .unwrap();
    cfg.apply_profile();
    assert_eq!(cfg.bot.log_level, "warn");
    assert_eq!(cfg.command.cooldown_secs, 60);
    assert!(cfg.translation.pacing_ms >= 4000);
    assert_eq!(cfg.translation.max_per_minute, 15);
}

#[test]
fn test_production_keeps_stricter_quota() {
    let mut cfg = parse(
        r#"
        [bot]
        environment = "production"

        [translation]
        max_per_minute = 5
        "#,
    )
    .unwrap();
    cfg.apply_profile();
    assert_eq!(cfg.translation.max_per_minute, 5);
}

#[test]
fn test_unknown_profile_name_is_default() {
    assert_eq!(Environment::from_name("staging"), Environment::Default);
    assert_eq!(Environment::from_name("PROD"), Environment::Production);
}

#[test]
fn test_validate_rejects_disabled_default_target() {
    let mut cfg = Config::default();
    cfg.translation.languages = vec![Language::English, Language::Spanish];
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("default_target"));
}

#[test]
fn test_validate_rejects_zero_counts() {
    let mut cfg = Config::default();
    cfg.command.news_count = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = Config::default();
    cfg.translation.max_chunk_chars = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_validate_caps_news_count() {
    let mut cfg = Config::default();
    cfg.command.news_count = MAX_NEWS_COUNT;
    assert!(cfg.validate().is_ok());

    cfg.command.news_count = MAX_NEWS_COUNT + 1;
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("at most 3"));
}

#[test]
fn test_load_missing_file_uses_defaults() {
    let path = std::env::temp_dir().join("__steamwire_missing_config__.toml");
    let _ = std::fs::remove_file(&path);
    let cfg = load(path.to_str().unwrap()).unwrap();
    assert_eq!(cfg.bot.name, "Steamwire");
}

#[test]
fn test_shellexpand_home() {
    let expanded = shellexpand("~/logs");
    if std::env::var_os("HOME").is_some() {
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/logs"));
    }
    assert_eq!(shellexpand("/var/log"), "/var/log");
}

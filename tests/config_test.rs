//! Tests for config loading

use lyricseek::config::Config;
use lyricseek::models::StrategyKind;
use serial_test::serial;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

const ENV_KEYS: &[&str] = &[
    "GENIUS_API_URL",
    "GENIUS_ACCESS_TOKEN",
    "LYRICSEEK_REQUEST_TIMEOUT",
    "LYRICSEEK_MAX_RETRIES",
    "LYRICSEEK_STRATEGIES",
    "LYRICSEEK_MIN_LYRICS_CHARS",
    "LYRICSEEK_STAGGER_MS",
    "LYRICSEEK_VIDEO_LOOKUP",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

#[test]
fn test_config_file_exists() {
    let config_path = Path::new("config.toml");
    assert!(
        config_path.exists(),
        "config.toml should exist in project root"
    );
}

#[test]
fn test_shipped_config_matches_defaults() {
    let config = Config::from_file(Path::new("config.toml")).expect("config.toml should parse");
    config.validate().expect("config.toml should be valid");

    let defaults = Config::default();
    assert_eq!(config.resolver.strategies, defaults.resolver.strategies);
    assert_eq!(config.resolver.min_lyrics_chars, defaults.resolver.min_lyrics_chars);
    assert_eq!(config.fetch.max_retries, defaults.fetch.max_retries);
    assert_eq!(config.batch.stagger_ms, defaults.batch.stagger_ms);
}

#[test]
fn test_from_file_partial() {
    let file = write_config(
        r#"
        [search]
        access_token = "abc123"

        [fetch]
        request_timeout_secs = 5

        [resolver]
        strategies = ["session", "direct", "api"]
        "#,
    );

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.search.access_token.as_deref(), Some("abc123"));
    assert_eq!(config.request_timeout(), Duration::from_secs(5));
    assert_eq!(
        config.resolver.strategies,
        vec![
            StrategyKind::SessionWarmed,
            StrategyKind::Direct,
            StrategyKind::LyricsApi
        ]
    );
    // Untouched sections keep their defaults
    assert_eq!(config.batch.max_concurrent, 8);
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_file_invalid_toml() {
    let file = write_config("[fetch\nrequest_timeout_secs = ");
    let err = Config::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML"));
}

#[test]
fn test_from_file_unknown_strategy() {
    let file = write_config("[resolver]\nstrategies = [\"direct\", \"carrier-pigeon\"]\n");
    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_from_file_missing() {
    assert!(Config::from_file(Path::new("does/not/exist.toml")).is_err());
}

#[test]
fn test_plain_text_first_fails_validation() {
    let file = write_config("[resolver]\nstrategies = [\"mirror\", \"direct\"]\n");
    let config = Config::from_file(file.path()).unwrap();
    assert!(config.validate().is_err());
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();

    let config = Config::from_env().unwrap();
    assert!(config.search.access_token.is_none());
    assert_eq!(config.search.api_url, "https://api.genius.com");
    assert_eq!(config.resolver.strategies, Config::default().resolver.strategies);
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    std::env::set_var("GENIUS_ACCESS_TOKEN", "env-token");
    std::env::set_var("LYRICSEEK_STRATEGIES", "direct,session,mirror");
    std::env::set_var("LYRICSEEK_MIN_LYRICS_CHARS", "80");
    std::env::set_var("LYRICSEEK_STAGGER_MS", "0");
    std::env::set_var("LYRICSEEK_VIDEO_LOOKUP", "false");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.search.access_token.as_deref(), Some("env-token"));
    assert_eq!(
        config.resolver.strategies,
        vec![
            StrategyKind::Direct,
            StrategyKind::SessionWarmed,
            StrategyKind::Mirror
        ]
    );
    assert_eq!(config.resolver.min_lyrics_chars, 80);
    assert_eq!(config.batch.stagger_ms, 0);
    assert!(!config.batch.video_lookup);
}

#[test]
#[serial]
fn test_from_env_blank_token_ignored() {
    clear_env();
    std::env::set_var("GENIUS_ACCESS_TOKEN", "   ");

    let config = Config::from_env().unwrap();
    clear_env();

    assert!(config.search.access_token.is_none());
}

#[test]
#[serial]
fn test_from_env_bad_strategy_list() {
    clear_env();
    std::env::set_var("LYRICSEEK_STRATEGIES", "direct,telepathy");

    let result = Config::from_env();
    clear_env();

    assert!(result.is_err());
}

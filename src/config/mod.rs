//! Configuration management for lyricseek
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::models::StrategyKind;
use crate::utils::retry::RetryConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Song search provider
    pub search: SearchConfig,

    /// Page fetching
    pub fetch: FetchConfig,

    /// Resolution strategy order and acceptance
    pub resolver: ResolverConfig,

    /// Batch fan-out
    pub batch: BatchConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Song search provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Genius API base URL
    pub api_url: String,

    /// Genius API access token
    pub access_token: Option<String>,

    /// Attempts for transient search failures
    pub max_retries: u32,
}

/// Fetcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Attempts per direct fetch (first try included)
    pub max_retries: u32,

    /// Base backoff delay in milliseconds
    pub base_delay_ms: u64,

    /// Backoff cap in milliseconds
    pub max_delay_ms: u64,

    /// Upper bound of random jitter added to each backoff
    pub jitter_ms: u64,

    /// Cooldown after an HTTP 429, in milliseconds
    pub rate_limit_cooldown_ms: u64,

    /// Requests per second issued by each fetcher
    pub requests_per_second: u32,

    /// Randomized pause between session warm-up and the real request
    pub warmup_delay_min_ms: u64,
    pub warmup_delay_max_ms: u64,

    /// Text-rendering proxy base URL
    pub mirror_url: String,

    /// Keyless lyrics API base URL
    pub lyrics_api_url: String,

    /// User agent of the alternate-identity fetcher
    pub crawler_user_agent: String,
}

/// Resolution orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Strategies in the order they are tried
    pub strategies: Vec<StrategyKind>,

    /// Minimum characters for a result to be accepted
    pub min_lyrics_chars: usize,
}

/// Batch coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Delay between successive candidates' request issuance, in milliseconds
    pub stagger_ms: u64,

    /// Maximum candidates resolved at once
    pub max_concurrent: usize,

    /// Look up a video id for every candidate
    pub video_lookup: bool,

    /// Video search base URL
    pub video_url: String,

    /// Video lookup timeout in seconds
    pub video_timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_url: String::from("https://api.genius.com"),
            access_token: None,
            max_retries: 3,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 15,
            max_retries: 3,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
            jitter_ms: 400,
            rate_limit_cooldown_ms: 5_000,
            requests_per_second: 4,
            warmup_delay_min_ms: 800,
            warmup_delay_max_ms: 2_000,
            mirror_url: String::from("https://r.jina.ai"),
            lyrics_api_url: String::from("https://api.lyrics.ovh"),
            crawler_user_agent: String::from(
                "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)",
            ),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            strategies: vec![
                StrategyKind::Direct,
                StrategyKind::Mirror,
                StrategyKind::LyricsApi,
                StrategyKind::AlternateIdentity,
            ],
            min_lyrics_chars: 40,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            stagger_ms: 250,
            max_concurrent: 8,
            video_lookup: true,
            video_url: String::from("https://www.youtube.com"),
            video_timeout_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

/// Parse a comma-separated strategy list
pub fn parse_strategies(value: &str) -> Result<Vec<StrategyKind>> {
    value
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<StrategyKind>().map_err(anyhow::Error::msg))
        .collect()
}

impl Config {
    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("GENIUS_API_URL") {
            config.search.api_url = url;
        }
        config.search.access_token = std::env::var("GENIUS_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        if let Some(secs) = env_parse("LYRICSEEK_REQUEST_TIMEOUT") {
            config.fetch.request_timeout_secs = secs;
        }
        if let Some(retries) = env_parse("LYRICSEEK_MAX_RETRIES") {
            config.fetch.max_retries = retries;
        }
        if let Some(rate) = env_parse("LYRICSEEK_RATE_LIMIT") {
            config.fetch.requests_per_second = rate;
        }
        if let Ok(url) = std::env::var("LYRICSEEK_MIRROR_URL") {
            config.fetch.mirror_url = url;
        }
        if let Ok(url) = std::env::var("LYRICSEEK_LYRICS_API_URL") {
            config.fetch.lyrics_api_url = url;
        }

        if let Ok(list) = std::env::var("LYRICSEEK_STRATEGIES") {
            config.resolver.strategies =
                parse_strategies(&list).context("Invalid LYRICSEEK_STRATEGIES")?;
        }
        if let Some(min) = env_parse("LYRICSEEK_MIN_LYRICS_CHARS") {
            config.resolver.min_lyrics_chars = min;
        }

        if let Some(stagger) = env_parse("LYRICSEEK_STAGGER_MS") {
            config.batch.stagger_ms = stagger;
        }
        if let Some(max) = env_parse("LYRICSEEK_MAX_CONCURRENT") {
            config.batch.max_concurrent = max;
        }
        if let Some(enabled) = env_parse("LYRICSEEK_VIDEO_LOOKUP") {
            config.batch.video_lookup = enabled;
        }

        if let Ok(level) = std::env::var("LYRICSEEK_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("LYRICSEEK_LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.fetch.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.fetch.max_retries == 0 {
            anyhow::bail!("max_retries must be greater than 0");
        }

        if self.fetch.requests_per_second == 0 {
            anyhow::bail!("requests_per_second must be greater than 0");
        }

        if self.fetch.warmup_delay_min_ms > self.fetch.warmup_delay_max_ms {
            anyhow::bail!("warmup_delay_min_ms must not exceed warmup_delay_max_ms");
        }

        if self.batch.max_concurrent == 0 {
            anyhow::bail!("max_concurrent must be greater than 0");
        }

        validate_strategy_order(&self.resolver.strategies)
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.request_timeout_secs)
    }

    /// Backoff schedule for the page fetchers
    #[must_use]
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.fetch.max_retries,
            base_delay_ms: self.fetch.base_delay_ms,
            max_delay_ms: self.fetch.max_delay_ms,
            backoff_multiplier: 2.0,
            jitter_ms: self.fetch.jitter_ms,
        }
    }

    /// Backoff schedule for the search provider
    #[must_use]
    pub fn search_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.search.max_retries.max(1),
            ..self.retry_config()
        }
    }

    #[must_use]
    pub fn video_timeout(&self) -> Duration {
        Duration::from_secs(self.batch.video_timeout_secs)
    }
}

/// Check a strategy list: non-empty, no repeats, and a markup strategy
/// ahead of the first plain-text one
pub fn validate_strategy_order(strategies: &[StrategyKind]) -> Result<()> {
    if strategies.is_empty() {
        anyhow::bail!("at least one resolution strategy is required");
    }

    for (i, strategy) in strategies.iter().enumerate() {
        if strategies[..i].contains(strategy) {
            anyhow::bail!("strategy '{strategy}' is listed more than once");
        }
    }

    let first_plain = strategies
        .iter()
        .position(|s| !s.payload_kind().is_markup());
    if let Some(idx) = first_plain {
        if !strategies[..idx].iter().any(|s| s.payload_kind().is_markup()) {
            anyhow::bail!(
                "a markup strategy must precede '{}' in the strategy order",
                strategies[idx]
            );
        }
    }

    Ok(())
}

//! Common test utilities

use lyricseek::config::Config;
use lyricseek::models::{Candidate, ReleaseDate};

/// Configuration pointing every upstream at one mock server, with short timings
#[allow(dead_code)]
pub fn test_config(uri: &str) -> Config {
    let mut config = Config::default();

    config.search.api_url = uri.to_string();
    config.search.access_token = Some("test-token".to_string());
    config.search.max_retries = 2;

    config.fetch.request_timeout_secs = 1;
    config.fetch.max_retries = 2;
    config.fetch.base_delay_ms = 10;
    config.fetch.max_delay_ms = 50;
    config.fetch.jitter_ms = 0;
    config.fetch.rate_limit_cooldown_ms = 100;
    config.fetch.requests_per_second = 50;
    config.fetch.warmup_delay_min_ms = 0;
    config.fetch.warmup_delay_max_ms = 0;
    config.fetch.mirror_url = uri.to_string();
    config.fetch.lyrics_api_url = uri.to_string();

    config.batch.stagger_ms = 10;
    config.batch.video_url = uri.to_string();
    config.batch.video_timeout_secs = 1;

    config
}

/// Candidate whose page lives at `{uri}{path}`
#[allow(dead_code)]
pub fn candidate_at(uri: &str, path: &str, title: &str, artist: &str) -> Candidate {
    Candidate::new(title, artist, format!("{uri}{path}"))
}

/// Candidate with a known release year
#[allow(dead_code)]
pub fn dated_candidate(title: &str, artist: &str, year: u32) -> Candidate {
    Candidate::new(title, artist, format!("https://genius.com/{title}-lyrics"))
        .with_release_date(ReleaseDate::year(year))
}

/// Lyric page with a single data-attribute container
#[allow(dead_code)]
pub fn lyric_page(lines: &[&str]) -> String {
    format!(
        r#"<html><body><div data-lyrics-container="true">{}</div></body></html>"#,
        lines.join("<br>")
    )
}

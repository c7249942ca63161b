pub mod extract;
pub mod search;

use anyhow::{Context, Result};
use std::path::Path;

use lyricseek::config::Config;
use lyricseek::models::StrategyKind;

// Re-export command functions for convenience
pub use extract::extract;
pub use search::search;

/// Load configuration from a TOML file, or from the environment
///
/// A file without an access token still picks one up from
/// `GENIUS_ACCESS_TOKEN`.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env().context("Failed to load configuration from environment")?,
    };

    if config.search.access_token.is_none() {
        config.search.access_token = std::env::var("GENIUS_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
    }

    Ok(config)
}

/// Print the configured strategy order
pub fn strategies(config: &Config) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    println!("Resolution strategies (tried in order):");
    for (i, kind) in config.resolver.strategies.iter().enumerate() {
        println!("  {}. {:<10} {}", i + 1, kind.as_str(), describe(*kind));
    }
    println!(
        "\nA result needs at least {} characters to be accepted.",
        config.resolver.min_lyrics_chars
    );

    Ok(())
}

fn describe(kind: StrategyKind) -> &'static str {
    match kind {
        StrategyKind::Direct => "lyric page, browser headers, retried",
        StrategyKind::SessionWarmed => "landing page visit for cookies, then lyric page",
        StrategyKind::AlternateIdentity => "lyric page once, as a search crawler",
        StrategyKind::Mirror => "text-rendering proxy of the lyric page",
        StrategyKind::LyricsApi => "artist/title lookup on the lyrics API",
    }
}

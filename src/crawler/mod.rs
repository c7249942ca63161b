//! Lyric source fetchers
//!
//! Each resolution strategy is a [`SourceFetcher`]: given a candidate it
//! performs one logical fetch (possibly several HTTP requests with retries)
//! and reports a [`FetchAttempt`]. Fetchers never return errors; failures are
//! recorded in the attempt so the resolver can move on.
//!
//! - [`direct`] - the lyric page with browser headers
//! - [`warmed`] - the lyric page after a cookie-collecting landing visit
//! - [`identity`] - the lyric page once, as a search crawler
//! - [`mirror`] - a text-rendering proxy of the lyric page
//! - [`lyrics_api`] - an artist/title lyrics API

pub mod direct;
pub mod fetcher;
pub mod headers;
pub mod identity;
pub mod lyrics_api;
pub mod mirror;
pub mod session;
pub mod warmed;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::models::{Candidate, FetchAttempt, StrategyKind};
use crate::utils::error::FetchError;

pub use direct::DirectFetcher;
pub use fetcher::{AttemptContext, HttpFetcher};
pub use identity::AlternateIdentityFetcher;
pub use lyrics_api::LyricsApiFetcher;
pub use mirror::MirrorFetcher;
pub use session::{SessionContext, SessionState};
pub use warmed::SessionWarmedFetcher;

/// One way of obtaining a lyric payload for a candidate
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Strategy this fetcher implements
    fn kind(&self) -> StrategyKind;

    /// Fetch the candidate's payload; failures are reported, never raised
    async fn fetch(&self, candidate: &Candidate, session: &SessionContext) -> FetchAttempt;
}

/// Build the fetcher for one strategy
///
/// Every fetcher gets its own HTTP core, so rate limits and 429 cooldowns
/// never leak between strategies.
pub fn build_fetcher(
    kind: StrategyKind,
    config: &Config,
) -> Result<Arc<dyn SourceFetcher>, FetchError> {
    let http = HttpFetcher::new(config)?;
    let fetch = &config.fetch;

    let fetcher: Arc<dyn SourceFetcher> = match kind {
        StrategyKind::Direct => Arc::new(DirectFetcher::new(http)),
        StrategyKind::SessionWarmed => Arc::new(SessionWarmedFetcher::new(
            http,
            fetch.warmup_delay_min_ms,
            fetch.warmup_delay_max_ms,
        )),
        StrategyKind::AlternateIdentity => Arc::new(AlternateIdentityFetcher::new(
            http,
            fetch.crawler_user_agent.clone(),
        )),
        StrategyKind::Mirror => Arc::new(MirrorFetcher::new(http, fetch.mirror_url.clone())),
        StrategyKind::LyricsApi => {
            Arc::new(LyricsApiFetcher::new(http, fetch.lyrics_api_url.clone()))
        }
    };

    Ok(fetcher)
}

/// Build fetchers for the configured strategy order
pub fn build_fetchers(config: &Config) -> Result<Vec<Arc<dyn SourceFetcher>>, FetchError> {
    config
        .resolver
        .strategies
        .iter()
        .map(|kind| build_fetcher(*kind, config))
        .collect()
}

/// Turn a fetch result into an attempt record
///
/// A successful answer with a blank body counts as a failure.
pub(crate) fn into_attempt(
    kind: StrategyKind,
    target_url: impl Into<String>,
    result: Result<String, FetchError>,
    attempts: u32,
) -> FetchAttempt {
    match result {
        Ok(body) if body.trim().is_empty() => {
            FetchAttempt::failure(kind, target_url, &FetchError::EmptyPayload, attempts)
        }
        Ok(body) => {
            debug!(strategy = %kind, bytes = body.len(), attempts, "Fetch succeeded");
            FetchAttempt::success(kind, target_url, body, attempts)
        }
        Err(e) => {
            debug!(strategy = %kind, error = %e, attempts, "Fetch failed");
            FetchAttempt::failure(kind, target_url, &e, attempts)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FetchOutcome, PayloadKind};

    #[test]
    fn test_build_fetchers_follows_config_order() {
        let mut config = Config::default();
        config.resolver.strategies = vec![
            StrategyKind::SessionWarmed,
            StrategyKind::Direct,
            StrategyKind::LyricsApi,
        ];

        let kinds: Vec<StrategyKind> = build_fetchers(&config)
            .unwrap()
            .iter()
            .map(|f| f.kind())
            .collect();
        assert_eq!(kinds, config.resolver.strategies);
    }

    #[test]
    fn test_build_every_strategy() {
        let config = Config::default();
        for kind in StrategyKind::ALL {
            assert_eq!(build_fetcher(kind, &config).unwrap().kind(), kind);
        }
    }

    #[test]
    fn test_into_attempt() {
        let ok = into_attempt(StrategyKind::Mirror, "u", Ok("text".into()), 2);
        assert_eq!(ok.payload(), Some(("text", PayloadKind::MirrorText)));
        assert_eq!(ok.attempts, 2);

        let blank = into_attempt(StrategyKind::Direct, "u", Ok("  \n".into()), 1);
        assert!(!blank.is_success());

        let failed = into_attempt(StrategyKind::Direct, "u", Err(FetchError::Forbidden), 3);
        match failed.outcome {
            FetchOutcome::Failure { status, .. } => assert_eq!(status, Some(403)),
            FetchOutcome::Success { .. } => panic!("expected failure"),
        }
    }
}

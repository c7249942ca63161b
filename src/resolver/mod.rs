//! Per-candidate resolution
//!
//! The [`Resolver`] walks an ordered list of fetch strategies for one
//! candidate, runs the extractor on each payload and stops at the first
//! result that passes the acceptance check. Results from different
//! strategies are never merged.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::crawler::{build_fetchers, SessionContext, SourceFetcher};
use crate::metrics;
use crate::models::{Candidate, ExtractionMethod, LyricsText, ResolvedLyrics, StrategyKind};
use crate::parser::LyricsExtractor;
use crate::utils::error::FetchError;

/// Where a candidate's resolution stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    NotStarted,
    /// Trying the strategy at this position
    Trying(usize),
    Succeeded(StrategyKind),
    Exhausted,
}

impl fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => f.write_str("not-started"),
            Self::Trying(i) => write!(f, "trying[{i}]"),
            Self::Succeeded(kind) => write!(f, "succeeded({kind})"),
            Self::Exhausted => f.write_str("exhausted"),
        }
    }
}

/// Ordered fallback over fetch strategies
pub struct Resolver {
    fetchers: Vec<Arc<dyn SourceFetcher>>,
    extractor: LyricsExtractor,
    min_chars: usize,
}

impl Resolver {
    pub fn new(
        fetchers: Vec<Arc<dyn SourceFetcher>>,
        extractor: LyricsExtractor,
        min_chars: usize,
    ) -> Self {
        Self {
            fetchers,
            extractor,
            min_chars,
        }
    }

    /// Build fetchers for the configured strategy order
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Ok(Self::new(
            build_fetchers(config)?,
            LyricsExtractor::new(),
            config.resolver.min_lyrics_chars,
        ))
    }

    /// Strategy order, first to last
    pub fn strategies(&self) -> Vec<StrategyKind> {
        self.fetchers.iter().map(|f| f.kind()).collect()
    }

    /// Acceptance check: a real text of at least the minimum length
    pub fn accepts(&self, text: &LyricsText) -> bool {
        !text.is_sentinel() && text.char_len() >= self.min_chars
    }

    /// Resolve lyrics for one candidate
    ///
    /// Never fails: when every strategy is exhausted the result carries the
    /// last sentinel produced, or [`LyricsText::Unavailable`] when no strategy
    /// produced a payload at all.
    #[instrument(skip_all, fields(title = %candidate.title, artist = %candidate.artist))]
    pub async fn resolve(&self, candidate: &Candidate, session: &SessionContext) -> ResolvedLyrics {
        let mut state = ResolutionState::NotStarted;
        let mut last_sentinel: Option<LyricsText> = None;
        let mut tried = Vec::with_capacity(self.fetchers.len());
        debug!(%state, strategies = self.fetchers.len(), "Resolving candidate");

        for (index, fetcher) in self.fetchers.iter().enumerate() {
            state = ResolutionState::Trying(index);
            let kind = fetcher.kind();
            tried.push(kind);
            debug!(%state, strategy = %kind, "Trying strategy");

            let started = Instant::now();
            let attempt = fetcher.fetch(candidate, session).await;
            metrics::record_fetch_attempt(
                kind,
                attempt.is_success(),
                started.elapsed().as_secs_f64(),
            );

            let Some((payload, payload_kind)) = attempt.payload() else {
                warn!(strategy = %kind, outcome = ?attempt.outcome, "Strategy failed");
                continue;
            };

            let extraction = self.extractor.extract(payload, payload_kind);

            if self.accepts(&extraction.text) {
                state = ResolutionState::Succeeded(kind);
                let method = ExtractionMethod {
                    strategy: kind,
                    payload: payload_kind,
                    locator: extraction.locator,
                };
                info!(
                    %state,
                    method = %method,
                    confidence = method.confidence(),
                    chars = extraction.text.char_len(),
                    "Lyrics resolved"
                );
                metrics::record_resolution(Some(kind));
                return ResolvedLyrics {
                    candidate: candidate.clone(),
                    lyrics: extraction.text,
                    method: Some(method),
                    success: true,
                    tried,
                };
            }

            debug!(
                strategy = %kind,
                chars = extraction.text.char_len(),
                sentinel = extraction.text.is_sentinel(),
                "Extraction rejected"
            );
            last_sentinel = Some(if extraction.text.is_sentinel() {
                extraction.text
            } else {
                LyricsText::NotFound
            });
        }

        state = ResolutionState::Exhausted;
        let lyrics = last_sentinel.unwrap_or(LyricsText::Unavailable);
        warn!(%state, tried = tried.len(), result = %lyrics, "All strategies exhausted");
        metrics::record_resolution(None);

        ResolvedLyrics {
            candidate: candidate.clone(),
            lyrics,
            method: None,
            success: false,
            tried,
        }
    }
}

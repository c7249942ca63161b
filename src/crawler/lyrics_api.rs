//! Lyrics API fetch
//!
//! Looks the song up by artist and title on a lyrics.ovh-compatible API,
//! which answers `{"lyrics": "..."}` or `{"error": "..."}`.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::fetcher::HttpFetcher;
use super::headers::build_api_headers;
use super::session::SessionContext;
use super::{into_attempt, SourceFetcher};
use crate::models::{Candidate, FetchAttempt, StrategyKind};
use crate::utils::error::FetchError;

#[derive(Debug, Deserialize)]
struct LyricsApiResponse {
    #[serde(default)]
    lyrics: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub struct LyricsApiFetcher {
    http: HttpFetcher,
    base_url: String,
}

impl LyricsApiFetcher {
    pub fn new(http: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// `{base}/v1/{artist}/{title}` with both parts percent-encoded
    pub fn lookup_url(&self, artist: &str, title: &str) -> Result<String, FetchError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {e}", self.base_url)))?;

        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["v1", artist, title]);

        Ok(url.into())
    }

    /// Pull the lyric text out of an API answer
    pub fn parse_body(body: &str) -> Result<String, FetchError> {
        let parsed: LyricsApiResponse =
            serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

        match parsed.lyrics {
            Some(lyrics) if !lyrics.trim().is_empty() => Ok(lyrics),
            _ => {
                if let Some(error) = parsed.error {
                    debug!(error = %error, "Lyrics API reported no lyrics");
                }
                Err(FetchError::EmptyPayload)
            }
        }
    }
}

#[async_trait]
impl SourceFetcher for LyricsApiFetcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::LyricsApi
    }

    #[instrument(skip_all, fields(artist = %candidate.artist, title = %candidate.title))]
    async fn fetch(&self, candidate: &Candidate, _session: &SessionContext) -> FetchAttempt {
        let target = match self.lookup_url(&candidate.artist, &candidate.title) {
            Ok(target) => target,
            Err(e) => return FetchAttempt::failure(self.kind(), &self.base_url, &e, 0),
        };
        let target_ref = target.as_str();

        let (result, attempts) = self
            .http
            .with_retry(target_ref, |_| async move {
                self.http
                    .send(target_ref, build_api_headers("application/json"))
                    .await
            })
            .await;

        let result = result.and_then(|body| Self::parse_body(&body));
        into_attempt(self.kind(), target, result, attempts)
    }
}

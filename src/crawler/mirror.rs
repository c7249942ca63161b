//! Text-rendering proxy fetch
//!
//! The proxy renders the lyric page server-side and returns a plain-text
//! dump, which the extractor trims of page chrome.

use async_trait::async_trait;
use tracing::instrument;

use super::fetcher::HttpFetcher;
use super::headers::build_api_headers;
use super::session::SessionContext;
use super::{into_attempt, SourceFetcher};
use crate::models::{Candidate, FetchAttempt, StrategyKind};
use crate::utils::strip_scheme;

pub struct MirrorFetcher {
    http: HttpFetcher,
    base_url: String,
}

impl MirrorFetcher {
    pub fn new(http: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Proxy address for a page: `{base}/http://{host}{path}`
    ///
    /// # Examples
    ///
    /// ```
    /// # use lyricseek::crawler::mirror::MirrorFetcher;
    /// # use lyricseek::crawler::fetcher::HttpFetcher;
    /// # use lyricseek::config::Config;
    /// let http = HttpFetcher::new(&Config::default()).unwrap();
    /// let mirror = MirrorFetcher::new(http, "https://r.jina.ai/");
    /// assert_eq!(
    ///     mirror.mirror_url("https://genius.com/Queen-bohemian-rhapsody-lyrics"),
    ///     "https://r.jina.ai/http://genius.com/Queen-bohemian-rhapsody-lyrics"
    /// );
    /// ```
    pub fn mirror_url(&self, url: &str) -> String {
        format!(
            "{}/http://{}",
            self.base_url.trim_end_matches('/'),
            strip_scheme(url)
        )
    }
}

#[async_trait]
impl SourceFetcher for MirrorFetcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Mirror
    }

    #[instrument(skip_all, fields(url = %candidate.url))]
    async fn fetch(&self, candidate: &Candidate, _session: &SessionContext) -> FetchAttempt {
        let target = self.mirror_url(&candidate.url);
        let target_ref = target.as_str();

        let (result, attempts) = self
            .http
            .with_retry(target_ref, |_| async move {
                self.http
                    .send(target_ref, build_api_headers("text/plain"))
                    .await
            })
            .await;

        into_attempt(self.kind(), target, result, attempts)
    }
}

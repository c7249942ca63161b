//! Direct page fetch with a browser identity

use async_trait::async_trait;
use tracing::instrument;

use super::fetcher::HttpFetcher;
use super::headers::{build_browser_headers, random_profile};
use super::session::SessionContext;
use super::{into_attempt, SourceFetcher};
use crate::models::{Candidate, FetchAttempt, StrategyKind};
use crate::utils::error::FetchError;
use crate::utils::extract_domain;

/// Fetches the lyric page itself with rotating browser headers
///
/// Cookies from a session already held for the host are sent along, but no
/// session is acquired. A 403 drops the host's session before the retry.
pub struct DirectFetcher {
    http: HttpFetcher,
}

impl DirectFetcher {
    pub fn new(http: HttpFetcher) -> Self {
        Self { http }
    }
}

#[async_trait]
impl SourceFetcher for DirectFetcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Direct
    }

    #[instrument(skip_all, fields(url = %candidate.url))]
    async fn fetch(&self, candidate: &Candidate, session: &SessionContext) -> FetchAttempt {
        let url = candidate.url.as_str();
        let Ok(host) = extract_domain(url) else {
            return FetchAttempt::failure(
                self.kind(),
                url,
                &FetchError::InvalidUrl(url.to_string()),
                0,
            );
        };
        let host = host.as_str();

        let (result, attempts) = self
            .http
            .with_retry(url, |ctx| async move {
                if ctx.after_forbidden {
                    session.reset(host);
                }
                let held = session.get(host);
                let cookie = held.as_ref().map(|s| s.cookie_header.as_str());
                let headers = build_browser_headers(random_profile(), None, cookie);
                self.http.send(url, headers).await
            })
            .await;

        into_attempt(self.kind(), url, result, attempts)
    }
}

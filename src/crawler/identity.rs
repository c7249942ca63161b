//! Single attempt under a search-crawler identity

use async_trait::async_trait;
use tracing::instrument;

use super::fetcher::HttpFetcher;
use super::headers::build_crawler_headers;
use super::session::SessionContext;
use super::{into_attempt, SourceFetcher};
use crate::models::{Candidate, FetchAttempt, StrategyKind};

/// Fetches the page once as a well-known crawler, with no retry
pub struct AlternateIdentityFetcher {
    http: HttpFetcher,
    user_agent: String,
}

impl AlternateIdentityFetcher {
    pub fn new(http: HttpFetcher, user_agent: impl Into<String>) -> Self {
        Self {
            http: http.with_max_attempts(1),
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl SourceFetcher for AlternateIdentityFetcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::AlternateIdentity
    }

    #[instrument(skip_all, fields(url = %candidate.url))]
    async fn fetch(&self, candidate: &Candidate, _session: &SessionContext) -> FetchAttempt {
        let url = candidate.url.as_str();

        let result = match build_crawler_headers(&self.user_agent) {
            Ok(headers) => self.http.send(url, headers).await,
            Err(e) => Err(e),
        };

        into_attempt(self.kind(), url, result, 1)
    }
}

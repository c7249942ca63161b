//! Session-warmed fetch
//!
//! Visits the site's landing page first to collect cookies, waits a random
//! human-like pause, then requests the lyric page with those cookies and the
//! landing page as referer.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, instrument};

use super::fetcher::HttpFetcher;
use super::headers::{build_browser_headers, random_profile};
use super::session::{SessionContext, SessionState};
use super::{into_attempt, SourceFetcher};
use crate::models::{Candidate, FetchAttempt, StrategyKind};
use crate::utils::error::FetchError;
use crate::utils::{extract_domain, landing_page};

pub struct SessionWarmedFetcher {
    http: HttpFetcher,
    /// Pause range between warm-up and the page request, in milliseconds
    warmup_delay_ms: (u64, u64),
}

impl SessionWarmedFetcher {
    pub fn new(http: HttpFetcher, warmup_delay_min_ms: u64, warmup_delay_max_ms: u64) -> Self {
        Self {
            http,
            warmup_delay_ms: (
                warmup_delay_min_ms.min(warmup_delay_max_ms),
                warmup_delay_max_ms.max(warmup_delay_min_ms),
            ),
        }
    }

    /// GET the landing page and keep whatever cookies it sets
    async fn warm_up(&self, landing: &str) -> Result<SessionState, FetchError> {
        let headers = build_browser_headers(random_profile(), None, None);
        let response = self.http.send_raw(landing, headers).await?;
        let response = self.http.check_status(response)?;

        let cookies: Vec<(String, String)> = response
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();
        debug!(landing, cookies = cookies.len(), "Warm-up visit done");

        Ok(SessionState::from_cookies(
            cookies.iter().map(|(n, v)| (n.as_str(), v.as_str())),
            landing,
        ))
    }

    fn pause(&self) -> Duration {
        let (min, max) = self.warmup_delay_ms;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

#[async_trait]
impl SourceFetcher for SessionWarmedFetcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SessionWarmed
    }

    #[instrument(skip_all, fields(url = %candidate.url))]
    async fn fetch(&self, candidate: &Candidate, session: &SessionContext) -> FetchAttempt {
        let url = candidate.url.as_str();
        let (Ok(host), Ok(landing)) = (extract_domain(url), landing_page(url)) else {
            return FetchAttempt::failure(
                self.kind(),
                url,
                &FetchError::InvalidUrl(url.to_string()),
                0,
            );
        };
        let (host, landing) = (host.as_str(), landing.as_str());

        let (result, attempts) = self
            .http
            .with_retry(url, |ctx| async move {
                if ctx.after_forbidden {
                    session.reset(host);
                }

                let state = session
                    .get_or_acquire(host, || self.warm_up(landing))
                    .await?;

                tokio::time::sleep(self.pause()).await;

                let headers = build_browser_headers(
                    random_profile(),
                    Some(&state.landing_page),
                    Some(&state.cookie_header),
                );
                self.http.send(url, headers).await
            })
            .await;

        into_attempt(self.kind(), url, result, attempts)
    }
}

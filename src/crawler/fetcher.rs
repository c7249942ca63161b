//! Shared HTTP core for the lyric source fetchers
//!
//! This module provides the request machinery every fetch strategy builds on:
//! - Rate limiting with governor
//! - Bounded retry with exponential backoff and jitter
//! - A cooldown after HTTP 429, scoped to the fetcher instance
//! - Charset detection and conversion with encoding_rs

use encoding_rs::{Encoding, UTF_8};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{header::HeaderMap, redirect::Policy, Client, Response};
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::Config;
use crate::utils::error::FetchError;
use crate::utils::retry::RetryConfig;

/// What the retry loop tells a request builder about the coming attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptContext {
    /// 0-based attempt number
    pub attempt: u32,
    /// The previous attempt was answered with 403
    pub after_forbidden: bool,
}

/// HTTP client with rate limiting, retry and 429 cooldown
pub struct HttpFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// Backoff schedule between attempts
    retry: RetryConfig,

    /// Pause applied after a 429 before the next request
    cooldown: Duration,

    /// End of the current 429 cooldown
    cooldown_until: Mutex<Option<Instant>>,
}

impl HttpFetcher {
    /// Create a fetcher from the `[fetch]` configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        Self::with_settings(
            config.request_timeout(),
            config.retry_config(),
            config.fetch.requests_per_second,
            Duration::from_millis(config.fetch.rate_limit_cooldown_ms),
        )
    }

    /// Create a fetcher with explicit settings
    pub fn with_settings(
        timeout: Duration,
        retry: RetryConfig,
        requests_per_second: u32,
        cooldown: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .redirect(Policy::limited(10))
            .build()?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            retry,
            cooldown,
            cooldown_until: Mutex::new(None),
        })
    }

    /// Same settings with a different retry bound
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.retry.max_attempts = max_attempts;
        self
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Issue one rate-limited GET and return the raw response
    ///
    /// Waits out any active 429 cooldown first. The status is not checked.
    pub async fn send_raw(&self, url: &str, headers: HeaderMap) -> Result<Response, FetchError> {
        self.wait_for_cooldown().await;
        self.rate_limiter.until_ready().await;

        self.client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Http(e)
                }
            })
    }

    /// Issue one GET and decode a successful body
    ///
    /// A 429 answer starts the cooldown.
    pub async fn send(&self, url: &str, headers: HeaderMap) -> Result<String, FetchError> {
        let response = self.send_raw(url, headers).await?;
        let response = self.check_status(response)?;
        Self::decode_response(response).await
    }

    /// Map a non-success status to its error
    pub fn check_status(&self, response: Response) -> Result<Response, FetchError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => {
                self.start_cooldown();
                Err(FetchError::RateLimit)
            }
            403 => Err(FetchError::Forbidden),
            code => Err(FetchError::ServerError(code)),
        }
    }

    /// Run `attempt_fn` until it succeeds, fails terminally or the bound is hit
    ///
    /// Returns the outcome together with the number of attempts made.
    pub async fn with_retry<F, Fut>(
        &self,
        url: &str,
        mut attempt_fn: F,
    ) -> (Result<String, FetchError>, u32)
    where
        F: FnMut(AttemptContext) -> Fut,
        Fut: Future<Output = Result<String, FetchError>>,
    {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut last_error: Option<FetchError> = None;

        for attempt in 0..max_attempts {
            // Apply exponential backoff for retries
            if attempt > 0 {
                let delay = self.retry.delay_for(attempt);
                debug!(url, attempt, delay_ms = delay.as_millis() as u64, "Retrying fetch");
                tokio::time::sleep(delay).await;
            }

            let ctx = AttemptContext {
                attempt,
                after_forbidden: matches!(last_error, Some(FetchError::Forbidden)),
            };

            match attempt_fn(ctx).await {
                Ok(body) => return (Ok(body), attempt + 1),
                Err(e) if Self::is_retryable(&e) => {
                    debug!(url, attempt, error = %e, "Retryable fetch failure");
                    last_error = Some(e);
                }
                Err(e) => return (Err(e), attempt + 1),
            }
        }

        let last = last_error.map(|e| e.to_string()).unwrap_or_default();
        warn!(url, attempts = max_attempts, last = %last, "Fetch retries exhausted");
        (Err(FetchError::MaxRetriesExceeded { last }), max_attempts)
    }

    /// Determine if a status code should trigger a retry
    ///
    /// 403 is retried because the caller may refresh its session first.
    /// Other 4xx codes are final.
    pub fn should_retry(status: u16) -> bool {
        matches!(status, 403 | 429 | 500 | 502 | 503 | 504)
    }

    fn is_retryable(error: &FetchError) -> bool {
        match error {
            FetchError::Timeout => true,
            FetchError::Http(e) => e.is_connect() || e.is_request() || e.is_body(),
            other => other.status().is_some_and(Self::should_retry),
        }
    }

    fn start_cooldown(&self) {
        let until = Instant::now() + self.cooldown;
        let mut guard = self.cooldown_until.lock().unwrap_or_else(|e| e.into_inner());
        // Never shorten a cooldown already in force
        if guard.map_or(true, |current| current < until) {
            *guard = Some(until);
        }
        warn!(cooldown_ms = self.cooldown.as_millis() as u64, "Rate limited, cooling down");
    }

    /// Remaining cooldown, if any
    pub fn cooldown_remaining(&self) -> Option<Duration> {
        let guard = self.cooldown_until.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .map(|until| until.saturating_duration_since(Instant::now()))
            .filter(|d| !d.is_zero())
    }

    async fn wait_for_cooldown(&self) {
        if let Some(remaining) = self.cooldown_remaining() {
            debug!(remaining_ms = remaining.as_millis() as u64, "Waiting for cooldown");
            tokio::time::sleep(remaining).await;
        }
    }

    /// Decode a response body using its declared or sniffed charset
    pub async fn decode_response(response: Response) -> Result<String, FetchError> {
        // Get Content-Type header before consuming the response
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let bytes = response.bytes().await?;

        Ok(Self::decode_bytes(&bytes, &content_type))
    }

    /// Decode bytes to a string
    ///
    /// Tries, in order: the Content-Type charset, strict UTF-8, a `<meta>`
    /// charset in the first kilobyte, then lossy UTF-8.
    pub fn decode_bytes(bytes: &[u8], content_type: &str) -> String {
        if let Some(encoding) = charset_from(content_type) {
            let (text, _, _) = encoding.decode(bytes);
            return text.into_owned();
        }

        if let Ok(text) = std::str::from_utf8(bytes) {
            return text.to_string();
        }

        let head = String::from_utf8_lossy(&bytes[..bytes.len().min(1024)]);
        if let Some(encoding) = charset_from(&head) {
            let (text, _, _) = encoding.decode(bytes);
            return text.into_owned();
        }

        let (text, _, _) = UTF_8.decode(bytes);
        text.into_owned()
    }
}

/// Find a `charset=` label in a header value or markup snippet
fn charset_from(text: &str) -> Option<&'static Encoding> {
    let lower = text.to_ascii_lowercase();
    let start = lower.find("charset=")? + "charset=".len();
    let label: String = lower[start..]
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
        .collect();
    Encoding::for_label(label.as_bytes())
}

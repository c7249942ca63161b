//! Genius search API client

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info, instrument};

use super::SongSearch;
use crate::config::Config;
use crate::metrics;
use crate::models::{Candidate, ReleaseDate};
use crate::utils::error::SearchError;
use crate::utils::retry::{with_retry_if, RetryConfig};

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    response: Option<SearchResponse>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    result: Option<SongResult>,
}

#[derive(Debug, Deserialize)]
struct SongResult {
    title: String,
    #[serde(default)]
    full_title: Option<String>,
    url: String,
    primary_artist: Artist,
    #[serde(default)]
    release_date_components: Option<DateComponents>,
    #[serde(default)]
    annotation_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct DateComponents {
    year: Option<u32>,
    month: Option<u32>,
    day: Option<u32>,
}

impl From<SongResult> for Candidate {
    fn from(song: SongResult) -> Self {
        let mut candidate = Candidate::new(song.title, song.primary_artist.name, song.url);
        if let Some(full_title) = song.full_title.filter(|t| !t.trim().is_empty()) {
            candidate.full_title = full_title;
        }
        if let Some(date) = song.release_date_components {
            candidate.release_date = ReleaseDate::new(date.year, date.month, date.day);
        }
        candidate.annotation_count = song.annotation_count.unwrap_or(0);
        candidate
    }
}

/// Song search against the Genius API
pub struct GeniusSearch {
    client: Client,
    api_url: String,
    access_token: Option<String>,
    retry: RetryConfig,
}

impl GeniusSearch {
    pub fn new(
        api_url: impl Into<String>,
        access_token: Option<String>,
        retry: RetryConfig,
        timeout: std::time::Duration,
    ) -> Result<Self, SearchError> {
        let client = Client::builder().timeout(timeout).gzip(true).build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            access_token,
            retry,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SearchError> {
        Self::new(
            config.search.api_url.clone(),
            config.search.access_token.clone(),
            config.search_retry_config(),
            config.request_timeout(),
        )
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.api_url.trim_end_matches('/'))
    }

    async fn search_once(&self, query: &str, token: &HeaderValue) -> Result<Vec<Candidate>, SearchError> {
        let response = self
            .client
            .get(self.search_url())
            .query(&[("q", query)])
            .header(AUTHORIZATION, token.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Self::parse_hits(&body)
    }

    /// Turn a search response body into candidates, in provider order
    pub fn parse_hits(body: &str) -> Result<Vec<Candidate>, SearchError> {
        let envelope: SearchEnvelope =
            serde_json::from_str(body).map_err(|e| SearchError::Malformed(e.to_string()))?;

        let response = envelope
            .response
            .ok_or_else(|| SearchError::Malformed("missing `response` object".to_string()))?;

        let candidates = response
            .hits
            .into_iter()
            .enumerate()
            .map(|(index, hit)| {
                hit.result.map(Candidate::from).ok_or_else(|| {
                    SearchError::Malformed(format!("hit {index} has no `result` object"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(candidates = candidates.len(), "Parsed search hits");
        Ok(candidates)
    }
}

#[async_trait]
impl SongSearch for GeniusSearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<Candidate>, SearchError> {
        let token = self
            .access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SearchError::NotConfigured("GENIUS_ACCESS_TOKEN is not set".to_string()))?;
        let token = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| SearchError::NotConfigured("access token is not a valid header".to_string()))?;

        let started = Instant::now();
        let result = with_retry_if(
            &self.retry,
            || self.search_once(query, &token),
            SearchError::is_transient,
        )
        .await;

        let count = result.as_ref().map_or(0, Vec::len);
        metrics::record_search(result.is_ok(), count, started.elapsed().as_secs_f64());
        if result.is_ok() {
            info!(candidates = count, "Song search finished");
        }
        result
    }
}

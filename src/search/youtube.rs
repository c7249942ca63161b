//! Video id lookup from the YouTube results page
//!
//! The results page embeds its initial data as JSON; video ids appear there
//! as `"videoId":"<11 chars>"` in result order.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use super::VideoLookup;
use crate::config::Config;
use crate::crawler::headers::{build_browser_headers, random_profile};
use crate::utils::error::SearchError;

static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""videoId":"([A-Za-z0-9_-]{11})""#).unwrap());

pub struct YoutubeLookup {
    client: Client,
    base_url: String,
}

impl YoutubeLookup {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SearchError> {
        let client = Client::builder().timeout(timeout).gzip(true).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SearchError> {
        Self::new(config.batch.video_url.clone(), config.video_timeout())
    }

    fn results_url(&self, query: &str) -> Result<Url, SearchError> {
        let base = format!("{}/results", self.base_url.trim_end_matches('/'));
        Url::parse_with_params(&base, &[("search_query", query)])
            .map_err(|e| SearchError::NotConfigured(format!("video URL {base}: {e}")))
    }

    /// Video ids in page order, without repeats
    pub fn parse_video_ids(page: &str) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for caps in VIDEO_ID.captures_iter(page) {
            let id = &caps[1];
            if !ids.iter().any(|seen| seen == id) {
                ids.push(id.to_string());
            }
        }
        ids
    }
}

#[async_trait]
impl VideoLookup for YoutubeLookup {
    #[instrument(skip(self))]
    async fn lookup(&self, query: &str) -> Result<Vec<String>, SearchError> {
        let url = self.results_url(query)?;
        let response = self
            .client
            .get(url)
            .headers(build_browser_headers(random_profile(), None, None))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let page = response.text().await?;
        let ids = Self::parse_video_ids(&page);
        debug!(found = ids.len(), "Video lookup finished");
        Ok(ids)
    }
}

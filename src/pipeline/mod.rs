//! Batch coordination and the `resolve` entry point
//!
//! A query is searched once, the candidates are ranked, and every ranked
//! candidate is resolved in its own task. Task starts are staggered by
//! position, concurrency is capped by a semaphore, and each task pairs the
//! lyric resolution with a bounded video lookup. The output keeps the ranked
//! order no matter which task finishes first.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::config::{BatchConfig, Config};
use crate::crawler::SessionContext;
use crate::error::{Error, ResolveError};
use crate::metrics;
use crate::models::{Candidate, ResultRecord};
use crate::ranking;
use crate::resolver::Resolver;
use crate::search::{GeniusSearch, SongSearch, VideoLookup, YoutubeLookup};

/// Search, rank and resolve lyrics for a query
pub struct LyricsPipeline {
    search: Arc<dyn SongSearch>,
    videos: Option<Arc<dyn VideoLookup>>,
    resolver: Arc<Resolver>,
    batch: BatchConfig,
}

impl LyricsPipeline {
    pub fn new(
        search: Arc<dyn SongSearch>,
        videos: Option<Arc<dyn VideoLookup>>,
        resolver: Resolver,
        batch: BatchConfig,
    ) -> Self {
        Self {
            search,
            videos,
            resolver: Arc::new(resolver),
            batch,
        }
    }

    /// Wire the Genius search, YouTube lookup and configured strategies
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        config.validate()?;

        let search: Arc<dyn SongSearch> = Arc::new(GeniusSearch::from_config(config)?);
        let videos: Option<Arc<dyn VideoLookup>> = if config.batch.video_lookup {
            Some(Arc::new(YoutubeLookup::from_config(config)?))
        } else {
            None
        };
        let resolver = Resolver::from_config(config)?;

        Ok(Self::new(search, videos, resolver, config.batch.clone()))
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Resolve a free-text query into ranked result records
    ///
    /// Fails only when the search itself fails or finds nothing; every
    /// candidate found yields exactly one record.
    #[instrument(skip(self))]
    pub async fn resolve(&self, query: &str) -> Result<Vec<ResultRecord>, ResolveError> {
        let candidates = self.search.search(query).await?;
        if candidates.is_empty() {
            info!("Search returned no candidates");
            return Err(ResolveError::NoMatches);
        }

        let ranked = ranking::rank(candidates, query);
        Ok(self.run_batch(ranked).await)
    }

    /// Resolve already-ranked candidates, one record per candidate in order
    pub async fn run_batch(&self, ranked: Vec<Candidate>) -> Vec<ResultRecord> {
        let total = ranked.len();
        info!(candidates = total, "Batch started");
        metrics::record_batch(total);

        // Owned by this batch only
        let session = Arc::new(SessionContext::new());
        let permits = Arc::new(Semaphore::new(self.batch.max_concurrent.max(1)));
        let stagger = Duration::from_millis(self.batch.stagger_ms);
        let video_timeout = Duration::from_secs(self.batch.video_timeout_secs);

        let handles: Vec<JoinHandle<ResultRecord>> = ranked
            .iter()
            .enumerate()
            .map(|(index, candidate)| {
                let candidate = candidate.clone();
                let resolver = Arc::clone(&self.resolver);
                let videos = self.videos.clone();
                let session = Arc::clone(&session);
                let permits = Arc::clone(&permits);
                let delay = stagger.saturating_mul(index as u32);

                tokio::spawn(async move {
                    // Issuance delay only; it never holds a permit
                    tokio::time::sleep(delay).await;
                    let _permit = permits.acquire_owned().await.ok();
                    let _in_flight = metrics::track_in_flight();

                    let (resolved, video_id) = tokio::join!(
                        resolver.resolve(&candidate, &session),
                        lookup_video(videos.as_deref(), &candidate, video_timeout),
                    );

                    ResultRecord::new(index + 1, resolved, video_id)
                })
            })
            .collect();

        // Dropping the batch future aborts whatever is still running
        let mut tasks = AbortOnDrop(handles);

        let mut records = Vec::with_capacity(total);
        for (index, handle) in tasks.0.iter_mut().enumerate() {
            match handle.await {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(rank = index + 1, error = %e, "Candidate task failed");
                    metrics::record_degraded_record();
                    records.push(ResultRecord::degraded(index + 1, &ranked[index]));
                }
            }
        }

        let with_lyrics = records.iter().filter(|r| r.has_lyrics()).count();
        info!(candidates = total, with_lyrics, "Batch finished");
        records
    }
}

/// Candidate tasks owned by one batch
struct AbortOnDrop(Vec<JoinHandle<ResultRecord>>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// First video id for a candidate, or `None` on any failure or timeout
async fn lookup_video(
    videos: Option<&dyn VideoLookup>,
    candidate: &Candidate,
    timeout: Duration,
) -> Option<String> {
    let videos = videos?;
    let query = candidate.video_query();

    match tokio::time::timeout(timeout, videos.lookup(&query)).await {
        Ok(Ok(ids)) => {
            let first = ids.into_iter().next();
            metrics::record_video_lookup(if first.is_some() { "found" } else { "none" });
            first
        }
        Ok(Err(e)) => {
            warn!(query = %query, error = %e, "Video lookup failed");
            metrics::record_video_lookup("error");
            None
        }
        Err(_) => {
            warn!(query = %query, timeout_secs = timeout.as_secs(), "Video lookup timed out");
            metrics::record_video_lookup("timeout");
            None
        }
    }
}

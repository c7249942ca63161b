//! Prometheus metrics for the lyric resolution pipeline
//!
//! This module provides metrics tracking for:
//! - Search: provider calls, their latency, candidates returned
//! - Resolver: fetch attempts per strategy, accepted strategies, exhaustion
//! - Batch: video lookups, degraded records, tasks in flight
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, metrics operations become no-ops.

use prometheus::{
    register_counter, register_counter_vec, register_gauge, register_histogram,
    register_histogram_vec, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramVec,
    TextEncoder,
};
use std::sync::OnceLock;

use crate::models::StrategyKind;

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for search metrics
struct SearchMetrics {
    requests: CounterVec,
    duration: Histogram,
    candidates: Counter,
}

/// Container for resolver and batch metrics
struct ResolverMetrics {
    fetch_attempts: CounterVec,
    fetch_duration: HistogramVec,
    resolutions: CounterVec,
    video_lookups: CounterVec,
    degraded_records: Counter,
    tasks_in_flight: Gauge,
    batch_size: Histogram,
}

static SEARCH_METRICS: OnceLock<SearchMetrics> = OnceLock::new();

static RESOLVER_METRICS: OnceLock<ResolverMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// This function should be called once at application startup.
/// If metric registration fails, subsequent metric operations become no-ops.
///
/// # Example
///
/// ```ignore
/// if let Err(e) = lyricseek::metrics::init_metrics() {
///     eprintln!("Warning: Metrics initialization failed: {}", e);
/// }
/// ```
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    // Prevent double initialization
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let search = SearchMetrics {
        requests: register_counter_vec!(
            "lyricseek_search_requests_total",
            "Song search calls by outcome",
            &["outcome"]
        )?,
        duration: register_histogram!(
            "lyricseek_search_duration_seconds",
            "Song search latency in seconds",
            vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
        )?,
        candidates: register_counter!(
            "lyricseek_search_candidates_total",
            "Candidates returned by song search"
        )?,
    };

    let resolver = ResolverMetrics {
        fetch_attempts: register_counter_vec!(
            "lyricseek_fetch_attempts_total",
            "Fetch attempts by strategy and outcome",
            &["strategy", "outcome"]
        )?,
        fetch_duration: register_histogram_vec!(
            "lyricseek_fetch_duration_seconds",
            "Fetch duration per strategy in seconds",
            &["strategy"],
            vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
        )?,
        resolutions: register_counter_vec!(
            "lyricseek_resolutions_total",
            "Candidate resolutions by accepted strategy (or exhausted)",
            &["strategy"]
        )?,
        video_lookups: register_counter_vec!(
            "lyricseek_video_lookups_total",
            "Video id lookups by outcome",
            &["outcome"]
        )?,
        degraded_records: register_counter!(
            "lyricseek_degraded_records_total",
            "Records degraded because their resolution task died"
        )?,
        tasks_in_flight: register_gauge!(
            "lyricseek_tasks_in_flight",
            "Candidate resolution tasks currently running"
        )?,
        batch_size: register_histogram!(
            "lyricseek_batch_size",
            "Ranked candidates per resolve call",
            vec![1.0, 2.0, 5.0, 10.0, 20.0, 50.0]
        )?,
    };

    SEARCH_METRICS
        .set(search)
        .map_err(|_| "Search metrics already initialized")?;
    RESOLVER_METRICS
        .set(resolver)
        .map_err(|_| "Resolver metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    SEARCH_METRICS.get().is_some() && RESOLVER_METRICS.get().is_some()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Prometheus text of everything recorded so far, `None` when metrics are off
pub fn report() -> Option<String> {
    if !metrics_initialized() {
        return None;
    }
    match encode_metrics() {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode metrics");
            None
        }
    }
}

/// Record a song search call
pub fn record_search(success: bool, candidates: usize, duration_secs: f64) {
    let Some(m) = SEARCH_METRICS.get() else {
        return;
    };

    let outcome = if success { "success" } else { "failure" };
    m.requests.with_label_values(&[outcome]).inc();
    m.duration.observe(duration_secs);
    m.candidates.inc_by(candidates as f64);
}

/// Record one strategy's fetch attempt
pub fn record_fetch_attempt(strategy: StrategyKind, success: bool, duration_secs: f64) {
    let Some(m) = RESOLVER_METRICS.get() else {
        return;
    };

    let outcome = if success { "success" } else { "failure" };
    m.fetch_attempts
        .with_label_values(&[strategy.as_str(), outcome])
        .inc();
    m.fetch_duration
        .with_label_values(&[strategy.as_str()])
        .observe(duration_secs);
}

/// Record how a candidate resolved; `None` means every strategy was exhausted
pub fn record_resolution(accepted: Option<StrategyKind>) {
    if let Some(m) = RESOLVER_METRICS.get() {
        let label = accepted.map_or("exhausted", |s| s.as_str());
        m.resolutions.with_label_values(&[label]).inc();
    }
}

/// Record a video lookup outcome: "found", "none", "error" or "timeout"
pub fn record_video_lookup(outcome: &str) {
    if let Some(m) = RESOLVER_METRICS.get() {
        m.video_lookups.with_label_values(&[outcome]).inc();
    }
}

/// Record the number of ranked candidates in a batch
pub fn record_batch(size: usize) {
    if let Some(m) = RESOLVER_METRICS.get() {
        m.batch_size.observe(size as f64);
    }
}

pub fn record_degraded_record() {
    if let Some(m) = RESOLVER_METRICS.get() {
        m.degraded_records.inc();
    }
}

/// Gauge guard counting a running resolution task until dropped
pub struct InFlightGuard {
    active: bool,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.active {
            if let Some(m) = RESOLVER_METRICS.get() {
                m.tasks_in_flight.dec();
            }
        }
    }
}

/// Mark a resolution task as running
pub fn track_in_flight() -> InFlightGuard {
    match RESOLVER_METRICS.get() {
        Some(m) => {
            m.tasks_in_flight.inc();
            InFlightGuard { active: true }
        }
        None => InFlightGuard { active: false },
    }
}

//! Error scenario integration tests
//!
//! Tests various failure modes and error handling:
//! 1. Search provider failures (5xx, 401, malformed bodies, no token)
//! 2. Empty search results
//! 3. Pages that yield no usable lyrics
//! 4. Strategy exhaustion

use lyricseek::error::{LyricseekErrorTrait, ResolveError, SearchError};
use lyricseek::models::{StrategyKind, NOT_AVAILABLE, NOT_FOUND, NOT_FOUND_DUE_TO_ERROR};
use lyricseek::pipeline::LyricsPipeline;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{empty_search_response, search_response, Hit, BINARY_HTML, SHORT_LYRICS_HTML};
use crate::common::test_config;

fn pipeline_for(uri: &str, strategies: Vec<StrategyKind>) -> LyricsPipeline {
    let mut config = test_config(uri);
    config.resolver.strategies = strategies;
    config.batch.video_lookup = false;
    LyricsPipeline::from_config(&config).unwrap()
}

async fn mount_single_hit(server: &MockServer, page_path: &str) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_response(
            &server.uri(),
            &[Hit {
                title: "Song",
                artist: "Artist",
                path: page_path,
                year: None,
                annotations: 0,
            }],
        )))
        .mount(server)
        .await;
}

// ============================================================================
// Search Failures
// ============================================================================

#[tokio::test]
async fn test_search_server_error_is_retried_then_surfaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let pipeline = pipeline_for(&mock_server.uri(), vec![StrategyKind::Direct]);
    let err = pipeline.resolve("anything").await.unwrap_err();

    assert!(matches!(
        err,
        ResolveError::UpstreamSearchUnavailable(SearchError::Status(500))
    ));
    assert!(err.is_recoverable());
    assert!(!err.is_empty_result());
}

#[tokio::test]
async fn test_search_unauthorized_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    let pipeline = pipeline_for(&mock_server.uri(), vec![StrategyKind::Direct]);
    let err = pipeline.resolve("anything").await.unwrap_err();

    assert!(matches!(
        err,
        ResolveError::UpstreamSearchUnavailable(SearchError::Status(401))
    ));
}

#[tokio::test]
async fn test_search_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let pipeline = pipeline_for(&mock_server.uri(), vec![StrategyKind::Direct]);
    let err = pipeline.resolve("anything").await.unwrap_err();

    assert!(matches!(
        err,
        ResolveError::UpstreamSearchUnavailable(SearchError::Malformed(_))
    ));
}

#[tokio::test]
async fn test_missing_token_never_calls_provider() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_search_response()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = test_config(&mock_server.uri());
    config.search.access_token = None;
    let pipeline = LyricsPipeline::from_config(&config).unwrap();
    let err = pipeline.resolve("anything").await.unwrap_err();

    assert!(matches!(
        err,
        ResolveError::UpstreamSearchUnavailable(SearchError::NotConfigured(_))
    ));
    assert!(!err.is_recoverable());
}

#[tokio::test]
async fn test_no_matches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_search_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let pipeline = pipeline_for(&mock_server.uri(), vec![StrategyKind::Direct]);
    let err = pipeline.resolve("zzzz qqqq").await.unwrap_err();

    assert!(matches!(err, ResolveError::NoMatches));
    assert!(err.is_empty_result());
}

// ============================================================================
// Per-candidate Failures
// ============================================================================

#[tokio::test]
async fn test_short_lyrics_give_not_found() {
    let mock_server = MockServer::start().await;
    mount_single_hit(&mock_server, "/short").await;

    Mock::given(method("GET"))
        .and(path("/short"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SHORT_LYRICS_HTML))
        .mount(&mock_server)
        .await;

    let pipeline = pipeline_for(&mock_server.uri(), vec![StrategyKind::Direct]);
    let records = pipeline.resolve("song").await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].lyrics_text, NOT_FOUND);
}

#[tokio::test]
async fn test_binary_page_gives_extraction_error() {
    let mock_server = MockServer::start().await;
    mount_single_hit(&mock_server, "/binary").await;

    Mock::given(method("GET"))
        .and(path("/binary"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BINARY_HTML))
        .mount(&mock_server)
        .await;

    let pipeline = pipeline_for(&mock_server.uri(), vec![StrategyKind::Direct]);
    let records = pipeline.resolve("song").await.unwrap();

    assert_eq!(records[0].lyrics_text, NOT_FOUND_DUE_TO_ERROR);
    assert_ne!(records[0].lyrics_text, NOT_FOUND);
}

#[tokio::test]
async fn test_every_strategy_failing_gives_not_available() {
    let mock_server = MockServer::start().await;
    mount_single_hit(&mock_server, "/gone").await;

    // Page, mirror and lyrics API all answer 404
    let pipeline = pipeline_for(
        &mock_server.uri(),
        vec![
            StrategyKind::Direct,
            StrategyKind::AlternateIdentity,
            StrategyKind::Mirror,
            StrategyKind::LyricsApi,
        ],
    );
    let records = pipeline.resolve("song").await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Song");
    assert_eq!(records[0].lyrics_text, NOT_AVAILABLE);
    assert!(!records[0].has_lyrics());
}

#[tokio::test]
async fn test_later_sentinel_replaces_earlier_one() {
    let mock_server = MockServer::start().await;
    mount_single_hit(&mock_server, "/binary").await;

    // Direct gets a binary page, the mirror a page with nothing in it
    Mock::given(method("GET"))
        .and(path("/binary"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BINARY_HTML))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(wiremock::matchers::path_regex("^/http://"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Sign in"))
        .mount(&mock_server)
        .await;

    let pipeline = pipeline_for(
        &mock_server.uri(),
        vec![StrategyKind::Direct, StrategyKind::Mirror],
    );
    let records = pipeline.resolve("song").await.unwrap();

    assert_eq!(records[0].lyrics_text, NOT_FOUND);
}

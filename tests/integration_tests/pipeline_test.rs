//! End-to-end pipeline tests
//!
//! Search, ranking, strategy fallback and video lookup against one mock
//! server standing in for every upstream.

use lyricseek::models::{StrategyKind, NOT_AVAILABLE};
use lyricseek::pipeline::LyricsPipeline;
use std::time::Duration;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{load_fixture, search_response, video_results_page, Hit, LANDING_HTML};
use crate::common::{lyric_page, test_config};

const QUEEN_VIDEO: &str = "fJ9rUzIMcZQ";

async fn mount_search(server: &MockServer, query: &str, hits: &[Hit<'_>]) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", query))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_response(&server.uri(), hits)))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_resolve_with_fallback_and_videos() {
    let mock_server = MockServer::start().await;

    // Provider order differs from the expected ranking
    mount_search(
        &mock_server,
        "bohemian rhapsody",
        &[
            Hit {
                title: "Bohemian Rhapsody (Live Aid)",
                artist: "Queen",
                path: "/queen-bohemian-rhapsody-live-aid-lyrics",
                year: Some(1985),
                annotations: 4,
            },
            Hit {
                title: "Bohemian Rhapsody",
                artist: "Panic! at the Disco",
                path: "/panic-at-the-disco-bohemian-rhapsody-lyrics",
                year: Some(2015),
                annotations: 2,
            },
            Hit {
                title: "Bohemian Rhapsody",
                artist: "Queen",
                path: "/queen-bohemian-rhapsody-lyrics",
                year: Some(1975),
                annotations: 52,
            },
        ],
    )
    .await;

    // Studio version: direct fetch works
    Mock::given(method("GET"))
        .and(path("/queen-bohemian-rhapsody-lyrics"))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("genius_modern.html")))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Live version: direct fetch times out, the mirror answers
    Mock::given(method("GET"))
        .and(path("/queen-bohemian-rhapsody-live-aid-lyrics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(load_fixture("genius_modern.html"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/http://.*live-aid-lyrics$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("mirror_dump.txt")))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Cover version: nothing is mounted, so every strategy gets a 404

    // One video query hangs past the lookup timeout
    Mock::given(method("GET"))
        .and(path("/results"))
        .and(query_param("search_query", "Bohemian Rhapsody Panic! at the Disco"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(video_results_page(&["aaaaaaaaaaa"]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/results"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(video_results_page(&[QUEEN_VIDEO, "bbbbbbbbbbb"])),
        )
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let pipeline = LyricsPipeline::from_config(&config).unwrap();
    let records = pipeline.resolve("bohemian rhapsody").await.unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(
        records.iter().map(|r| r.rank).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );

    let studio = &records[0];
    assert_eq!(studio.artist, "Queen");
    assert_eq!(studio.title, "Bohemian Rhapsody");
    assert_eq!(studio.video_id.as_deref(), Some(QUEEN_VIDEO));
    assert!(studio.lyrics_text.starts_with("[Intro]\nIs this the real life?"));
    assert!(studio.lyrics_text.contains("[Verse 1]"));

    let cover = &records[1];
    assert_eq!(cover.artist, "Panic! at the Disco");
    assert_eq!(cover.video_id, None);
    assert_eq!(cover.lyrics_text, NOT_AVAILABLE);

    let live = &records[2];
    assert_eq!(live.title, "Bohemian Rhapsody (Live Aid)");
    assert_eq!(live.video_id.as_deref(), Some(QUEEN_VIDEO));
    assert!(live.lyrics_text.starts_with("[Intro]"));
    assert!(!live.lyrics_text.contains("Embed"));
}

#[tokio::test]
async fn test_lyrics_api_fallback() {
    let mock_server = MockServer::start().await;

    mount_search(
        &mock_server,
        "under pressure",
        &[Hit {
            title: "Under Pressure",
            artist: "Queen",
            path: "/queen-under-pressure-lyrics",
            year: Some(1981),
            annotations: 10,
        }],
    )
    .await;

    // Page and mirror hold only a sign-in wall
    Mock::given(method("GET"))
        .and(path("/queen-under-pressure-lyrics"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body><p>Sign in</p></body></html>"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/Queen/Under%20Pressure"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "lyrics": "Pressure pushing down on me\nPressing down on you, no man ask for"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = test_config(&mock_server.uri());
    config.batch.video_lookup = false;
    let pipeline = LyricsPipeline::from_config(&config).unwrap();
    let records = pipeline.resolve("under pressure").await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].lyrics_text,
        "Pressure pushing down on me\nPressing down on you, no man ask for"
    );
    assert!(records[0].video_id.is_none());
}

#[tokio::test]
async fn test_session_shared_across_candidates() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();

    mount_search(
        &mock_server,
        "queen",
        &[
            Hit {
                title: "Somebody to Love",
                artist: "Queen",
                path: "/queen-somebody-to-love-lyrics",
                year: Some(1976),
                annotations: 1,
            },
            Hit {
                title: "Radio Ga Ga",
                artist: "Queen",
                path: "/queen-radio-ga-ga-lyrics",
                year: Some(1984),
                annotations: 1,
            },
        ],
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "sid=xyz; Path=/")
                .set_body_string(LANDING_HTML),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/queen-.*-lyrics$"))
        .and(header("cookie", "sid=xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_string(lyric_page(&[
            "[Verse 1]",
            "Can anybody find me somebody to love?",
            "Each morning I get up I die a little",
        ])))
        .expect(2)
        .mount(&mock_server)
        .await;

    let mut config = test_config(&uri);
    config.resolver.strategies = vec![StrategyKind::SessionWarmed];
    config.batch.video_lookup = false;
    let pipeline = LyricsPipeline::from_config(&config).unwrap();
    let records = pipeline.resolve("queen").await.unwrap();

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.has_lyrics()), "{records:?}");
}

#[tokio::test]
async fn test_json_output_shape() {
    let mock_server = MockServer::start().await;

    mount_search(
        &mock_server,
        "let it be",
        &[Hit {
            title: "Let It Be",
            artist: "The Beatles",
            path: "/the-beatles-let-it-be-lyrics",
            year: Some(1970),
            annotations: 30,
        }],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/the-beatles-let-it-be-lyrics"))
        .respond_with(ResponseTemplate::new(200).set_body_string(lyric_page(&[
            "[Verse 1]",
            "When I find myself in times of trouble",
            "Mother Mary comes to me",
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/results"))
        .respond_with(ResponseTemplate::new(200).set_body_string(video_results_page(&["QDYfEBY9NM4"])))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let pipeline = LyricsPipeline::from_config(&config).unwrap();
    let records = pipeline.resolve("let it be").await.unwrap();

    let json = serde_json::to_value(&records).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "rank": 1,
            "title": "Let It Be",
            "artist": "The Beatles",
            "video_id": "QDYfEBY9NM4",
            "lyrics_text": "[Verse 1]\nWhen I find myself in times of trouble\nMother Mary comes to me"
        }])
    );
}

#[tokio::test]
async fn test_metrics_report_after_resolve() {
    let mock_server = MockServer::start().await;
    lyricseek::metrics::init_metrics().unwrap();

    mount_search(
        &mock_server,
        "yesterday",
        &[Hit {
            title: "Yesterday",
            artist: "The Beatles",
            path: "/the-beatles-yesterday-lyrics",
            year: Some(1965),
            annotations: 12,
        }],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/the-beatles-yesterday-lyrics"))
        .respond_with(ResponseTemplate::new(200).set_body_string(lyric_page(&[
            "[Verse 1]",
            "Yesterday, all my troubles seemed so far away",
            "Now it looks as though they're here to stay",
        ])))
        .mount(&mock_server)
        .await;

    let mut config = test_config(&mock_server.uri());
    config.batch.video_lookup = false;
    let pipeline = LyricsPipeline::from_config(&config).unwrap();
    let records = pipeline.resolve("yesterday").await.unwrap();
    assert!(records[0].has_lyrics());

    let report = lyricseek::metrics::report().unwrap();
    assert!(report.contains(r#"lyricseek_resolutions_total{strategy="direct"}"#));
    assert!(report.contains("lyricseek_batch_size"));
}

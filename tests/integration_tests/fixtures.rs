//! Test fixtures for integration tests
//!
//! Provides canned search responses, pages and helpers for wiring a mock
//! server into a full pipeline.

use serde_json::{json, Value};
use std::fs;

/// Test fixture paths
const FIXTURES_DIR: &str = "tests/fixtures/html";

pub fn load_fixture(filename: &str) -> String {
    let path = format!("{FIXTURES_DIR}/{filename}");
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to load fixture: {path}"))
}

/// One song hit as the search API reports it
pub struct Hit<'a> {
    pub title: &'a str,
    pub artist: &'a str,
    pub path: &'a str,
    pub year: Option<u32>,
    pub annotations: u64,
}

/// Search API body with `hits`, each page served by the mock at `uri`
pub fn search_response(uri: &str, hits: &[Hit<'_>]) -> Value {
    let hits: Vec<Value> = hits
        .iter()
        .map(|hit| {
            json!({
                "index": "song",
                "type": "song",
                "result": {
                    "title": hit.title,
                    "full_title": format!("{} by {}", hit.title, hit.artist),
                    "url": format!("{uri}{}", hit.path),
                    "primary_artist": { "name": hit.artist },
                    "release_date_components": hit.year.map(|y| json!({
                        "year": y, "month": null, "day": null
                    })),
                    "annotation_count": hit.annotations
                }
            })
        })
        .collect();

    json!({ "meta": { "status": 200 }, "response": { "hits": hits } })
}

/// Search API body with no hits
pub fn empty_search_response() -> Value {
    json!({ "meta": { "status": 200 }, "response": { "hits": [] } })
}

/// Video results page listing `ids` the way the results markup embeds them
pub fn video_results_page(ids: &[&str]) -> String {
    let items: Vec<String> = ids
        .iter()
        .map(|id| format!(r#"{{"videoRenderer":{{"videoId":"{id}","title":{{"runs":[]}}}}}}"#))
        .collect();
    format!(
        "<html><body><script>var ytInitialData = {{\"contents\":[{}]}};</script></body></html>",
        items.join(",")
    )
}

/// Landing page body for session warm-up
pub const LANDING_HTML: &str = "<html><body><h1>Welcome</h1></body></html>";

/// Page whose lyric container is too short to be accepted
pub const SHORT_LYRICS_HTML: &str =
    r#"<html><body><div data-lyrics-container="true">La la<br>La</div></body></html>"#;

/// Page that is not text at all
pub const BINARY_HTML: &str = "<html><body>\0\0\0</body></html>";

use rand::seq::SliceRandom;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, COOKIE,
    REFERER, USER_AGENT,
};

use crate::utils::error::FetchError;

/// Browser identity sent by the browser-like fetchers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserProfile {
    pub user_agent: &'static str,
    pub accept: &'static str,
    pub accept_language: &'static str,
    /// Client hint brand list; Firefox and Safari send none
    pub sec_ch_ua: Option<&'static str>,
}

/// Pool of realistic browser profiles for rotation
pub const BROWSER_PROFILES: &[BrowserProfile] = &[
    BrowserProfile {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
        accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        accept_language: "en-US,en;q=0.9",
        sec_ch_ua: Some(r#""Not/A)Brand";v="8", "Chromium";v="126", "Google Chrome";v="126""#),
    },
    BrowserProfile {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
        accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        accept_language: "en-US,en;q=0.8",
        sec_ch_ua: Some(r#""Google Chrome";v="125", "Chromium";v="125", "Not.A/Brand";v="24""#),
    },
    BrowserProfile {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:127.0) Gecko/20100101 Firefox/127.0",
        accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        accept_language: "en-US,en;q=0.5",
        sec_ch_ua: None,
    },
    BrowserProfile {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
        accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        accept_language: "en-GB,en;q=0.9",
        sec_ch_ua: None,
    },
];

/// Pick a random browser profile from the pool
pub fn random_profile() -> &'static BrowserProfile {
    let mut rng = rand::thread_rng();
    BROWSER_PROFILES
        .choose(&mut rng)
        .unwrap_or(&BROWSER_PROFILES[0])
}

/// Build browser-like navigation headers
///
/// `referer` and `cookie` are added when present; values that are not valid
/// header text are skipped.
///
/// # Examples
///
/// ```
/// use lyricseek::crawler::headers::{build_browser_headers, BROWSER_PROFILES};
///
/// let headers = build_browser_headers(&BROWSER_PROFILES[0], Some("https://genius.com/"), None);
/// assert!(headers.contains_key("referer"));
/// ```
pub fn build_browser_headers(
    profile: &BrowserProfile,
    referer: Option<&str>,
    cookie: Option<&str>,
) -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(USER_AGENT, HeaderValue::from_static(profile.user_agent));
    headers.insert(ACCEPT, HeaderValue::from_static(profile.accept));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(profile.accept_language),
    );
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

    if let Some(brands) = profile.sec_ch_ua {
        headers.insert(
            HeaderName::from_static("sec-ch-ua"),
            HeaderValue::from_static(brands),
        );
        headers.insert(
            HeaderName::from_static("sec-ch-ua-mobile"),
            HeaderValue::from_static("?0"),
        );
    }

    // Sec-Fetch headers for modern browser compatibility
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static(if referer.is_some() { "same-origin" } else { "none" }),
    );
    headers.insert(
        HeaderName::from_static("upgrade-insecure-requests"),
        HeaderValue::from_static("1"),
    );

    if let Some(referer) = referer {
        if let Ok(value) = HeaderValue::from_str(referer) {
            headers.insert(REFERER, value);
        }
    }

    if let Some(cookie) = cookie.filter(|c| !c.is_empty()) {
        if let Ok(value) = HeaderValue::from_str(cookie) {
            headers.insert(COOKIE, value);
        }
    }

    headers
}

/// Headers for the non-browser crawler identity
pub fn build_crawler_headers(user_agent: &str) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();

    let agent = HeaderValue::from_str(user_agent)
        .map_err(|_| FetchError::InvalidHeader(user_agent.to_string()))?;
    headers.insert(USER_AGENT, agent);
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

    Ok(headers)
}

/// Headers for plain-text and JSON endpoints
pub fn build_api_headers(accept: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(USER_AGENT, HeaderValue::from_static(random_profile().user_agent));
    headers.insert(ACCEPT, HeaderValue::from_static(accept));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_rotation() {
        let mut agents = std::collections::HashSet::new();
        for _ in 0..200 {
            let profile = random_profile();
            assert!(BROWSER_PROFILES.contains(profile));
            agents.insert(profile.user_agent);
        }
        assert!(agents.len() > 1, "Profiles should rotate");
    }

    #[test]
    fn test_build_browser_headers() {
        let headers = build_browser_headers(
            &BROWSER_PROFILES[0],
            Some("https://genius.com/"),
            Some("_genius_ab_test_cohort=42; session=abc"),
        );

        assert!(headers.contains_key(USER_AGENT));
        assert!(headers.contains_key(ACCEPT));
        assert!(headers.contains_key(ACCEPT_LANGUAGE));
        assert!(headers.contains_key("sec-ch-ua"));
        assert_eq!(
            headers.get(REFERER).unwrap(),
            HeaderValue::from_static("https://genius.com/")
        );
        assert_eq!(
            headers.get(COOKIE).unwrap(),
            HeaderValue::from_static("_genius_ab_test_cohort=42; session=abc")
        );
        assert_eq!(
            headers.get("sec-fetch-site").unwrap(),
            HeaderValue::from_static("same-origin")
        );
    }

    #[test]
    fn test_browser_headers_without_referer_or_cookie() {
        let headers = build_browser_headers(&BROWSER_PROFILES[2], None, Some(""));
        assert!(!headers.contains_key(REFERER));
        assert!(!headers.contains_key(COOKIE));
        assert!(!headers.contains_key("sec-ch-ua"));
        assert_eq!(
            headers.get("sec-fetch-site").unwrap(),
            HeaderValue::from_static("none")
        );
    }

    #[test]
    fn test_invalid_referer_skipped() {
        let headers = build_browser_headers(&BROWSER_PROFILES[0], Some("bad\nvalue"), None);
        assert!(!headers.contains_key(REFERER));
    }

    #[test]
    fn test_build_crawler_headers() {
        let headers = build_crawler_headers("Googlebot/2.1").unwrap();
        assert_eq!(
            headers.get(USER_AGENT).unwrap(),
            HeaderValue::from_static("Googlebot/2.1")
        );
        assert!(build_crawler_headers("bad\nagent").is_err());
    }

    #[test]
    fn test_build_api_headers() {
        let headers = build_api_headers("application/json");
        assert_eq!(
            headers.get(ACCEPT).unwrap(),
            HeaderValue::from_static("application/json")
        );
    }
}

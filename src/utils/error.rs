//! Error types for the lyricseek pipeline
//!
//! This module defines the domain errors raised by fetchers, the extractor
//! and the external search collaborators.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered 429
    #[error("Rate limited by upstream")]
    RateLimit,

    /// Upstream answered 403
    #[error("Forbidden by upstream")]
    Forbidden,

    /// Non-success status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Maximum retry attempts exceeded
    #[error("Maximum retry attempts exceeded (last: {last})")]
    MaxRetriesExceeded { last: String },

    /// Content decoding error
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Header value rejected by the HTTP client
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    /// Upstream answered successfully but carried nothing usable
    #[error("Empty payload")]
    EmptyPayload,
}

impl FetchError {
    /// Status code carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimit => Some(429),
            Self::Forbidden => Some(403),
            Self::ServerError(code) => Some(*code),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Errors that can occur while extracting lyric text
#[derive(Error, Debug)]
pub enum ParseError {
    /// Payload is larger than the extractor accepts
    #[error("Payload too large: {size} bytes (limit {limit})")]
    PayloadTooLarge { size: usize, limit: usize },

    /// Payload is not text (binary or NUL bytes)
    #[error("Payload is not text")]
    NotText,
}

/// Errors raised by the external search collaborators
#[derive(Error, Debug)]
pub enum SearchError {
    /// Provider call failed at the transport level
    #[error("Search request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Search provider returned status {0}")]
    Status(u16),

    /// Provider answered with a body we could not interpret
    #[error("Malformed search response: {0}")]
    Malformed(String),

    /// Provider is not configured (missing token, bad URL)
    #[error("Search provider not configured: {0}")]
    NotConfigured(String),
}

impl SearchError {
    /// Transport failures and 5xx/429 answers are worth another attempt
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Status(code) => matches!(code, 429 | 500 | 502 | 503 | 504),
            Self::Malformed(_) | Self::NotConfigured(_) => false,
        }
    }
}

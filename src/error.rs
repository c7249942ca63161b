//! Unified error handling for the lyricseek crate
//!
//! This module provides a unified error type that consolidates the
//! domain-specific errors into a single `Error` enum, plus the whole-batch
//! [`ResolveError`] returned by the pipeline.
//!
//! # Architecture
//!
//! - [`LyricseekErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//! - [`ResolveError`] - Failures of a whole `resolve` call
//!
//! # Usage
//!
//! ```rust
//! use lyricseek::error::{Error, ErrorCategory, LyricseekErrorTrait};
//! use lyricseek::utils::error::FetchError;
//!
//! let err = Error::from(FetchError::Timeout);
//! assert!(err.is_recoverable());
//! assert_eq!(err.category(), ErrorCategory::Network);
//! ```

use std::io;
use thiserror::Error;

pub use crate::utils::error::{FetchError, ParseError, SearchError};

/// Common trait for all lyricseek error types
pub trait LyricseekErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Short description for user-facing messages
    fn localized_desc(&self) -> String;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, rate limit)
    Network,
    /// Parsing and data extraction errors
    Parsing,
    /// Search provider errors
    Search,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    pub fn localized_desc(&self) -> &'static str {
        match self {
            Self::Network => "network error",
            Self::Parsing => "parsing error",
            Self::Search => "search error",
            Self::Config => "configuration error",
            Self::Other => "other error",
        }
    }
}

impl LyricseekErrorTrait for FetchError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimit | Self::Forbidden | Self::Timeout => true,
            Self::ServerError(code) => *code >= 500,
            Self::MaxRetriesExceeded { .. }
            | Self::Decode(_)
            | Self::InvalidUrl(_)
            | Self::InvalidHeader(_)
            | Self::EmptyPayload => false,
        }
    }

    fn localized_desc(&self) -> String {
        match self {
            Self::Http(e) => format!("request failed: {e}"),
            Self::RateLimit => "rate limited".to_string(),
            Self::Forbidden => "access denied".to_string(),
            Self::ServerError(code) => format!("server answered {code}"),
            Self::Timeout => "request timed out".to_string(),
            Self::MaxRetriesExceeded { .. } => "gave up after retries".to_string(),
            Self::Decode(_) => "could not decode response".to_string(),
            Self::InvalidUrl(url) => format!("invalid URL {url}"),
            Self::InvalidHeader(_) => "invalid header value".to_string(),
            Self::EmptyPayload => "empty response".to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidUrl(_) | Self::InvalidHeader(_) => ErrorCategory::Config,
            Self::Decode(_) => ErrorCategory::Parsing,
            _ => ErrorCategory::Network,
        }
    }
}

impl LyricseekErrorTrait for ParseError {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn localized_desc(&self) -> String {
        match self {
            Self::PayloadTooLarge { .. } => "page too large".to_string(),
            Self::NotText => "page is not text".to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Parsing
    }
}

impl LyricseekErrorTrait for SearchError {
    fn is_recoverable(&self) -> bool {
        self.is_transient()
    }

    fn localized_desc(&self) -> String {
        match self {
            Self::Http(_) => "search provider unreachable".to_string(),
            Self::Status(code) => format!("search provider answered {code}"),
            Self::Malformed(_) => "unexpected search response".to_string(),
            Self::NotConfigured(what) => format!("search not configured: {what}"),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::NotConfigured(_) => ErrorCategory::Config,
            _ => ErrorCategory::Search,
        }
    }
}

/// Failure of a whole `resolve` call
///
/// Per-candidate failures never surface here; they become sentinels inside
/// the returned records.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The song search provider could not be reached or answered badly
    #[error("Song search unavailable: {0}")]
    UpstreamSearchUnavailable(#[from] SearchError),

    /// The search succeeded but returned no candidates
    #[error("No songs matched the query")]
    NoMatches,
}

impl ResolveError {
    /// True for the empty-result condition, which callers may treat as a non-error
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::NoMatches)
    }
}

impl LyricseekErrorTrait for ResolveError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::UpstreamSearchUnavailable(e) => e.is_recoverable(),
            Self::NoMatches => false,
        }
    }

    fn localized_desc(&self) -> String {
        match self {
            Self::UpstreamSearchUnavailable(e) => e.localized_desc(),
            Self::NoMatches => "no songs found".to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::UpstreamSearchUnavailable(e) => e.category(),
            Self::NoMatches => ErrorCategory::Search,
        }
    }
}

/// Unified error type for the lyricseek crate
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse-specific errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Search provider errors
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Whole-batch resolution errors
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl LyricseekErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Parse(e) => e.is_recoverable(),
            Self::Search(e) => e.is_recoverable(),
            Self::Resolve(e) => e.is_recoverable(),
            Self::Io(_) => true, // I/O errors are often transient
            Self::Json(_) => false,
            Self::Http(_) => true, // HTTP errors are often transient
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn localized_desc(&self) -> String {
        match self {
            Self::Fetch(e) => e.localized_desc(),
            Self::Parse(e) => e.localized_desc(),
            Self::Search(e) => e.localized_desc(),
            Self::Resolve(e) => e.localized_desc(),
            Self::Io(e) => format!("I/O error: {e}"),
            Self::Json(e) => format!("JSON error: {e}"),
            Self::Http(e) => format!("HTTP error: {e}"),
            Self::Config(msg) => format!("configuration error: {msg}"),
            Self::Other { context, .. } => context.clone(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(e) => e.category(),
            Self::Http(_) => ErrorCategory::Network,
            Self::Parse(_) | Self::Json(_) => ErrorCategory::Parsing,
            Self::Search(e) => e.category(),
            Self::Resolve(e) => e.category(),
            Self::Config(_) => ErrorCategory::Config,
            Self::Io(_) | Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Conversion from anyhow::Error
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: format!("{err:#}"),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

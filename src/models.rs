// Core data structures for the lyricseek pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Partial release date as reported by the search provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDate {
    pub year: Option<u32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl ReleaseDate {
    pub fn new(year: Option<u32>, month: Option<u32>, day: Option<u32>) -> Self {
        Self { year, month, day }
    }

    /// Date with only the year known
    pub fn year(year: u32) -> Self {
        Self {
            year: Some(year),
            ..Default::default()
        }
    }
}

/// One search hit describing a song, pre-resolution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub artist: String,
    /// Canonical lyrics page URL
    pub url: String,
    pub full_title: String,
    pub release_date: ReleaseDate,
    pub annotation_count: u64,
}

impl Candidate {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, url: impl Into<String>) -> Self {
        let title = title.into();
        let artist = artist.into();
        Self {
            full_title: format!("{title} by {artist}"),
            title,
            artist,
            url: url.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_release_date(mut self, release_date: ReleaseDate) -> Self {
        self.release_date = release_date;
        self
    }

    #[must_use]
    pub fn with_annotation_count(mut self, count: u64) -> Self {
        self.annotation_count = count;
        self
    }

    /// Query string handed to the video lookup side-channel
    pub fn video_query(&self) -> String {
        format!("{} {}", self.title, self.artist)
    }
}

/// Distinct fetch-and-extract approaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Browser-like GET to the source page with retries
    #[serde(rename = "direct")]
    Direct,
    /// Landing page warm-up, then a GET carrying the session cookies
    #[serde(rename = "session")]
    SessionWarmed,
    /// Single GET with a crawler identity
    #[serde(rename = "identity")]
    AlternateIdentity,
    /// Text-rendering proxy of the source page
    #[serde(rename = "mirror")]
    Mirror,
    /// Keyless public lyrics API
    #[serde(rename = "api")]
    LyricsApi,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        Self::Direct,
        Self::SessionWarmed,
        Self::AlternateIdentity,
        Self::Mirror,
        Self::LyricsApi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::SessionWarmed => "session",
            Self::AlternateIdentity => "identity",
            Self::Mirror => "mirror",
            Self::LyricsApi => "api",
        }
    }

    /// Kind of payload this strategy produces
    pub fn payload_kind(&self) -> PayloadKind {
        match self {
            Self::Direct | Self::SessionWarmed | Self::AlternateIdentity => PayloadKind::Markup,
            Self::Mirror => PayloadKind::MirrorText,
            Self::LyricsApi => PayloadKind::ApiText,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "session" | "session-warmed" => Ok(Self::SessionWarmed),
            "identity" | "alternate-identity" => Ok(Self::AlternateIdentity),
            "mirror" => Ok(Self::Mirror),
            "api" | "lyrics-api" => Ok(Self::LyricsApi),
            other => Err(format!("unknown strategy: {other}")),
        }
    }
}

/// Shape of a fetched payload, used to pick the extraction path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayloadKind {
    /// HTML page
    Markup,
    /// Plain-text dump from a rendering proxy
    MirrorText,
    /// Clean text from a lyrics API
    ApiText,
}

impl PayloadKind {
    pub fn is_markup(&self) -> bool {
        matches!(self, Self::Markup)
    }
}

/// Result of one fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success { payload: String, kind: PayloadKind },
    Failure { error: String, status: Option<u16> },
}

/// One strategy's fetch against one target, kept only while resolving a candidate
#[derive(Debug, Clone)]
pub struct FetchAttempt {
    pub strategy: StrategyKind,
    pub target_url: String,
    pub outcome: FetchOutcome,
    /// HTTP requests issued for this attempt
    pub attempts: u32,
    pub fetched_at: DateTime<Utc>,
}

impl FetchAttempt {
    pub fn success(
        strategy: StrategyKind,
        target_url: impl Into<String>,
        payload: String,
        attempts: u32,
    ) -> Self {
        Self {
            strategy,
            target_url: target_url.into(),
            outcome: FetchOutcome::Success {
                payload,
                kind: strategy.payload_kind(),
            },
            attempts,
            fetched_at: Utc::now(),
        }
    }

    pub fn failure(
        strategy: StrategyKind,
        target_url: impl Into<String>,
        error: &crate::utils::error::FetchError,
        attempts: u32,
    ) -> Self {
        Self {
            strategy,
            target_url: target_url.into(),
            outcome: FetchOutcome::Failure {
                error: error.to_string(),
                status: error.status(),
            },
            attempts,
            fetched_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FetchOutcome::Success { .. })
    }

    /// Payload and its kind when the attempt succeeded
    pub fn payload(&self) -> Option<(&str, PayloadKind)> {
        match &self.outcome {
            FetchOutcome::Success { payload, kind } => Some((payload.as_str(), *kind)),
            FetchOutcome::Failure { .. } => None,
        }
    }
}

pub const NOT_FOUND: &str = "Lyrics not found.";
pub const NOT_FOUND_DUE_TO_ERROR: &str = "Lyrics not found due to error.";
pub const NOT_AVAILABLE: &str = "Lyrics not available.";

/// Extracted lyric text or one of the "no data" sentinels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LyricsText {
    Found(String),
    /// Extraction ran and found nothing
    NotFound,
    /// Extraction failed internally
    ExtractionError,
    /// No strategy produced any payload
    Unavailable,
}

impl LyricsText {
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, Self::Found(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Found(text) => text,
            Self::NotFound => NOT_FOUND,
            Self::ExtractionError => NOT_FOUND_DUE_TO_ERROR,
            Self::Unavailable => NOT_AVAILABLE,
        }
    }

    /// Character count of found text; sentinels count as empty
    pub fn char_len(&self) -> usize {
        match self {
            Self::Found(text) => text.chars().count(),
            _ => 0,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Found(text) => text,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for LyricsText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Markup locator tiers, strictest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LocatorTier {
    DataAttribute,
    ClassName,
    ContainerHeuristic,
    AnyElement,
}

impl LocatorTier {
    /// Rough likelihood that a region found by this tier really holds lyrics
    pub fn confidence(&self) -> f32 {
        match self {
            Self::DataAttribute => 1.0,
            Self::ClassName => 0.8,
            Self::ContainerHeuristic => 0.5,
            Self::AnyElement => 0.3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataAttribute => "data-attribute",
            Self::ClassName => "class-name",
            Self::ContainerHeuristic => "container-heuristic",
            Self::AnyElement => "any-element",
        }
    }
}

/// How an accepted lyric text was obtained
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMethod {
    pub strategy: StrategyKind,
    pub payload: PayloadKind,
    /// Markup locator tier, `None` for plain-text payloads
    pub locator: Option<LocatorTier>,
}

impl ExtractionMethod {
    pub fn confidence(&self) -> f32 {
        match (self.payload, self.locator) {
            (PayloadKind::Markup, Some(tier)) => tier.confidence(),
            (PayloadKind::Markup, None) => 0.0,
            (PayloadKind::ApiText, _) => 0.9,
            (PayloadKind::MirrorText, _) => 0.6,
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.locator {
            Some(tier) => write!(f, "{}/{}", self.strategy, tier.as_str()),
            None => write!(f, "{}", self.strategy),
        }
    }
}

/// Outcome of resolving one candidate
#[derive(Debug, Clone)]
pub struct ResolvedLyrics {
    pub candidate: Candidate,
    pub lyrics: LyricsText,
    /// Method of the accepted strategy, `None` when exhausted
    pub method: Option<ExtractionMethod>,
    pub success: bool,
    /// Strategies tried, in order
    pub tried: Vec<StrategyKind>,
}

/// Externally visible unit: one per ranked candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// 1-based position in the ranked list
    pub rank: usize,
    pub title: String,
    pub artist: String,
    pub video_id: Option<String>,
    pub lyrics_text: String,
}

impl ResultRecord {
    pub fn new(rank: usize, resolved: ResolvedLyrics, video_id: Option<String>) -> Self {
        Self {
            rank,
            title: resolved.candidate.title,
            artist: resolved.candidate.artist,
            video_id,
            lyrics_text: resolved.lyrics.into_text(),
        }
    }

    /// Record for a candidate whose resolution task died
    pub fn degraded(rank: usize, candidate: &Candidate) -> Self {
        Self {
            rank,
            title: candidate.title.clone(),
            artist: candidate.artist.clone(),
            video_id: None,
            lyrics_text: LyricsText::Unavailable.into_text(),
        }
    }

    pub fn has_lyrics(&self) -> bool {
        !matches!(
            self.lyrics_text.as_str(),
            NOT_FOUND | NOT_FOUND_DUE_TO_ERROR | NOT_AVAILABLE
        )
    }
}

//! Lyric text extraction
//!
//! Turns a fetched payload into clean lyric text or a sentinel. Markup goes
//! through the region locators; plain-text mirror dumps get their page
//! chrome trimmed; API text passes through untouched.

use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::models::{LocatorTier, LyricsText, PayloadKind};
use crate::parser::region::{locate, render_text, HeuristicThresholds, SECTION_LABEL};
use crate::parser::sanitize::clean_lyric_block;
use crate::utils::error::ParseError;

/// "Embed" marker with the counter glued to it, e.g. `52Embed`
static EMBED_COUNTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+Embed\b").unwrap());

/// Bare "Embed" closing the dump
static TRAILING_EMBED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*Embed\s*\z").unwrap());

/// Extractor limits and thresholds
#[derive(Debug, Clone)]
pub struct ExtractorOptions {
    /// Payloads above this size are rejected
    pub max_payload_bytes: usize,
    /// Thresholds for the heuristic locator tiers
    pub heuristics: HeuristicThresholds,
    /// A mirror line longer than this starts the lyric body
    pub mirror_line_min_chars: usize,
    /// Trimmed mirror text shorter than this falls back to the full dump
    pub mirror_min_chars: usize,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            max_payload_bytes: 8 * 1024 * 1024,
            heuristics: HeuristicThresholds::default(),
            mirror_line_min_chars: 20,
            mirror_min_chars: 40,
        }
    }
}

/// Extracted text plus the tier that located it
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub text: LyricsText,
    /// Markup locator tier; `None` for plain text or when nothing was found
    pub locator: Option<LocatorTier>,
}

impl Extraction {
    fn plain(text: LyricsText) -> Self {
        Self {
            text,
            locator: None,
        }
    }
}

/// Lyric text extractor
#[derive(Debug, Clone, Default)]
pub struct LyricsExtractor {
    options: ExtractorOptions,
}

impl LyricsExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: ExtractorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExtractorOptions {
        &self.options
    }

    /// Extract lyrics from a payload of the given kind
    pub fn extract(&self, payload: &str, kind: PayloadKind) -> Extraction {
        match kind {
            PayloadKind::Markup => self.extract_markup(payload),
            PayloadKind::MirrorText => Extraction::plain(self.extract_mirror_text(payload)),
            PayloadKind::ApiText => Extraction::plain(Self::extract_api_text(payload)),
        }
    }

    /// Extract lyrics from an HTML page
    ///
    /// Returns [`LyricsText::NotFound`] when no region yields text and
    /// [`LyricsText::ExtractionError`] when the payload could not be processed.
    pub fn extract_markup(&self, html: &str) -> Extraction {
        match self.try_extract_markup(html) {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!(error = %e, "Lyrics extraction failed");
                Extraction::plain(LyricsText::ExtractionError)
            }
        }
    }

    fn try_extract_markup(&self, html: &str) -> Result<Extraction, ParseError> {
        self.check_payload(html)?;

        if html.trim().is_empty() {
            return Ok(Extraction::plain(LyricsText::NotFound));
        }

        let document = Html::parse_document(html);

        let Some(region) = locate(&document, &self.options.heuristics) else {
            debug!("No lyrics region found");
            return Ok(Extraction::plain(LyricsText::NotFound));
        };

        let chunks: Vec<String> = region
            .elements
            .iter()
            .map(|el| render_text(*el).trim().to_string())
            .filter(|chunk| !chunk.is_empty())
            .collect();

        let text = clean_lyric_block(&chunks.join("\n"));
        if text.is_empty() {
            debug!(tier = region.tier.as_str(), "Lyrics region was empty");
            return Ok(Extraction::plain(LyricsText::NotFound));
        }

        debug!(
            tier = region.tier.as_str(),
            chars = text.chars().count(),
            "Extracted lyrics from markup"
        );
        Ok(Extraction {
            text: LyricsText::Found(text),
            locator: Some(region.tier),
        })
    }

    fn check_payload(&self, payload: &str) -> Result<(), ParseError> {
        if payload.len() > self.options.max_payload_bytes {
            return Err(ParseError::PayloadTooLarge {
                size: payload.len(),
                limit: self.options.max_payload_bytes,
            });
        }
        if payload.contains('\0') {
            return Err(ParseError::NotText);
        }
        Ok(())
    }

    /// Extract lyrics from a text-rendering proxy dump
    ///
    /// Drops the "Embed" marker and anything after it, then skips
    /// page chrome until the first section label or long line. When that
    /// leaves too little text the whole dump is kept.
    pub fn extract_mirror_text(&self, text: &str) -> LyricsText {
        let full = text.replace('\r', "");
        let full = full.trim();
        if full.is_empty() {
            return LyricsText::NotFound;
        }

        let upto_embed = match EMBED_COUNTER
            .find(full)
            .or_else(|| TRAILING_EMBED.find(full))
        {
            Some(m) => &full[..m.start()],
            None => full,
        };

        let lines: Vec<&str> = upto_embed.lines().collect();
        let start = lines
            .iter()
            .position(|line| {
                SECTION_LABEL.is_match(line)
                    || line.trim().chars().count() > self.options.mirror_line_min_chars
            })
            .unwrap_or(0);

        let cleaned = lines[start..].join("\n");
        let cleaned = cleaned.trim();

        if cleaned.chars().count() < self.options.mirror_min_chars {
            debug!(
                chars = cleaned.chars().count(),
                "Trimmed mirror text too short, keeping full dump"
            );
            return LyricsText::Found(full.to_string());
        }

        LyricsText::Found(cleaned.to_string())
    }

    /// API payloads are already clean
    pub fn extract_api_text(text: &str) -> LyricsText {
        if text.trim().is_empty() {
            LyricsText::NotFound
        } else {
            LyricsText::Found(text.to_string())
        }
    }
}

//! Lyric text extraction
//!
//! This module locates the lyric region inside fetched pages and turns it
//! into clean, newline-separated text.
//!
//! - [`selectors`] - static CSS selectors per locator tier
//! - [`region`] - prioritized region locators and text rendering
//! - [`sanitize`] - whitespace and character cleanup
//! - [`lyrics`] - the [`LyricsExtractor`] entry point

pub mod lyrics;
pub mod region;
pub mod sanitize;
pub mod selectors;

pub use lyrics::{Extraction, ExtractorOptions, LyricsExtractor};
pub use region::{locate, HeuristicThresholds, Region, LOCATORS};

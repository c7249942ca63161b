//! CSS selectors for locating lyric regions
//!
//! Selectors are grouped by locator tier, strictest first. Parsing happens
//! once, lazily.

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

/// Attribute flagging metadata nodes inside a lyric container
pub const EXCLUDE_ATTR: &str = "data-exclude-from-selection";

/// Elements whose content never counts as text
pub const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "button", "template", "head",
];

/// Elements that start and end a line when rendered
pub const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6",
    "pre", "blockquote", "tr", "table",
];

lazy_static! {
    // Stable structural marker
    static ref DATA_ATTRIBUTE: Vec<Selector> = vec![
        parse_selector!("[data-lyrics-container='true']"),
    ];

    // Common class-name patterns, most specific first
    static ref CLASS_NAME: Vec<Selector> = vec![
        parse_selector!("div[class^='Lyrics__Container']"),
        parse_selector!("div[class*='Lyrics__Container']"),
        parse_selector!("div[class*='lyrics-container']"),
        parse_selector!("div.lyrics"),
        parse_selector!("div.lyricbox"),
        parse_selector!("#lyrics-root"),
    ];

    // Containers considered by the heuristic scan
    static ref CONTAINERS: Vec<Selector> = vec![
        parse_selector!("div, section, article, pre"),
    ];

    // Last resort: every element under body
    static ref ANY_ELEMENT: Vec<Selector> = vec![
        parse_selector!("body *"),
    ];
}

/// Selector sets used by the locator tiers
pub struct LyricsSelectors {
    pub data_attribute: &'static [Selector],
    pub class_name: &'static [Selector],
    pub containers: &'static [Selector],
    pub any_element: &'static [Selector],
}

impl LyricsSelectors {
    pub fn new() -> Self {
        Self {
            data_attribute: &DATA_ATTRIBUTE,
            class_name: &CLASS_NAME,
            containers: &CONTAINERS,
            any_element: &ANY_ELEMENT,
        }
    }
}

impl Default for LyricsSelectors {
    fn default() -> Self {
        Self::new()
    }
}

/// True when an element carries the metadata exclusion marker
pub fn is_excluded(element: &scraper::node::Element) -> bool {
    element.attr(EXCLUDE_ATTR).is_some()
}

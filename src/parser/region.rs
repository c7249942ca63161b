//! Lyric region locators
//!
//! Each locator is a pure function `(&Html) -> Option<Region>`. They are
//! tried in [`LOCATORS`] order and the first one that finds text wins;
//! looser heuristics only run when the stricter ones come back empty.
//! Elements that render to nothing do not count as found.

use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::models::LocatorTier;
use crate::parser::sanitize::clean_lyric_block;
use crate::parser::selectors::{is_excluded, LyricsSelectors, BLOCK_TAGS, SKIPPED_TAGS};

/// Bracketed section labels such as `[Verse 1]` or `[Chorus: Freddie]`
pub static SECTION_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\[\s*(verse|chorus|pre-chorus|post-chorus|bridge|intro|outro|hook|refrain|interlude|breakdown)\b",
    )
    .unwrap()
});

static CAPITALIZED_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\p{Lu}[\p{Ll}']+\b").unwrap());

/// Rendering stops descending past this depth
const MAX_RENDER_DEPTH: usize = 256;

/// Thresholds for the heuristic tiers
#[derive(Debug, Clone, Copy)]
pub struct HeuristicThresholds {
    /// Minimum rendered characters
    pub min_chars: usize,
    /// Minimum non-empty lines
    pub min_lines: usize,
    /// Capitalized words needed when no section label is present
    pub min_capitalized: usize,
}

impl Default for HeuristicThresholds {
    fn default() -> Self {
        Self {
            min_chars: 200,
            min_lines: 4,
            min_capitalized: 10,
        }
    }
}

impl HeuristicThresholds {
    /// Looser thresholds for the any-element scan
    pub fn relaxed(&self) -> Self {
        Self {
            min_chars: self.min_chars / 2,
            min_lines: self.min_lines.saturating_sub(1).max(2),
            min_capitalized: self.min_capitalized / 2,
        }
    }
}

/// Located lyric region
#[derive(Debug, Clone)]
pub struct Region<'a> {
    pub tier: LocatorTier,
    /// Region elements in document order
    pub elements: Vec<ElementRef<'a>>,
}

/// Signature shared by all locators
pub type Locator = for<'a> fn(&'a Html, &HeuristicThresholds) -> Option<Region<'a>>;

/// Locators in escalation order
pub const LOCATORS: [(LocatorTier, Locator); 4] = [
    (LocatorTier::DataAttribute, locate_by_attribute),
    (LocatorTier::ClassName, locate_by_class),
    (LocatorTier::ContainerHeuristic, locate_by_container_scan),
    (LocatorTier::AnyElement, locate_by_any_element),
];

/// Run the locators in order and return the first region found
pub fn locate<'a>(document: &'a Html, thresholds: &HeuristicThresholds) -> Option<Region<'a>> {
    LOCATORS
        .iter()
        .find_map(|(_, locator)| locator(document, thresholds))
}

/// Tier (a): elements carrying the stable data attribute
pub fn locate_by_attribute<'a>(document: &'a Html, _: &HeuristicThresholds) -> Option<Region<'a>> {
    let selectors = LyricsSelectors::new();
    first_selector_match(document, selectors.data_attribute, LocatorTier::DataAttribute)
}

/// Tier (b): common lyric class-name patterns
pub fn locate_by_class<'a>(document: &'a Html, _: &HeuristicThresholds) -> Option<Region<'a>> {
    let selectors = LyricsSelectors::new();
    first_selector_match(document, selectors.class_name, LocatorTier::ClassName)
}

/// Tier (c): container elements whose text looks like lyrics
pub fn locate_by_container_scan<'a>(
    document: &'a Html,
    thresholds: &HeuristicThresholds,
) -> Option<Region<'a>> {
    let selectors = LyricsSelectors::new();
    heuristic_scan(
        document,
        selectors.containers,
        thresholds,
        LocatorTier::ContainerHeuristic,
    )
}

/// Tier (d): any element whose text looks like lyrics, with relaxed thresholds
pub fn locate_by_any_element<'a>(
    document: &'a Html,
    thresholds: &HeuristicThresholds,
) -> Option<Region<'a>> {
    let selectors = LyricsSelectors::new();
    heuristic_scan(
        document,
        selectors.any_element,
        &thresholds.relaxed(),
        LocatorTier::AnyElement,
    )
}

fn first_selector_match<'a>(
    document: &'a Html,
    selectors: &[Selector],
    tier: LocatorTier,
) -> Option<Region<'a>> {
    selectors.iter().find_map(|selector| {
        let found: Vec<ElementRef<'a>> = document.select(selector).collect();
        let elements: Vec<ElementRef<'a>> = outermost(found)
            .into_iter()
            .filter(|el| has_text(*el))
            .collect();
        (!elements.is_empty()).then_some(Region { tier, elements })
    })
}

fn heuristic_scan<'a>(
    document: &'a Html,
    selectors: &[Selector],
    thresholds: &HeuristicThresholds,
    tier: LocatorTier,
) -> Option<Region<'a>> {
    let matching: Vec<ElementRef<'a>> = selectors
        .iter()
        .flat_map(|selector| document.select(selector))
        .filter(|el| !SKIPPED_TAGS.contains(&el.value().name()))
        .filter(|el| looks_like_lyrics(&render_text(*el), thresholds))
        .collect();

    // An outer wrapper passes the same test as the element it wraps
    innermost(matching)
        .into_iter()
        .next()
        .map(|el| Region { tier, elements: vec![el] })
}

fn has_text(element: ElementRef<'_>) -> bool {
    !clean_lyric_block(&render_text(element)).is_empty()
}

/// Line-structure test used by the heuristic tiers
pub fn looks_like_lyrics(text: &str, thresholds: &HeuristicThresholds) -> bool {
    if text.chars().count() < thresholds.min_chars {
        return false;
    }

    let lines = text.lines().filter(|l| !l.trim().is_empty()).count();
    if lines < thresholds.min_lines {
        return false;
    }

    SECTION_LABEL.is_match(text)
        || CAPITALIZED_WORD.find_iter(text).count() >= thresholds.min_capitalized
}

/// Keep elements none of whose ancestors are also in the set
fn outermost(elements: Vec<ElementRef<'_>>) -> Vec<ElementRef<'_>> {
    let ids: HashSet<_> = elements.iter().map(|el| el.id()).collect();
    elements
        .into_iter()
        .filter(|el| !el.ancestors().any(|a| ids.contains(&a.id())))
        .collect()
}

/// Keep elements that have no descendant also in the set, in document order
fn innermost(elements: Vec<ElementRef<'_>>) -> Vec<ElementRef<'_>> {
    let mut ancestors = HashSet::new();
    for el in &elements {
        ancestors.extend(el.ancestors().map(|a| a.id()));
    }
    let mut seen = HashSet::new();
    elements
        .into_iter()
        .filter(|el| !ancestors.contains(&el.id()) && seen.insert(el.id()))
        .collect()
}

/// Render an element's text: `<br>` and block boundaries become newlines,
/// excluded and non-content subtrees are skipped
pub fn render_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    render_into(element, &mut out, 0);
    out
}

fn render_into(element: ElementRef<'_>, out: &mut String, depth: usize) {
    if depth > MAX_RENDER_DEPTH {
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if is_excluded(el) || SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    render_into(child_el, out, depth + 1);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

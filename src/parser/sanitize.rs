//! Text sanitization utilities for cleaning extracted lyrics
//!
//! This module provides functions to normalize the raw text pulled out of a
//! lyrics region: invisible characters, stray entities, line whitespace and
//! blank-line runs.

use regex::Regex;
use std::sync::LazyLock;

static MULTI_NEWLINE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

static INLINE_SPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\u{a0}]+").unwrap());

/// Sanitize a block of lyric text
///
/// 1. Remove zero-width characters
/// 2. Remove control characters (except newline/tab)
/// 3. Decode leftover HTML entities
/// 4. Collapse runs of 3+ newlines to one blank line
/// 5. Trim each line and drop empty ones
///
/// # Examples
///
/// ```
/// use lyricseek::parser::sanitize::clean_lyric_block;
///
/// let dirty = "  Line one\u{200B}\n\n\n\n Line two  ";
/// assert_eq!(clean_lyric_block(dirty), "Line one\nLine two");
/// ```
pub fn clean_lyric_block(text: &str) -> String {
    let mut result = remove_zero_width(text);
    result = remove_control_chars(&result);
    result = decode_html_entities(&result);
    result = collapse_newlines(&result);
    drop_empty_lines(&result)
}

/// Remove zero-width spaces and similar invisible characters
///
/// # Examples
///
/// ```
/// use lyricseek::parser::sanitize::remove_zero_width;
///
/// assert_eq!(remove_zero_width("la\u{200B}la\u{FEFF}"), "lala");
/// ```
pub fn remove_zero_width(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !matches!(*c,
                '\u{200B}'..='\u{200F}' |
                '\u{2028}'..='\u{202F}' |
                '\u{FEFF}'
            )
        })
        .collect()
}

/// Remove control characters except newline and tab
pub fn remove_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Decode HTML entities that survived parsing (double-encoded markup)
pub fn decode_html_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    html_escape::decode_html_entities(text).into_owned()
}

/// Collapse 3+ consecutive newlines to exactly one blank line
pub fn collapse_newlines(text: &str) -> String {
    MULTI_NEWLINE_REGEX.replace_all(text, "\n\n").to_string()
}

/// Trim each line, squeeze inner spaces, drop lines left empty
pub fn drop_empty_lines(text: &str) -> String {
    text.lines()
        .map(|line| INLINE_SPACE_REGEX.replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

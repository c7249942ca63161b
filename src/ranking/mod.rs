//! Candidate ranking
//!
//! Orders search hits by how well they match the user's query. The
//! comparator is lexicographic over per-candidate keys:
//!
//! 1. artist name appears in the query (matches first)
//! 2. title or full title appears in the query (matches first)
//! 3. release year, month, day ascending (unknown components last)
//! 4. annotation count descending
//!
//! Ties keep their arrival order.

use std::cmp::Reverse;

use crate::models::Candidate;

/// Sort key computed once per candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RankKey {
    artist_match: Reverse<bool>,
    title_match: Reverse<bool>,
    year: DatePart,
    month: DatePart,
    day: DatePart,
    annotations: Reverse<u64>,
}

/// Release date component where unknown sorts after every known value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum DatePart {
    Known(u32),
    Unknown,
}

impl From<Option<u32>> for DatePart {
    fn from(value: Option<u32>) -> Self {
        match value {
            Some(v) if v > 0 => Self::Known(v),
            _ => Self::Unknown,
        }
    }
}

fn contains_field(query: &str, field: &str) -> bool {
    let field = field.trim().to_lowercase();
    !field.is_empty() && query.contains(&field)
}

/// Artist names also match without a leading article ("The Beatles" in "beatles")
fn contains_artist(query: &str, artist: &str) -> bool {
    if contains_field(query, artist) {
        return true;
    }
    let folded = artist.trim().to_lowercase();
    folded
        .strip_prefix("the ")
        .is_some_and(|bare| contains_field(query, bare))
}

impl RankKey {
    /// Compute the key of `candidate` against a case-folded query
    pub fn new(candidate: &Candidate, folded_query: &str) -> Self {
        let date = candidate.release_date;
        Self {
            artist_match: Reverse(contains_artist(folded_query, &candidate.artist)),
            title_match: Reverse(
                contains_field(folded_query, &candidate.title)
                    || contains_field(folded_query, &candidate.full_title),
            ),
            year: date.year.into(),
            month: date.month.into(),
            day: date.day.into(),
            annotations: Reverse(candidate.annotation_count),
        }
    }
}

/// Reorder `candidates` for `query`
///
/// The output has exactly the input's length; equal candidates keep their
/// relative input order.
pub fn rank(mut candidates: Vec<Candidate>, query: &str) -> Vec<Candidate> {
    let folded = query.to_lowercase();
    // sort_by_cached_key is stable
    candidates.sort_by_cached_key(|c| RankKey::new(c, &folded));

    tracing::debug!(
        count = candidates.len(),
        top = candidates.first().map(|c| c.full_title.as_str()).unwrap_or(""),
        "Ranked candidates"
    );

    candidates
}

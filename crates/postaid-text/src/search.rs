#![forbid(unsafe_code)]

//! Normalized substring search.
//!
//! Both sides of a comparison go through [`normalize`] (NFC composition, then
//! lowercase). A [`SearchKey`] additionally keeps the chosung form of the
//! normalized text, so a query of bare initial consonants can match a Korean
//! name.
//!
//! # Example
//! ```
//! use postaid_text::search::{Query, SearchKey};
//!
//! let key = SearchKey::new("김철수");
//! let query = Query::parse("ㅊㅅ").unwrap();
//! assert!(key.contains(&query));
//! assert!(!key.contains_plain(&query));
//! ```

use std::ops::Range;

use unicode_normalization::UnicodeNormalization;

use crate::chosung::{chosung, chosung_char};

/// Compose to NFC and lowercase.
///
/// NFC matters for input produced by decomposing keyboards: conjoining jamo
/// sequences are composed back into syllables before chosung extraction.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.nfc().flat_map(char::to_lowercase).collect()
}

/// A parsed, non-empty search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    normalized: String,
}

impl Query {
    /// Trim and normalize raw input. Returns `None` when nothing is left,
    /// which callers treat as "no filter".
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            normalized: normalize(trimmed),
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.normalized
    }
}

/// Precomputed searchable forms of one text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchKey {
    plain: String,
    initials: String,
}

impl SearchKey {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let plain = normalize(text);
        let initials = chosung(&plain);
        Self { plain, initials }
    }

    #[must_use]
    pub fn plain(&self) -> &str {
        &self.plain
    }

    #[must_use]
    pub fn initials(&self) -> &str {
        &self.initials
    }

    /// Substring match against the normalized text only.
    #[must_use]
    pub fn contains_plain(&self, query: &Query) -> bool {
        self.plain.contains(query.as_str())
    }

    /// Substring match against the normalized text or its chosung form.
    #[must_use]
    pub fn contains(&self, query: &Query) -> bool {
        self.contains_plain(query) || self.initials.contains(query.as_str())
    }
}

/// Byte ranges of `text` covered by matches of `query`, for highlighting.
///
/// Matching runs per character against the lowercase form and the chosung
/// form, so a range always falls on char boundaries of the original text.
/// Overlapping and adjacent ranges are merged; the result is sorted.
#[must_use]
pub fn match_ranges(text: &str, query: &Query, with_initials: bool) -> Vec<Range<usize>> {
    // One entry per normalized char: (lowercase char, chosung char, source span).
    let mut units: Vec<(char, char, Range<usize>)> = Vec::new();
    for (start, c) in text.char_indices() {
        let span = start..start + c.len_utf8();
        for lower in c.to_lowercase() {
            units.push((lower, chosung_char(lower), span.clone()));
        }
    }

    let needle: Vec<char> = query.as_str().chars().collect();
    if needle.is_empty() || needle.len() > units.len() {
        return Vec::new();
    }

    let mut hits: Vec<Range<usize>> = Vec::new();
    collect_hits(&units, &needle, |u| u.0, &mut hits);
    if with_initials {
        collect_hits(&units, &needle, |u| u.1, &mut hits);
    }
    merge_ranges(hits)
}

fn collect_hits<F>(
    units: &[(char, char, Range<usize>)],
    needle: &[char],
    project: F,
    hits: &mut Vec<Range<usize>>,
) where
    F: Fn(&(char, char, Range<usize>)) -> char,
{
    let mut i = 0;
    while i + needle.len() <= units.len() {
        let window = &units[i..i + needle.len()];
        if window.iter().map(&project).eq(needle.iter().copied()) {
            hits.push(window[0].2.start..window[needle.len() - 1].2.end);
            i += needle.len();
        } else {
            i += 1;
        }
    }
}

fn merge_ranges(mut ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    ranges.sort_by_key(|r| (r.start, r.end));
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for r in ranges {
        match merged.last_mut() {
            Some(last) if r.start <= last.end => last.end = last.end.max(r.end),
            _ => merged.push(r),
        }
    }
    merged
}

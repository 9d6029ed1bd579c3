//! Text normalization helpers.
//!
//! `strip_xml` cleans title/abstract markup at the input boundary;
//! `normalize_key` canonicalizes dedup key text so near-identical spellings
//! group together.

use std::sync::LazyLock;

use regex::Regex;

// A header tag squeezed between two words would glue them together when
// removed, so it is replaced with a space first. Capture groups stand in
// for lookaround, which the regex crate does not support.
static HEADER_BETWEEN_WORDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\w.?!])</?h\d>(\w)").expect("valid header-tag regex")
});

static XML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[\w/]+>").expect("valid tag regex"));

/// Strips XML/HTML markup from abstract text.
///
/// Header tags directly between words become a single space; all other tags
/// are removed outright, so inline markup like `<i>` or `<sub>` collapses
/// without introducing spaces.
#[must_use]
pub fn strip_xml(text: &str) -> String {
    let spaced = HEADER_BETWEEN_WORDS_RE.replace_all(text, "${1} ${2}");
    XML_TAG_RE.replace_all(&spaced, "").into_owned()
}

/// Canonicalizes text for use as a dedup key: trimmed, lowercased, internal
/// whitespace runs collapsed to one space.
#[must_use]
pub fn normalize_key(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

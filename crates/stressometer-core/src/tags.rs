//! Tag extraction and the tag column codec.
//!
//! A tag is `#word` or `@word` inside a note. Word characters are ASCII
//! letters, digits and underscore plus the Cyrillic letters used in
//! Belarusian (`а-я`, `А-Я`, `ё`, `і`, `ў` and their capitals).
//!
//! Tags are persisted as a JSON array so that order and duplicates survive
//! a round trip through the store.

use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;

static TAG_RE: OnceLock<Regex> = OnceLock::new();

fn tag_regex() -> &'static Regex {
    TAG_RE.get_or_init(|| {
        // ASCII word class spelled out: `\w` would also admit every Unicode letter.
        Regex::new(r"[@#][A-Za-z0-9_а-яА-ЯёЁіІўЎ]+").expect("tag pattern is a valid regex")
    })
}

/// Extract every tag from `text`, left to right, duplicates included.
///
/// ```
/// use stressometer_core::tags::extract_tags;
///
/// assert_eq!(
///     extract_tags("стомлены #праца праца @шэф #праца"),
///     vec!["#праца", "@шэф", "#праца"],
/// );
/// assert!(extract_tags("усё добра").is_empty());
/// ```
pub fn extract_tags(text: &str) -> Vec<String> {
    tag_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Serialize a tag sequence for storage.
pub fn encode_tags(tags: &[String]) -> String {
    // A Vec<String> always serializes; fall back to an empty array regardless.
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

/// Deserialize a stored tag sequence.
pub fn decode_tags(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw).with_context(|| format!("invalid tags column: {}", raw))
}

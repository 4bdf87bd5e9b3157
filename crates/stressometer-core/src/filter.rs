//! Client-side views over an already-fetched history.
//!
//! The history operation always returns everything; these helpers narrow it
//! for display. All of them preserve the relative order of their input.

use crate::models::HistoryEntry;

/// Keep only entries carrying `tag`. `None` returns the input unchanged.
pub fn filter_by_tag(entries: &[HistoryEntry], tag: Option<&str>) -> Vec<HistoryEntry> {
    match tag {
        None => entries.to_vec(),
        Some(tag) => entries
            .iter()
            .filter(|e| e.tags.iter().any(|t| t == tag))
            .cloned()
            .collect(),
    }
}

/// Every distinct tag across `entries`, in first-seen order.
pub fn collect_tags(entries: &[HistoryEntry]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for tag in entries.iter().flat_map(|e| e.tags.iter()) {
        if !seen.contains(tag) {
            seen.push(tag.clone());
        }
    }
    seen
}

/// The newest `limit` entries, newest first.
///
/// Expects `entries` in ascending creation order, as returned by history.
pub fn most_recent(entries: &[HistoryEntry], limit: usize) -> Vec<HistoryEntry> {
    entries.iter().rev().take(limit).cloned().collect()
}

//! `stress log`: record a new entry.
//!
//! Tags are extracted from the note; any `--tag` values are appended after
//! them, prefixed with `#` when they carry no marker.

use anyhow::Result;

use stressometer_core::models::HistoryEntry;
use stressometer_core::tags::extract_tags;

use crate::service::StressLog;

/// Build the note and tag list the way the entry form does.
pub fn prepare_entry(note_words: &[String], extra_tags: &[String]) -> (Option<String>, Vec<String>) {
    let note = note_words.join(" ");
    let mut tags = extract_tags(&note);
    tags.extend(extra_tags.iter().map(|t| normalize_tag(t)));
    let note = if note.is_empty() { None } else { Some(note) };
    (note, tags)
}

fn normalize_tag(tag: &str) -> String {
    if tag.starts_with('#') || tag.starts_with('@') {
        tag.to_string()
    } else {
        format!("#{}", tag)
    }
}

/// CLI entry point: save and print a one-line confirmation.
pub async fn run_log(
    log: &StressLog,
    level: i64,
    note_words: &[String],
    extra_tags: &[String],
) -> Result<HistoryEntry> {
    let (note, tags) = prepare_entry(note_words, extra_tags);
    let saved = log.save_log(level, note, tags).await?;

    if saved.tags.is_empty() {
        println!("Saved {} (level {}%)", saved.id, saved.level);
    } else {
        println!(
            "Saved {} (level {}%, tags: {})",
            saved.id,
            saved.level,
            saved.tags.join(" ")
        );
    }
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_prepare_extracts_from_note() {
        let (note, tags) = prepare_entry(&words("стомлены #праца @шэф"), &[]);
        assert_eq!(note.as_deref(), Some("стомлены #праца @шэф"));
        assert_eq!(tags, vec!["#праца", "@шэф"]);
    }

    #[test]
    fn test_prepare_appends_explicit_tags() {
        let extra = vec!["дом".to_string(), "@мама".to_string()];
        let (_, tags) = prepare_entry(&words("#праца"), &extra);
        assert_eq!(tags, vec!["#праца", "#дом", "@мама"]);
    }

    #[test]
    fn test_prepare_empty_note() {
        let (note, tags) = prepare_entry(&[], &[]);
        assert!(note.is_none());
        assert!(tags.is_empty());
    }
}

//! Read-side commands: `stress history`, `stress recent`, `stress tags`,
//! and `stress chart`.
//!
//! Each loads the full history once and narrows it client-side.

use anyhow::Result;

use stressometer_core::filter::{collect_tags, filter_by_tag, most_recent};

use crate::service::StressLog;
use crate::view::{render_chart, render_list, render_recent, Palette};

/// Print the full history, oldest first, optionally filtered by tag.
pub async fn run_history(log: &StressLog, tag: Option<&str>, json: bool) -> Result<()> {
    let history = log.get_history().await?;
    let entries = filter_by_tag(&history, tag);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print!("{}", render_list(&entries));
    }
    Ok(())
}

/// Print the newest `limit` entries, newest first.
pub async fn run_recent(log: &StressLog, limit: usize) -> Result<()> {
    let history = log.get_history().await?;
    print!("{}", render_recent(&most_recent(&history, limit), Palette::detect()));
    Ok(())
}

/// Print every selectable tag, one per line, in first-seen order.
pub async fn run_tags(log: &StressLog) -> Result<()> {
    let history = log.get_history().await?;
    let tags = collect_tags(&history);
    if tags.is_empty() {
        println!("No tags yet.");
    }
    for tag in tags {
        println!("{}", tag);
    }
    Ok(())
}

/// Draw the level chart for the whole history or one tag.
pub async fn run_chart(log: &StressLog, tag: Option<&str>) -> Result<()> {
    let history = log.get_history().await?;
    let entries = filter_by_tag(&history, tag);
    print!("{}", render_chart(&entries, tag, Palette::detect()));
    Ok(())
}

//! Terminal rendering of log entries: level colours, zones, the history
//! list, the recent-entries view, and a horizontal bar chart.
//!
//! Rendering functions return `String`s and never touch stdout, so they can
//! be tested directly. Colour is opt-in via [`Palette`].

use chrono::{DateTime, Local, TimeZone};

use stressometer_core::models::HistoryEntry;

/// Upper bound of the comfort zone (inclusive).
pub const COMFORT_MAX: i64 = 30;
/// Lower bound of the danger zone (inclusive).
pub const DANGER_MIN: i64 = 80;

const CHART_WIDTH: usize = 50;
const RECENT_BAR_WIDTH: usize = 20;

/// Hue in degrees for a level: 120 (green) at 0 down to 0 (red) at 100.
pub fn level_hue(level: i64) -> f64 {
    (100 - level.clamp(0, 100)) as f64 * 1.2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Comfort,
    Normal,
    Danger,
}

pub fn zone(level: i64) -> Zone {
    if level <= COMFORT_MAX {
        Zone::Comfort
    } else if level >= DANGER_MIN {
        Zone::Danger
    } else {
        Zone::Normal
    }
}

/// ANSI colouring, or none.
#[derive(Debug, Clone, Copy)]
pub enum Palette {
    Plain,
    Ansi,
}

impl Palette {
    /// ANSI when stdout is a terminal.
    pub fn detect() -> Self {
        if atty::is(atty::Stream::Stdout) {
            Palette::Ansi
        } else {
            Palette::Plain
        }
    }

    fn paint(self, level: i64, text: &str) -> String {
        match self {
            Palette::Plain => text.to_string(),
            Palette::Ansi => {
                let hue = level_hue(level);
                let code = if hue >= 80.0 {
                    32
                } else if hue >= 40.0 {
                    33
                } else {
                    31
                };
                format!("\x1b[{}m{}\x1b[0m", code, text)
            }
        }
    }
}

/// Short axis label: day and month unpadded, minutes padded (`7.3 9:05`).
pub fn format_chart_time<Tz: TimeZone>(ts: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    ts.format("%-d.%-m %-H:%M").to_string()
}

fn local_time(iso: &str) -> Option<DateTime<Local>> {
    DateTime::parse_from_rfc3339(iso)
        .ok()
        .map(|dt| dt.with_timezone(&Local))
}

fn chart_label(iso: &str) -> String {
    local_time(iso)
        .map(|dt| format_chart_time(&dt))
        .unwrap_or_else(|| iso.to_string())
}

fn list_label(iso: &str) -> String {
    local_time(iso)
        .map(|dt| dt.format("%d.%m.%Y, %H:%M:%S").to_string())
        .unwrap_or_else(|| iso.to_string())
}

fn bar(level: i64, width: usize) -> String {
    let filled = (level.clamp(0, 100) as usize * width) / 100;
    format!("{}{}", "█".repeat(filled), "·".repeat(width - filled))
}

/// Full history, one entry per block, in the given order.
pub fn render_list(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No entries yet.\n".to_string();
    }
    let mut out = String::new();
    for e in entries {
        out.push_str(&format!("{}  {:>3}%  {}\n", e.created_at, e.level, e.id));
        if let Some(note) = e.note.as_deref().filter(|n| !n.is_empty()) {
            out.push_str(&format!("    {}\n", note));
        }
        if !e.tags.is_empty() {
            out.push_str(&format!("    tags: {}\n", e.tags.join(" ")));
        }
    }
    out
}

/// The "latest changes" panel: newest first, each with a level bar.
pub fn render_recent(entries: &[HistoryEntry], palette: Palette) -> String {
    if entries.is_empty() {
        return "No entries yet.\n".to_string();
    }
    let mut out = String::new();
    for e in entries {
        let bar = palette.paint(e.level, &bar(e.level, RECENT_BAR_WIDTH));
        out.push_str(&format!(
            "{} {:>3}%  {}  [{}]\n",
            bar,
            e.level,
            list_label(&e.created_at),
            e.id
        ));
        if let Some(note) = e.note.as_deref().filter(|n| !n.is_empty()) {
            for line in note.lines() {
                out.push_str(&format!("    {}\n", line));
            }
        }
        if !e.tags.is_empty() {
            out.push_str(&format!("    {}\n", e.tags.join(" ")));
        }
    }
    out
}

/// Horizontal bar chart of `entries` with comfort and danger zones marked.
pub fn render_chart(entries: &[HistoryEntry], selected: Option<&str>, palette: Palette) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Filter: {}\n",
        selected.unwrap_or("all")
    ));
    if entries.is_empty() {
        out.push_str("No data for this filter.\n");
        return out;
    }

    let comfort_col = COMFORT_MAX as usize * CHART_WIDTH / 100;
    let danger_col = DANGER_MIN as usize * CHART_WIDTH / 100;
    let mut axis = vec![' '; CHART_WIDTH];
    axis[0] = '0';
    axis[comfort_col] = '|';
    axis[danger_col] = '|';
    out.push_str(&format!(
        "{:>11}  {}100\n",
        "",
        axis.iter().collect::<String>()
    ));

    for e in entries {
        let marker = match zone(e.level) {
            Zone::Comfort => "calm",
            Zone::Danger => "HIGH",
            Zone::Normal => "",
        };
        let bar = palette.paint(e.level, &bar(e.level, CHART_WIDTH));
        let mut line = format!(
            "{:>11}  {} {:>3}% {:<4}",
            chart_label(&e.created_at),
            bar,
            e.level,
            marker
        );
        if !e.tags.is_empty() {
            line.push(' ');
            line.push_str(&e.tags.join(" "));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

//! Core data models shared by every store backend and presentation surface.
//!
//! Stored records ([`User`], [`Meter`], [`LogEntry`]) mirror the relational
//! schema. [`HistoryEntry`] is the transport-safe shape returned by the
//! history operation: tags decoded, timestamp rendered as ISO 8601.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// The owner of a meter. Only one is ever created, lazily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
}

/// A named container grouping one user's log entries ("stressometer").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meter {
    pub id: String,
    pub user_id: String,
    pub name: String,
}

/// A log entry to be inserted. The store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub meter_id: String,
    pub level: i64,
    pub note: Option<String>,
    pub tags: Vec<String>,
}

/// A persisted log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub id: String,
    pub meter_id: String,
    pub level: i64,
    pub note: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// One row of the history as seen by callers.
///
/// Field names serialize in camelCase (`meterId`, `createdAt`) so the JSON
/// matches what browser front-ends expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub level: i64,
    pub note: Option<String>,
    pub tags: Vec<String>,
    pub meter_id: String,
    /// ISO 8601 with millisecond precision, e.g. `2025-01-31T08:15:00.000Z`.
    pub created_at: String,
}

impl From<LogEntry> for HistoryEntry {
    fn from(entry: LogEntry) -> Self {
        Self {
            id: entry.id,
            level: entry.level,
            note: entry.note,
            tags: entry.tags,
            meter_id: entry.meter_id,
            created_at: format_ts_iso(&entry.created_at),
        }
    }
}

/// Render a timestamp the way `Date.prototype.toISOString` does.
pub fn format_ts_iso(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

//! SQLite-backed [`Store`] implementation.
//!
//! Maps each [`Store`] operation onto the schema created by
//! [`crate::migrate`]. Timestamps are assigned here at insert time and kept
//! as milliseconds since the epoch; tags are kept as a JSON array.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use stressometer_core::models::{LogEntry, Meter, NewLogEntry, User};
use stressometer_core::store::{Store, StoreError};
use stressometer_core::tags::{decode_tags, encode_tags};

/// SQLite implementation of the [`Store`] trait.
///
/// Wraps a [`SqlitePool`]; the pool is cheap to clone, so the store can be
/// shared behind an `Arc` by the CLI and the HTTP server alike.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| anyhow!("timestamp out of range: {}", ms))
}

fn log_from_row(row: &SqliteRow) -> Result<LogEntry> {
    let tags_raw: String = row.get("tags");
    Ok(LogEntry {
        id: row.get("id"),
        meter_id: row.get("meter_id"),
        level: row.get("level"),
        note: row.get("note"),
        tags: decode_tags(&tags_raw)?,
        created_at: from_millis(row.get("created_at"))?,
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, email FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| User {
            id: r.get("id"),
            email: r.get("email"),
        }))
    }

    async fn create_user(&self, email: &str) -> Result<User> {
        let user = User {
            id: new_id(),
            email: email.to_string(),
        };

        let result = sqlx::query("INSERT INTO users (id, email, created_at) VALUES (?, ?, ?)")
            .bind(&user.id)
            .bind(&user.email)
            .bind(Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::user_conflict(email).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_first_meter(&self, user_id: &str) -> Result<Option<Meter>> {
        let row = sqlx::query(
            "SELECT id, user_id, name FROM meters WHERE user_id = ? \
             ORDER BY created_at ASC, rowid ASC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Meter {
            id: r.get("id"),
            user_id: r.get("user_id"),
            name: r.get("name"),
        }))
    }

    async fn create_meter(&self, user_id: &str, name: &str) -> Result<Meter> {
        let meter = Meter {
            id: new_id(),
            user_id: user_id.to_string(),
            name: name.to_string(),
        };

        sqlx::query("INSERT INTO meters (id, user_id, name, created_at) VALUES (?, ?, ?, ?)")
            .bind(&meter.id)
            .bind(&meter.user_id)
            .bind(&meter.name)
            .bind(Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await?;

        Ok(meter)
    }

    async fn insert_log(&self, entry: &NewLogEntry) -> Result<LogEntry> {
        let created_at = from_millis(Utc::now().timestamp_millis())?;
        let stored = LogEntry {
            id: new_id(),
            meter_id: entry.meter_id.clone(),
            level: entry.level,
            note: entry.note.clone(),
            tags: entry.tags.clone(),
            created_at,
        };

        sqlx::query(
            r#"
            INSERT INTO logs (id, level, note, tags, meter_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&stored.id)
        .bind(stored.level)
        .bind(&stored.note)
        .bind(encode_tags(&stored.tags))
        .bind(&stored.meter_id)
        .bind(stored.created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn list_logs(&self, meter_id: &str) -> Result<Vec<LogEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, level, note, tags, meter_id, created_at
            FROM logs
            WHERE meter_id = ?
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(meter_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(log_from_row).collect()
    }

    async fn delete_log(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM logs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

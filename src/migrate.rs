//! Database schema migrations.
//!
//! Every statement is `IF NOT EXISTS`, so running `stress init` repeatedly
//! is safe. Tables: `users`, `meters`, `logs`.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Connect to the configured database and bring its schema up to date.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create all tables and indexes on an open pool.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    // The UNIQUE email is what makes default-user creation race-safe.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meters (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // created_at is milliseconds since the Unix epoch.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS logs (
            id TEXT PRIMARY KEY,
            level INTEGER NOT NULL,
            note TEXT,
            tags TEXT NOT NULL DEFAULT '[]',
            meter_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (meter_id) REFERENCES meters(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_meters_user_id ON meters(user_id)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_logs_meter_created ON logs(meter_id, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

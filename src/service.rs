//! The [`StressLog`] handle: save, list, and delete log entries under the
//! default meter.
//!
//! A handle is built once at startup and passed explicitly to CLI commands
//! and to the HTTP server state. The default meter is resolved on the first
//! operation and remembered; concurrent first callers share one resolution.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use stressometer_core::context::{resolve_default_meter, DefaultIdentity};
use stressometer_core::models::{HistoryEntry, NewLogEntry};
use stressometer_core::store::{Store, StoreError};

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::sqlite_store::SqliteStore;

pub struct StressLog {
    store: Arc<dyn Store>,
    identity: DefaultIdentity,
    meter_id: OnceCell<String>,
}

impl StressLog {
    pub fn new(store: Arc<dyn Store>, identity: DefaultIdentity) -> Self {
        Self {
            store,
            identity,
            meter_id: OnceCell::new(),
        }
    }

    /// Open the configured SQLite database, ensure its schema, and wrap it.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::apply_schema(&pool).await?;
        Ok(Self::new(
            Arc::new(SqliteStore::new(pool)),
            config.meter.identity(),
        ))
    }

    /// The default meter's id, creating the user and meter on first use.
    pub async fn meter_id(&self) -> Result<&str> {
        let id = self
            .meter_id
            .get_or_try_init(|| async {
                let id = resolve_default_meter(self.store.as_ref(), &self.identity).await?;
                debug!(meter_id = %id, email = %self.identity.email, "resolved default meter");
                Ok::<_, anyhow::Error>(id)
            })
            .await?;
        Ok(id.as_str())
    }

    /// Record a new entry. `level` is stored as given, without range checks.
    pub async fn save_log(
        &self,
        level: i64,
        note: Option<String>,
        tags: Vec<String>,
    ) -> Result<HistoryEntry> {
        let meter_id = self.meter_id().await?.to_string();
        let stored = self
            .store
            .insert_log(&NewLogEntry {
                meter_id,
                level,
                note,
                tags,
            })
            .await?;
        info!(id = %stored.id, level = stored.level, tags = stored.tags.len(), "saved log entry");
        Ok(stored.into())
    }

    /// The full history of the default meter, oldest first.
    pub async fn get_history(&self) -> Result<Vec<HistoryEntry>> {
        let meter_id = self.meter_id().await?;
        let logs = self.store.list_logs(meter_id).await?;
        Ok(logs.into_iter().map(HistoryEntry::from).collect())
    }

    /// Permanently remove one entry.
    ///
    /// Fails with [`StoreError::NotFound`] when `id` does not exist.
    pub async fn delete_log(&self, id: &str) -> Result<()> {
        if !self.store.delete_log(id).await? {
            return Err(StoreError::log_not_found(id).into());
        }
        info!(id = %id, "deleted log entry");
        Ok(())
    }
}

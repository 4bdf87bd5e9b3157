//! In-memory [`Store`] implementation for testing.
//!
//! Uses `Vec`s behind `std::sync::RwLock`. Insertion order doubles as
//! creation order, which is what "first meter" and timestamp ties rely on.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;

use crate::models::{LogEntry, Meter, NewLogEntry, User};

use super::{Store, StoreError};

/// In-memory store for tests and embedding.
pub struct InMemoryStore {
    users: RwLock<Vec<User>>,
    meters: RwLock<Vec<Meter>>,
    logs: RwLock<Vec<LogEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            meters: RwLock::new(Vec::new()),
            logs: RwLock::new(Vec::new()),
        }
    }

    /// Number of users ever created (users are never deleted).
    pub fn user_count(&self) -> usize {
        read(&self.users).map(|u| u.len()).unwrap_or(0)
    }

    /// Number of meters ever created (meters are never deleted).
    pub fn meter_count(&self) -> usize {
        read(&self.meters).map(|m| m.len()).unwrap_or(0)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| anyhow!("in-memory store lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| anyhow!("in-memory store lock poisoned"))
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[async_trait]
impl Store for InMemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(read(&self.users)?.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, email: &str) -> Result<User> {
        let mut users = write(&self.users)?;
        if users.iter().any(|u| u.email == email) {
            return Err(StoreError::user_conflict(email).into());
        }
        let user = User {
            id: new_id(),
            email: email.to_string(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_first_meter(&self, user_id: &str) -> Result<Option<Meter>> {
        Ok(read(&self.meters)?
            .iter()
            .find(|m| m.user_id == user_id)
            .cloned())
    }

    async fn create_meter(&self, user_id: &str, name: &str) -> Result<Meter> {
        let meter = Meter {
            id: new_id(),
            user_id: user_id.to_string(),
            name: name.to_string(),
        };
        write(&self.meters)?.push(meter.clone());
        Ok(meter)
    }

    async fn insert_log(&self, entry: &NewLogEntry) -> Result<LogEntry> {
        let stored = LogEntry {
            id: new_id(),
            meter_id: entry.meter_id.clone(),
            level: entry.level,
            note: entry.note.clone(),
            tags: entry.tags.clone(),
            created_at: Utc::now(),
        };
        write(&self.logs)?.push(stored.clone());
        Ok(stored)
    }

    async fn list_logs(&self, meter_id: &str) -> Result<Vec<LogEntry>> {
        let mut logs: Vec<LogEntry> = read(&self.logs)?
            .iter()
            .filter(|l| l.meter_id == meter_id)
            .cloned()
            .collect();
        // Stable: equal timestamps keep insertion order.
        logs.sort_by_key(|l| l.created_at);
        Ok(logs)
    }

    async fn delete_log(&self, id: &str) -> Result<bool> {
        let mut logs = write(&self.logs)?;
        let before = logs.len();
        logs.retain(|l| l.id != id);
        Ok(logs.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_entry(meter_id: &str, level: i64) -> NewLogEntry {
        NewLogEntry {
            meter_id: meter_id.to_string(),
            level,
            note: Some(format!("level {}", level)),
            tags: vec!["#t".to_string()],
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = InMemoryStore::new();
        store.create_user("a@b.c").await.unwrap();
        let err = store.create_user("a@b.c").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Conflict { .. })
        ));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_first_meter_is_earliest() {
        let store = InMemoryStore::new();
        let first = store.create_meter("u1", "one").await.unwrap();
        store.create_meter("u1", "two").await.unwrap();
        let found = store.find_first_meter("u1").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert!(store.find_first_meter("u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_scoped_and_ordered() {
        let store = InMemoryStore::new();
        for level in [10, 20, 30] {
            store.insert_log(&new_entry("m1", level)).await.unwrap();
        }
        store.insert_log(&new_entry("m2", 99)).await.unwrap();

        let logs = store.list_logs("m1").await.unwrap();
        let levels: Vec<i64> = logs.iter().map(|l| l.level).collect();
        assert_eq!(levels, vec![10, 20, 30]);
        assert!(logs.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[tokio::test]
    async fn test_delete_reports_missing() {
        let store = InMemoryStore::new();
        let entry = store.insert_log(&new_entry("m1", 5)).await.unwrap();
        assert!(!store.delete_log("nope").await.unwrap());
        assert_eq!(store.list_logs("m1").await.unwrap().len(), 1);
        assert!(store.delete_log(&entry.id).await.unwrap());
        assert!(store.list_logs("m1").await.unwrap().is_empty());
    }
}

//! Storage abstraction for Stressometer.
//!
//! The [`Store`] trait covers every persistence operation the application
//! needs: user and meter lookup/creation for the default context, and
//! create/list/delete over log entries. Backends (SQLite, in-memory) only
//! implement these primitives; get-or-create policy lives in
//! [`crate::context`].
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{LogEntry, Meter, NewLogEntry, User};

/// Typed storage conditions callers may need to tell apart.
///
/// Backends return these wrapped in [`anyhow::Error`]; recover them with
/// `err.downcast_ref::<StoreError>()`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    /// A uniqueness constraint rejected the write.
    #[error("{kind} already exists: {key}")]
    Conflict { kind: &'static str, key: String },
}

impl StoreError {
    pub fn log_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "log entry",
            id: id.into(),
        }
    }

    pub fn user_conflict(email: impl Into<String>) -> Self {
        Self::Conflict {
            kind: "user",
            key: email.into(),
        }
    }
}

/// Abstract storage backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`find_user_by_email`](Store::find_user_by_email) | Look up a user by its unique email |
/// | [`create_user`](Store::create_user) | Insert a user; [`StoreError::Conflict`] on duplicate email |
/// | [`find_first_meter`](Store::find_first_meter) | The user's earliest-created meter |
/// | [`create_meter`](Store::create_meter) | Insert a meter for a user |
/// | [`insert_log`](Store::insert_log) | Insert a log entry, assigning id and timestamp |
/// | [`list_logs`](Store::list_logs) | All entries of a meter, oldest first |
/// | [`delete_log`](Store::delete_log) | Hard-delete one entry by id |
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Create a user with the given email.
    ///
    /// Must fail with [`StoreError::Conflict`] when the email is taken.
    async fn create_user(&self, email: &str) -> Result<User>;

    async fn find_first_meter(&self, user_id: &str) -> Result<Option<Meter>>;

    async fn create_meter(&self, user_id: &str, name: &str) -> Result<Meter>;

    /// Persist a new entry. The store assigns the id and the creation time.
    async fn insert_log(&self, entry: &NewLogEntry) -> Result<LogEntry>;

    /// All entries of `meter_id` ordered by creation time ascending;
    /// entries created at the same instant keep insertion order.
    async fn list_logs(&self, meter_id: &str) -> Result<Vec<LogEntry>>;

    /// Delete one entry by id. Returns `false` when no such entry exists.
    async fn delete_log(&self, id: &str) -> Result<bool>;
}

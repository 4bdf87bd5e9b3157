//! Default-context resolution: the single user and meter every operation
//! writes under.
//!
//! Both records are created lazily on first use. User creation relies on the
//! store's unique-email constraint: when a concurrent caller wins the race,
//! the conflict is caught and the winner's record is re-fetched.

use anyhow::{anyhow, Result};
use tracing::warn;

use crate::store::{Store, StoreError};

/// Email of the implicit user.
pub const DEFAULT_EMAIL: &str = "default@user.com";
/// Display name given to the implicit meter.
pub const DEFAULT_METER_NAME: &str = "Асноўны Стрэсометр";

/// Identity of the default user/meter pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultIdentity {
    pub email: String,
    pub meter_name: String,
}

impl Default for DefaultIdentity {
    fn default() -> Self {
        Self {
            email: DEFAULT_EMAIL.to_string(),
            meter_name: DEFAULT_METER_NAME.to_string(),
        }
    }
}

/// Find or create the default user and its first meter; return the meter id.
///
/// Performs at most two writes, and only on the very first call against a
/// given store.
pub async fn resolve_default_meter(store: &dyn Store, identity: &DefaultIdentity) -> Result<String> {
    let user = match store.find_user_by_email(&identity.email).await? {
        Some(user) => user,
        None => match store.create_user(&identity.email).await {
            Ok(user) => user,
            Err(err) if is_conflict(&err) => {
                warn!(email = %identity.email, "default user created concurrently, re-fetching");
                store
                    .find_user_by_email(&identity.email)
                    .await?
                    .ok_or_else(|| anyhow!("user {} vanished after conflict", identity.email))?
            }
            Err(err) => return Err(err),
        },
    };

    let meter = match store.find_first_meter(&user.id).await? {
        Some(meter) => meter,
        None => store.create_meter(&user.id, &identity.meter_name).await?,
    };

    Ok(meter.id)
}

fn is_conflict(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::Conflict { .. })
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LogEntry, Meter, NewLogEntry, User};
    use crate::store::memory::InMemoryStore;
    use async_trait::async_trait;
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_resolve_twice_is_stable() {
        let store = InMemoryStore::new();
        let identity = DefaultIdentity::default();

        let first = resolve_default_meter(&store, &identity).await.unwrap();
        let second = resolve_default_meter(&store, &identity).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.user_count(), 1);
        assert_eq!(store.meter_count(), 1);
    }

    #[tokio::test]
    async fn test_reuses_existing_meter() {
        let store = InMemoryStore::new();
        let user = store.create_user(DEFAULT_EMAIL).await.unwrap();
        let meter = store.create_meter(&user.id, "існуючы").await.unwrap();

        let resolved = resolve_default_meter(&store, &DefaultIdentity::default())
            .await
            .unwrap();

        assert_eq!(resolved, meter.id);
        assert_eq!(store.meter_count(), 1);
    }

    #[tokio::test]
    async fn test_custom_identity() {
        let store = InMemoryStore::new();
        let identity = DefaultIdentity {
            email: "me@example.org".to_string(),
            meter_name: "Work".to_string(),
        };
        let meter_id = resolve_default_meter(&store, &identity).await.unwrap();

        let user = store.find_user_by_email("me@example.org").await.unwrap().unwrap();
        let meter = store.find_first_meter(&user.id).await.unwrap().unwrap();
        assert_eq!(meter.id, meter_id);
        assert_eq!(meter.name, "Work");
        assert!(store.find_user_by_email(DEFAULT_EMAIL).await.unwrap().is_none());
    }

    /// Reports "no user" once, as a racing caller would observe, while the
    /// user already exists underneath.
    struct RacingStore {
        inner: InMemoryStore,
        hide_user_once: AtomicBool,
    }

    #[async_trait]
    impl Store for RacingStore {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
            if self.hide_user_once.swap(false, Ordering::SeqCst) {
                return Ok(None);
            }
            self.inner.find_user_by_email(email).await
        }
        async fn create_user(&self, email: &str) -> Result<User> {
            self.inner.create_user(email).await
        }
        async fn find_first_meter(&self, user_id: &str) -> Result<Option<Meter>> {
            self.inner.find_first_meter(user_id).await
        }
        async fn create_meter(&self, user_id: &str, name: &str) -> Result<Meter> {
            self.inner.create_meter(user_id, name).await
        }
        async fn insert_log(&self, entry: &NewLogEntry) -> Result<LogEntry> {
            self.inner.insert_log(entry).await
        }
        async fn list_logs(&self, meter_id: &str) -> Result<Vec<LogEntry>> {
            self.inner.list_logs(meter_id).await
        }
        async fn delete_log(&self, id: &str) -> Result<bool> {
            self.inner.delete_log(id).await
        }
    }

    #[tokio::test]
    async fn test_conflict_refetches_winner() {
        let store = RacingStore {
            inner: InMemoryStore::new(),
            hide_user_once: AtomicBool::new(true),
        };
        let winner = store.inner.create_user(DEFAULT_EMAIL).await.unwrap();

        let buf = Arc::new(Mutex::new(Vec::new()));
        let writer = CaptureWriter(buf.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        // current-thread runtime: the guard covers every await below.
        let _guard = tracing::subscriber::set_default(subscriber);

        let meter_id = resolve_default_meter(&store, &DefaultIdentity::default())
            .await
            .unwrap();

        assert_eq!(store.inner.user_count(), 1);
        let meter = store.inner.find_first_meter(&winner.id).await.unwrap().unwrap();
        assert_eq!(meter.id, meter_id);

        let output = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"), "missing warning: {}", output);
        assert!(output.contains("re-fetching"));
        assert!(output.contains(DEFAULT_EMAIL));
    }

    /// Collects formatted log lines for inspection.
    #[derive(Clone)]
    struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CaptureWriter {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(data);
            Ok(data.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}

//! SQLite-backed store and service tests.
//!
//! Every test gets its own temporary database file.

use std::sync::Arc;

use stressometer::config::Config;
use stressometer::db;
use stressometer::migrate;
use stressometer::service::StressLog;
use stressometer::sqlite_store::SqliteStore;
use stressometer_core::context::{resolve_default_meter, DefaultIdentity, DEFAULT_EMAIL};
use stressometer_core::filter::filter_by_tag;
use stressometer_core::models::NewLogEntry;
use stressometer_core::store::{Store, StoreError};
use stressometer_core::tags::extract_tags;
use tempfile::TempDir;

fn test_config(tmp: &TempDir) -> Config {
    let db_path = tmp.path().join("stress.sqlite");
    let config_content = format!(
        r#"
[db]
path = "{}"
"#,
        db_path.display()
    );
    toml::from_str(&config_content).unwrap()
}

async fn open_store(cfg: &Config) -> SqliteStore {
    migrate::run_migrations(cfg).await.unwrap();
    SqliteStore::new(db::connect(cfg).await.unwrap())
}

async fn count(store: &SqliteStore, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(store.pool())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_resolver_creates_once() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&test_config(&tmp)).await;
    let identity = DefaultIdentity::default();

    let first = resolve_default_meter(&store, &identity).await.unwrap();
    let second = resolve_default_meter(&store, &identity).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(count(&store, "users").await, 1);
    assert_eq!(count(&store, "meters").await, 1);
    assert!(store.find_user_by_email(DEFAULT_EMAIL).await.unwrap().is_some());
}

#[tokio::test]
async fn test_duplicate_user_is_conflict() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&test_config(&tmp)).await;

    store.create_user("a@b.c").await.unwrap();
    let err = store.create_user("a@b.c").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::Conflict { .. })
    ));
    assert_eq!(count(&store, "users").await, 1);
}

#[tokio::test]
async fn test_tags_round_trip_through_sqlite() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&test_config(&tmp)).await;
    let meter_id = resolve_default_meter(&store, &DefaultIdentity::default())
        .await
        .unwrap();

    let tags = vec![
        "@шэф".to_string(),
        "#праца".to_string(),
        "#a_1".to_string(),
        "#праца".to_string(),
    ];
    store
        .insert_log(&NewLogEntry {
            meter_id: meter_id.clone(),
            level: 55,
            note: None,
            tags: tags.clone(),
        })
        .await
        .unwrap();

    let logs = store.list_logs(&meter_id).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].tags, tags);
    assert_eq!(logs[0].note, None);
}

#[tokio::test]
async fn test_save_history_delete_cycle() {
    let tmp = TempDir::new().unwrap();
    let log = StressLog::open(&test_config(&tmp)).await.unwrap();

    for (level, note) in [(20, "раніца #дом"), (65, "нарада #праца @шэф"), (90, "дэдлайн #праца")] {
        log.save_log(level, Some(note.to_string()), extract_tags(note))
            .await
            .unwrap();
    }

    let history = log.get_history().await.unwrap();
    assert_eq!(history.len(), 3);
    assert!(history.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    let last = history.last().unwrap();
    assert_eq!(last.level, 90);
    assert_eq!(last.note.as_deref(), Some("дэдлайн #праца"));
    assert_eq!(last.tags, vec!["#праца"]);

    assert_eq!(log.get_history().await.unwrap(), history);

    let work = filter_by_tag(&history, Some("#праца"));
    assert_eq!(work.len(), 2);

    let gone = history[1].id.clone();
    log.delete_log(&gone).await.unwrap();
    let after = log.get_history().await.unwrap();
    assert_eq!(after.len(), 2);
    assert!(after.iter().all(|e| e.id != gone));

    let err = log.delete_log(&gone).await.unwrap_err();
    assert!(err.to_string().contains("not found"));
    assert_eq!(log.get_history().await.unwrap(), after);
}

#[tokio::test]
async fn test_same_instant_keeps_insertion_order() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&test_config(&tmp)).await;
    let meter_id = resolve_default_meter(&store, &DefaultIdentity::default())
        .await
        .unwrap();

    for (id, level) in [("b", 1_i64), ("a", 2), ("c", 3)] {
        sqlx::query(
            "INSERT INTO logs (id, level, note, tags, meter_id, created_at) VALUES (?, ?, NULL, '[]', ?, 1700000000000)",
        )
        .bind(id)
        .bind(level)
        .bind(&meter_id)
        .execute(store.pool())
        .await
        .unwrap();
    }

    let logs = store.list_logs(&meter_id).await.unwrap();
    let ids: Vec<&str> = logs.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a", "c"]);
}

#[tokio::test]
async fn test_history_persists_across_handles() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);

    let saved = {
        let log = StressLog::open(&cfg).await.unwrap();
        log.save_log(33, Some("x".to_string()), vec![]).await.unwrap()
    };

    let log = StressLog::open(&cfg).await.unwrap();
    let history = log.get_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, saved.id);
    assert_eq!(history[0].meter_id, saved.meter_id);
}

#[tokio::test]
async fn test_concurrent_saves_share_one_meter() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let log = Arc::new(StressLog::open(&cfg).await.unwrap());

    let mut handles = Vec::new();
    for level in 0..6 {
        let log = log.clone();
        handles.push(tokio::spawn(async move {
            log.save_log(level, None, vec![]).await.unwrap()
        }));
    }
    let mut meters = Vec::new();
    for h in handles {
        meters.push(h.await.unwrap().meter_id);
    }
    meters.dedup();
    assert_eq!(meters.len(), 1, "all saves should land in the same meter");

    let store = open_store(&cfg).await;
    assert_eq!(count(&store, "users").await, 1);
    assert_eq!(count(&store, "meters").await, 1);
    assert_eq!(count(&store, "logs").await, 6);
}

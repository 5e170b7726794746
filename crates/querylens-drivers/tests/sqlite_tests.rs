#![cfg(feature = "sqlite")]

//! Opening SQLite engines through the registry

use pretty_assertions::assert_eq;
use querylens_drivers::{DatabaseEngine, EngineTarget, connect, supported_engines};

#[test]
fn test_sqlite_target_from_path() {
    assert_eq!(EngineTarget::sqlite(":memory:"), EngineTarget::SqliteMemory);
    assert_eq!(
        EngineTarget::sqlite("data/app.db"),
        EngineTarget::SqliteFile("data/app.db".into())
    );
    assert_eq!(EngineTarget::sqlite("data/app.db").to_string(), "sqlite:data/app.db");
    assert!(supported_engines().contains(&"sqlite"));
}

#[test]
fn test_postgres_target_hides_connection_string() {
    let target = EngineTarget::postgres("postgresql://admin:secret@db/app");

    assert_eq!(target.engine_name(), "postgresql");
    assert!(!target.to_string().contains("secret"));
}

#[tokio::test]
async fn test_connect_in_memory() {
    let engine = connect(&EngineTarget::SqliteMemory).await.unwrap();

    engine
        .execute_batch("CREATE TABLE t (a INTEGER); INSERT INTO t VALUES (1), (2);")
        .await
        .unwrap();

    assert_eq!(engine.engine_name(), "sqlite");
    assert_eq!(engine.execute("SELECT * FROM t").await.unwrap().rows_affected, 2);
}

#[tokio::test]
async fn test_connect_file_persists() {
    let dir = tempfile::tempdir().unwrap();
    let target = EngineTarget::sqlite(dir.path().join("q.db"));

    {
        let engine = connect(&target).await.unwrap();
        engine.execute_batch("CREATE TABLE t (a INTEGER);").await.unwrap();
    }

    let engine = connect(&target).await.unwrap();
    assert!(engine.explain("SELECT * FROM t").await.unwrap().has_sequential_scans());
}

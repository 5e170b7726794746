//! Tests for the SQLite engine

use super::*;
use pretty_assertions::assert_eq;
use querylens_core::NodeKind;

const SCHEMA: &str = "
    CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT NOT NULL, name TEXT);
    CREATE TABLE orders (
        id INTEGER PRIMARY KEY,
        user_id INTEGER NOT NULL,
        status TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    INSERT INTO users (id, email, name) VALUES
        (1, 'ada@example.com', 'Ada'),
        (2, 'grace@example.com', 'Grace');
    INSERT INTO orders (user_id, status, created_at) VALUES
        (1, 'paid', '2024-01-01'),
        (1, 'open', '2024-01-02'),
        (2, 'paid', '2024-01-03');
";

async fn seeded_engine() -> SqliteEngine {
    let engine = SqliteEngine::open_in_memory().expect("open in-memory database");
    engine.execute_batch(SCHEMA).await.expect("seed schema");
    engine
}

#[tokio::test]
async fn test_explain_full_scan_without_index() {
    let engine = seeded_engine().await;

    let plan = engine
        .explain("SELECT * FROM orders WHERE status = 'paid'")
        .await
        .unwrap();

    assert!(plan.has_sequential_scans());
    let scans = plan.find_nodes_by_kind(NodeKind::SeqScan);
    assert_eq!(scans[0].relation.as_deref(), Some("orders"));
    assert_eq!(plan.total_cost(), Some(0.0));
}

#[tokio::test]
async fn test_explain_uses_created_index() {
    let engine = seeded_engine().await;
    engine
        .execute_batch("CREATE INDEX idx_orders_status ON orders (status);")
        .await
        .unwrap();

    let plan = engine
        .explain("SELECT * FROM orders WHERE status = 'paid'")
        .await
        .unwrap();

    assert!(!plan.has_sequential_scans());
    let names: Vec<_> = plan
        .iter_nodes()
        .filter_map(|n| n.index_name.as_deref())
        .collect();
    assert_eq!(names, vec!["idx_orders_status"]);
}

#[tokio::test]
async fn test_explain_join_is_nested_loop() {
    let engine = seeded_engine().await;

    let plan = engine
        .explain("SELECT * FROM users u JOIN orders o ON u.id = o.user_id")
        .await
        .unwrap();

    assert!(!plan.find_nodes_by_kind(NodeKind::NestedLoop).is_empty());
}

#[tokio::test]
async fn test_explain_invalid_sql() {
    let engine = seeded_engine().await;

    let err = engine.explain("SELEC nonsense").await.unwrap_err();

    assert!(matches!(err, QueryLensError::Explain(_)));
}

#[tokio::test]
async fn test_explain_unknown_table() {
    let engine = seeded_engine().await;

    let err = engine.explain("SELECT * FROM missing").await.unwrap_err();

    assert!(err.to_string().contains("no such table"));
}

#[tokio::test]
async fn test_execute_counts_returned_rows() {
    let engine = seeded_engine().await;

    let outcome = engine
        .execute("SELECT * FROM orders WHERE status = 'paid'")
        .await
        .unwrap();

    assert_eq!(outcome.rows_affected, 2);
}

#[tokio::test]
async fn test_execute_counts_changed_rows() {
    let engine = seeded_engine().await;

    let outcome = engine
        .execute("UPDATE orders SET status = 'shipped' WHERE user_id = 1")
        .await
        .unwrap();

    assert_eq!(outcome.rows_affected, 2);
}

#[tokio::test]
async fn test_execute_error_is_query_error() {
    let engine = seeded_engine().await;

    let err = engine.execute("SELECT * FROM missing").await.unwrap_err();

    assert!(matches!(err, QueryLensError::Query(_)));
    assert!(err.to_string().contains("no such table: missing"));
}

#[tokio::test]
async fn test_open_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analysis.db");

    let engine = SqliteEngine::open(&path).unwrap();
    engine
        .execute_batch("CREATE TABLE t (a INTEGER); INSERT INTO t VALUES (1);")
        .await
        .unwrap();

    assert!(path.exists());
    assert_eq!(engine.engine_name(), "sqlite");
    assert_eq!(engine.execute("SELECT a FROM t").await.unwrap().rows_affected, 1);
}

#[test]
fn test_open_missing_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope").join("analysis.db");

    let err = SqliteEngine::open(&path).err().expect("open should fail");

    assert!(matches!(err, QueryLensError::Connection(_)));
    assert!(err.to_string().contains("Parent directory does not exist"));
}

#[tokio::test]
async fn test_execute_batch_error() {
    let engine = seeded_engine().await;

    let err = engine
        .execute_batch("CREATE TABLE users (id INTEGER);")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("already exists"));
}

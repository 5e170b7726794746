//! EXPLAIN adapters
//!
//! Each adapter turns one engine's native EXPLAIN output into the shared
//! [`querylens_core::QueryPlan`] shape:
//! - PostgreSQL (`EXPLAIN (FORMAT JSON)` and the default text format)
//! - SQLite (`EXPLAIN QUERY PLAN`, as tree text or as raw rows)
//!
//! # Example
//!
//! ```
//! use querylens_analyzer::explain::{parse_postgres_explain, parse_sqlite_explain};
//! use querylens_core::NodeKind;
//!
//! let pg_json = r#"[{"Plan": {"Node Type": "Seq Scan", "Relation Name": "users"}}]"#;
//! let plan = parse_postgres_explain(pg_json).unwrap();
//! assert!(plan.has_sequential_scans());
//!
//! let plan = parse_sqlite_explain("QUERY PLAN\n|--SCAN users").unwrap();
//! assert_eq!(plan.root.unwrap().kind(), NodeKind::SeqScan);
//! ```

pub mod postgres;
pub mod sqlite;

pub use postgres::{
    PostgresExplainError, parse_json_explain, parse_json_value, parse_postgres_explain,
    parse_text_explain,
};
pub use sqlite::{SqliteExplainError, SqlitePlanRow, parse_sqlite_explain, plan_from_rows};

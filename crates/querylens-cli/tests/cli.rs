//! Runs the `querylens` binary end to end

use pretty_assertions::assert_eq;
use std::io::Write as _;
use std::process::{Command, Output};

fn querylens(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_querylens"))
        .args(args)
        .env("RUST_LOG", "off")
        .env_remove("QUERYLENS_CONFIG")
        .output()
        .expect("failed to run querylens")
}

fn setup_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER, status TEXT);
         INSERT INTO orders (user_id, status) VALUES (1, 'paid'), (2, 'open'), (3, 'paid');"
    )
    .unwrap();
    file
}

#[test]
fn test_normalize() {
    let output = querylens(&["normalize", "SELECT *\n  FROM t WHERE id = $1"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "select * from t where id = ?\n");
}

#[test]
fn test_analyze_sqlite_json() {
    let setup = setup_file();
    let output = querylens(&[
        "analyze",
        "--sqlite",
        ":memory:",
        "--setup",
        setup.path().to_str().unwrap(),
        "--json",
        "--stats",
        "SELECT * FROM orders o WHERE o.status = 'paid'",
    ]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    let analysis = &report["analyses"][0];
    assert_eq!(analysis["performance"]["rows_affected"], 2);
    assert_eq!(
        analysis["index_recommendations"][0]["create_statement"],
        "CREATE INDEX idx_orders_status ON orders (status);"
    );
    assert_eq!(analysis["suggestions"][0]["type"], "index");
    assert_eq!(report["stats"]["total_queries"], 1);
}

#[test]
fn test_analyze_table_output() {
    let setup = setup_file();
    let output = querylens(&[
        "analyze",
        "--sqlite",
        ":memory:",
        "--setup",
        setup.path().to_str().unwrap(),
        "SELECT * FROM orders WHERE id = 1",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Plan:"));
    assert!(stdout.contains("Index Scan on orders"));
}

#[test]
fn test_failed_statement_exits_nonzero() {
    let output = querylens(&["analyze", "--sqlite", ":memory:", "SELECT * FROM missing"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no such table"));
}

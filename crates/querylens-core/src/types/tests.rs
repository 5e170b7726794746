//! Tests for core records

use super::*;

#[test]
fn test_performance_builder() {
    let perf = QueryPerformance::new("SELECT 1", Duration::from_millis(42), 1)
        .with_plan_cost(Some(3.5))
        .with_index_usage(vec!["users_pkey".to_string()]);

    assert_eq!(perf.query, "SELECT 1");
    assert_eq!(perf.rows_affected, 1);
    assert_eq!(perf.plan_cost, Some(3.5));
    assert_eq!(perf.index_usage, vec!["users_pkey"]);
    assert!((perf.execution_time_ms() - 42.0).abs() < 1e-9);
}

#[test]
fn test_performance_serializes_time_in_millis() {
    let perf = QueryPerformance::new("SELECT 1", Duration::from_millis(1500), 0);

    let json = serde_json::to_value(&perf).unwrap();
    assert_eq!(json["execution_time_ms"], serde_json::json!(1500.0));
    assert!(json.get("execution_time").is_none());

    let back: QueryPerformance = serde_json::from_value(json).unwrap();
    assert_eq!(back.execution_time, Duration::from_millis(1500));
}

#[test]
fn test_negative_execution_time_is_rejected() {
    let json = serde_json::json!({
        "query": "SELECT 1",
        "execution_time_ms": -5.0,
        "rows_affected": 0,
        "plan_cost": null,
        "index_usage": [],
        "timestamp": "2025-01-01T00:00:00Z"
    });

    assert!(serde_json::from_value::<QueryPerformance>(json).is_err());
}

#[test]
fn test_execution_outcome() {
    assert_eq!(ExecutionOutcome::new(7).rows_affected, 7);
    assert_eq!(ExecutionOutcome::default().rows_affected, 0);
}

#[test]
fn test_out_of_range_execution_time_is_rejected() {
    let json = r#"{
        "query": "SELECT 1",
        "execution_time_ms": 1e300,
        "rows_affected": 0,
        "plan_cost": null,
        "index_usage": [],
        "timestamp": "2025-01-01T00:00:00Z"
    }"#;

    assert!(serde_json::from_str::<QueryPerformance>(json).is_err());
}

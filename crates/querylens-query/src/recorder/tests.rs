//! Tests for the performance recorder

use super::*;
use crate::test_helpers::{ScriptedEngine, init_test_logging};
use pretty_assertions::assert_eq;
use querylens_core::{NodeKind, PlanNode, QueryLensError};
use std::time::Duration;

fn indexed_plan() -> QueryPlan {
    QueryPlan::new(
        PlanNode::new("Nested Loop")
            .with_cost(0.5, 42.0)
            .with_child(
                PlanNode::of_kind(NodeKind::IndexScan)
                    .with_relation("users")
                    .with_index("users_pkey"),
            )
            .with_child(
                PlanNode::of_kind(NodeKind::IndexScan)
                    .with_relation("orders")
                    .with_index("idx_orders_user_id"),
            ),
    )
}

#[tokio::test]
async fn test_record_success() {
    init_test_logging();
    let engine = Arc::new(
        ScriptedEngine::new()
            .with_plan(indexed_plan())
            .with_rows(3)
            .with_delay(Duration::from_millis(20)),
    );
    let recorder = PerformanceRecorder::new(engine.clone());

    let recording = recorder.record("SELECT 1").await.expect("record failed");
    let perf = &recording.performance;

    assert_eq!(perf.query, "SELECT 1");
    assert_eq!(perf.rows_affected, 3);
    assert_eq!(perf.plan_cost, Some(42.0));
    assert_eq!(
        perf.index_usage,
        vec!["idx_orders_user_id".to_string(), "users_pkey".to_string()]
    );
    assert!(perf.execution_time >= Duration::from_millis(20));
    assert!(!recording.signals.has_seq_scan);
    assert_eq!(engine.explain_calls(), 1);
    assert_eq!(engine.execute_calls(), 1);
}

#[tokio::test]
async fn test_explain_failure_degrades_gracefully() {
    init_test_logging();
    let engine = Arc::new(
        ScriptedEngine::new()
            .with_plan(indexed_plan())
            .failing_explain("syntax not supported"),
    );
    let recorder = PerformanceRecorder::new(engine);

    let recording = recorder.record("SELECT 1").await.expect("record failed");

    assert!(recording.plan.is_empty());
    assert_eq!(recording.signals, PlanSignals::default());
    assert_eq!(recording.performance.plan_cost, None);
    assert!(recording.performance.index_usage.is_empty());
}

#[tokio::test]
async fn test_execution_failure_reports_elapsed_time() {
    init_test_logging();
    let engine = Arc::new(
        ScriptedEngine::new()
            .with_delay(Duration::from_millis(15))
            .failing_execute("relation \"missing\" does not exist"),
    );
    let recorder = PerformanceRecorder::new(engine);

    let err = recorder.record("SELECT * FROM missing").await.unwrap_err();
    let message = err.to_string();

    assert!(message.contains("relation \"missing\" does not exist"));
    assert!(message.ends_with("ms)"));
    assert!(err.elapsed_ms() >= 15.0);
}

#[tokio::test]
async fn test_execution_failure_keeps_engine_error() {
    let engine = Arc::new(ScriptedEngine::new().failing_execute("disk I/O error"));
    let recorder = PerformanceRecorder::new(engine);

    let err = recorder.record("SELECT 1").await.unwrap_err();

    assert!(matches!(
        err.engine_error(),
        QueryLensError::Query(message) if message == "disk I/O error"
    ));
    let source = std::error::Error::source(&err).expect("engine error as source");
    assert_eq!(source.to_string(), "Query error: disk I/O error");
}

#[tokio::test]
async fn test_custom_inspector_thresholds() {
    let plan = QueryPlan::new(PlanNode::of_kind(NodeKind::Sort).with_cost(0.0, 50.0));
    let engine = Arc::new(ScriptedEngine::new().with_plan(plan));
    let recorder = PerformanceRecorder::with_inspector(
        engine,
        PlanInspector::new().with_expensive_sort_cost(10.0),
    );

    let recording = recorder.record("SELECT 1").await.unwrap();
    assert!(recording.signals.has_expensive_sort);
}

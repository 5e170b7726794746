use super::*;
use querylens_analyzer::{IndexRecommendation, OptimizationSuggestion, Priority, SuggestionKind};
use querylens_core::{NodeKind, QueryPerformance};
use querylens_query::QueryFrequency;
use std::collections::BTreeMap;
use std::time::Duration;

fn sample_plan() -> QueryPlan {
    QueryPlan::new(
        PlanNode::of_kind(NodeKind::Sort).with_cost(12.5, 20.0).with_child(
            PlanNode::of_kind(NodeKind::SeqScan)
                .with_relation("orders")
                .with_alias("o")
                .with_cost(0.0, 18.0)
                .with_filter("(status = 'paid'::text)"),
        ),
    )
}

fn sample_analysis() -> QueryAnalysis {
    QueryAnalysis {
        plan: sample_plan(),
        performance: QueryPerformance::new(
            "SELECT * FROM orders o WHERE o.status = 'paid'",
            Duration::from_micros(1500),
            3,
        )
        .with_plan_cost(Some(20.0)),
        suggestions: vec![
            OptimizationSuggestion::new(
                SuggestionKind::Configuration,
                Priority::Low,
                "low one",
                "i",
                "x",
            ),
            OptimizationSuggestion::new(
                SuggestionKind::Index,
                Priority::High,
                "Sequential scan detected",
                "i",
                "x",
            ),
        ],
        index_recommendations: vec![IndexRecommendation::new(
            "orders",
            vec!["status".to_string()],
            "WHERE clause filtering",
            "50-90%",
        )],
    }
}

#[test]
fn test_plan_tree() {
    let rendered = plan(&sample_plan());
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[0], "  -> Sort  (cost=12.50..20.00 rows=0)");
    assert_eq!(lines[1], "    -> Seq Scan on orders o  (cost=0.00..18.00 rows=0)");
    assert_eq!(lines[2], "       Filter: (status = 'paid'::text)");
}

#[test]
fn test_empty_plan() {
    assert_eq!(plan(&QueryPlan::empty()), "  (no plan available)\n");
}

#[test]
fn test_analysis_sections() {
    let rendered = analysis(&sample_analysis());

    assert!(rendered.contains("1.500 ms"));
    assert!(rendered.contains("20.00"));
    assert!(rendered.contains("Seq Scan on orders"));
    assert!(rendered.contains("CREATE INDEX idx_orders_status ON orders (status);"));
    // High priority rows come first
    let high = rendered.find("Sequential scan detected").unwrap();
    let low = rendered.find("low one").unwrap();
    assert!(high < low);
}

#[test]
fn test_analysis_without_advice() {
    let mut bare = sample_analysis();
    bare.suggestions.clear();
    bare.index_recommendations.clear();

    let rendered = analysis(&bare);

    assert!(rendered.contains("No suggestions."));
    assert!(rendered.contains("No index recommendations."));
}

#[test]
fn test_stats() {
    let stats = QueryStats {
        total_queries: 2,
        average_execution_time_ms: 2.25,
        slow_queries: Vec::new(),
        most_frequent_queries: vec![QueryFrequency {
            query: "select * from t where id = ?".to_string(),
            count: 2,
            avg_time_ms: 2.25,
        }],
        index_usage_stats: BTreeMap::from([("idx_t_id".to_string(), 2)]),
    };

    let rendered = super::stats(&stats);

    assert!(rendered.starts_with("2 queries, average 2.250 ms"));
    assert!(rendered.contains("select * from t where id = ?"));
    assert!(rendered.contains("idx_t_id"));
    assert!(!rendered.contains("Slow query"));
}

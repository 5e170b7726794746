//! Tests for the Query Plan Model

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_query_plan_creation() {
    let root = PlanNode::of_kind(NodeKind::SeqScan)
        .with_relation("users")
        .with_cost(0.0, 100.0)
        .with_rows(1000);

    let plan = QueryPlan::new(root);

    assert!(!plan.is_empty());
    assert_eq!(plan.total_cost(), Some(100.0));
    assert_eq!(plan.total_rows(), Some(1000));
    assert!(plan.planning_time_ms.is_none());
    assert!(plan.execution_time_ms.is_none());
}

#[test]
fn test_empty_plan_has_no_nodes() {
    let plan = QueryPlan::empty();

    assert!(plan.is_empty());
    assert_eq!(plan.total_cost(), None);
    assert_eq!(plan.iter_nodes().count(), 0);
    assert!(!plan.has_sequential_scans());
}

#[test]
fn test_plan_node_builder() {
    let node = PlanNode::of_kind(NodeKind::IndexScan)
        .with_relation("orders")
        .with_alias("o")
        .with_index("orders_pkey")
        .with_cost(0.42, 8.44)
        .with_rows(1)
        .with_filter("status = 'active'");

    assert_eq!(node.node_type, "Index Scan");
    assert_eq!(node.kind(), NodeKind::IndexScan);
    assert_eq!(node.relation.as_deref(), Some("orders"));
    assert_eq!(node.alias.as_deref(), Some("o"));
    assert_eq!(node.index_name.as_deref(), Some("orders_pkey"));
    assert_eq!(node.startup_cost, 0.42);
    assert_eq!(node.total_cost, 8.44);
    assert_eq!(node.plan_rows, 1);
    assert_eq!(node.filter.as_deref(), Some("status = 'active'"));
}

#[test]
fn test_plan_node_tree_traversal() {
    //       Hash Join
    //      /         \
    //  Seq Scan   Index Scan
    let root = PlanNode::of_kind(NodeKind::HashJoin)
        .with_child(PlanNode::of_kind(NodeKind::SeqScan).with_relation("users"))
        .with_child(PlanNode::of_kind(NodeKind::IndexScan).with_relation("orders"));

    let plan = QueryPlan::new(root);

    let kinds: Vec<_> = plan.iter_nodes().map(|n| n.kind()).collect();
    assert_eq!(
        kinds,
        vec![NodeKind::HashJoin, NodeKind::SeqScan, NodeKind::IndexScan]
    );
    assert!(plan.has_sequential_scans());
    assert_eq!(plan.find_nodes_by_kind(NodeKind::IndexScan).len(), 1);
}

#[test]
fn test_plan_node_count_and_depth() {
    let single = PlanNode::of_kind(NodeKind::Result);
    assert_eq!(single.node_count(), 1);
    assert_eq!(single.depth(), 1);
    assert!(single.is_leaf());

    let tree = PlanNode::of_kind(NodeKind::Sort).with_child(
        PlanNode::of_kind(NodeKind::NestedLoop)
            .with_child(PlanNode::of_kind(NodeKind::SeqScan))
            .with_child(PlanNode::of_kind(NodeKind::IndexScan)),
    );
    assert_eq!(tree.node_count(), 4);
    assert_eq!(tree.depth(), 3);
    assert!(!tree.is_leaf());
}

#[test]
fn test_node_kind_classification() {
    assert_eq!(NodeKind::from_node_type("Seq Scan"), NodeKind::SeqScan);
    assert_eq!(NodeKind::from_node_type("Nested Loop"), NodeKind::NestedLoop);
    assert_eq!(
        NodeKind::from_node_type("Nested Loop Left Join"),
        NodeKind::NestedLoop
    );
    assert_eq!(NodeKind::from_node_type("Hash Aggregate"), NodeKind::HashAggregate);
    assert_eq!(NodeKind::from_node_type("Something Else"), NodeKind::Unknown);

    assert!(NodeKind::BitmapHeapScan.is_scan());
    assert!(!NodeKind::Sort.is_scan());
    assert!(NodeKind::MergeJoin.is_join());
    assert!(!NodeKind::Hash.is_join());
}

#[test]
fn test_node_kind_round_trips_through_name() {
    for kind in [
        NodeKind::SeqScan,
        NodeKind::IndexOnlyScan,
        NodeKind::NestedLoop,
        NodeKind::Sort,
        NodeKind::GroupAggregate,
        NodeKind::ModifyTable,
    ] {
        assert_eq!(NodeKind::from_node_type(kind.as_str()), kind);
    }
}

#[test]
fn test_plan_node_deserializes_with_defaults() {
    let json = r#"{"node_type": "Seq Scan", "total_cost": 5.0}"#;
    let node: PlanNode = serde_json::from_str(json).unwrap();

    assert_eq!(node.kind(), NodeKind::SeqScan);
    assert_eq!(node.total_cost, 5.0);
    assert_eq!(node.plan_rows, 0);
    assert!(node.children.is_empty());
    assert!(node.index_name.is_none());
}

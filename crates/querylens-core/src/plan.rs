//! Query Plan Model - engine-agnostic execution plan tree
//!
//! Every engine adapter produces this shape. Nodes carry the engine's own
//! operation name in `node_type` (PostgreSQL spelling, e.g. "Seq Scan",
//! "Nested Loop") plus the numeric estimates the analyzer reads.

use serde::{Deserialize, Serialize};

/// A complete execution plan as reported by an engine.
///
/// `root` is `None` when the engine could not produce a plan; every consumer
/// treats that as "no signals" rather than as an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryPlan {
    /// Root node of the plan tree
    pub root: Option<PlanNode>,
    /// Planning time in milliseconds (if available)
    pub planning_time_ms: Option<f64>,
    /// Execution time in milliseconds (if available, from EXPLAIN ANALYZE)
    pub execution_time_ms: Option<f64>,
}

impl QueryPlan {
    /// Creates a new query plan with the given root node
    pub fn new(root: PlanNode) -> Self {
        Self {
            root: Some(root),
            planning_time_ms: None,
            execution_time_ms: None,
        }
    }

    /// A plan with no nodes, substituted when EXPLAIN fails
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sets the planning time
    pub fn with_planning_time(mut self, ms: f64) -> Self {
        self.planning_time_ms = Some(ms);
        self
    }

    /// Sets the execution time
    pub fn with_execution_time(mut self, ms: f64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Returns true if the engine produced no plan
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Total estimated cost of the root node
    pub fn total_cost(&self) -> Option<f64> {
        self.root.as_ref().map(|r| r.total_cost)
    }

    /// Estimated rows produced by the root node
    pub fn total_rows(&self) -> Option<u64> {
        self.root.as_ref().map(|r| r.plan_rows)
    }

    /// Returns an iterator over all nodes in the plan (depth-first)
    pub fn iter_nodes(&self) -> PlanNodeIterator<'_> {
        PlanNodeIterator::new(self.root.as_ref())
    }

    /// Finds all nodes of the given kind
    pub fn find_nodes_by_kind(&self, kind: NodeKind) -> Vec<&PlanNode> {
        self.iter_nodes().filter(|n| n.kind() == kind).collect()
    }

    /// Returns true if the plan contains any sequential scans
    pub fn has_sequential_scans(&self) -> bool {
        self.iter_nodes().any(|n| n.kind() == NodeKind::SeqScan)
    }
}

/// A single node in the plan tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanNode {
    /// Engine operation name, e.g. "Seq Scan", "Nested Loop", "Sort"
    pub node_type: String,
    /// Relation/table name (if applicable)
    #[serde(default)]
    pub relation: Option<String>,
    /// Alias used in the query (if applicable)
    #[serde(default)]
    pub alias: Option<String>,
    /// Cost to return the first row
    #[serde(default)]
    pub startup_cost: f64,
    /// Cost to return all rows
    #[serde(default)]
    pub total_cost: f64,
    /// Estimated number of rows
    #[serde(default)]
    pub plan_rows: u64,
    /// Index used by this node (for index scans)
    #[serde(default)]
    pub index_name: Option<String>,
    /// Filter condition applied
    #[serde(default)]
    pub filter: Option<String>,
    /// Child nodes
    #[serde(default)]
    pub children: Vec<PlanNode>,
}

impl PlanNode {
    /// Creates a new plan node with the given engine operation name
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            relation: None,
            alias: None,
            startup_cost: 0.0,
            total_cost: 0.0,
            plan_rows: 0,
            index_name: None,
            filter: None,
            children: Vec::new(),
        }
    }

    /// Creates a node using the canonical name of `kind`
    pub fn of_kind(kind: NodeKind) -> Self {
        Self::new(kind.as_str())
    }

    /// Sets the relation/table name
    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = Some(relation.into());
        self
    }

    /// Sets the alias
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets the startup and total cost
    pub fn with_cost(mut self, startup: f64, total: f64) -> Self {
        self.startup_cost = startup;
        self.total_cost = total;
        self
    }

    /// Sets the estimated rows
    pub fn with_rows(mut self, rows: u64) -> Self {
        self.plan_rows = rows;
        self
    }

    /// Sets the index name
    pub fn with_index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    /// Sets the filter condition
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Adds a child node
    pub fn with_child(mut self, child: PlanNode) -> Self {
        self.children.push(child);
        self
    }

    /// Classifies `node_type` into a known operation
    pub fn kind(&self) -> NodeKind {
        NodeKind::from_node_type(&self.node_type)
    }

    /// Returns the total number of nodes in this subtree (including self)
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Returns the maximum depth of this subtree
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    /// Returns true if this is a leaf node (no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Known plan operations, spelled the way PostgreSQL reports them.
///
/// Adapters for other engines map their operations onto these names so the
/// inspector can stay purely structural.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    // Scans
    SeqScan,
    IndexScan,
    IndexOnlyScan,
    BitmapIndexScan,
    BitmapHeapScan,
    SubqueryScan,
    CteScan,

    // Joins
    NestedLoop,
    HashJoin,
    MergeJoin,

    // Aggregation
    Aggregate,
    GroupAggregate,
    HashAggregate,

    // Sorting
    Sort,
    IncrementalSort,

    Limit,
    Materialize,
    Hash,
    Unique,
    Append,
    Result,
    Gather,
    ModifyTable,

    Unknown,
}

impl NodeKind {
    /// Classifies an engine operation name
    pub fn from_node_type(s: &str) -> Self {
        match s {
            "Seq Scan" => Self::SeqScan,
            "Index Scan" => Self::IndexScan,
            "Index Only Scan" => Self::IndexOnlyScan,
            "Bitmap Index Scan" => Self::BitmapIndexScan,
            "Bitmap Heap Scan" => Self::BitmapHeapScan,
            "Subquery Scan" => Self::SubqueryScan,
            "CTE Scan" => Self::CteScan,
            "Hash Join" => Self::HashJoin,
            "Merge Join" => Self::MergeJoin,
            "Aggregate" => Self::Aggregate,
            "GroupAggregate" | "Group Aggregate" => Self::GroupAggregate,
            "HashAggregate" | "Hash Aggregate" => Self::HashAggregate,
            "Sort" => Self::Sort,
            "Incremental Sort" => Self::IncrementalSort,
            "Limit" => Self::Limit,
            "Materialize" => Self::Materialize,
            "Hash" => Self::Hash,
            "Unique" => Self::Unique,
            "Append" => Self::Append,
            "Result" => Self::Result,
            "Gather" | "Gather Merge" => Self::Gather,
            "ModifyTable" | "Modify Table" => Self::ModifyTable,
            // Text EXPLAIN folds the join type in: "Nested Loop Left Join"
            other if other.starts_with("Nested Loop") => Self::NestedLoop,
            _ => Self::Unknown,
        }
    }

    /// Canonical operation name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SeqScan => "Seq Scan",
            Self::IndexScan => "Index Scan",
            Self::IndexOnlyScan => "Index Only Scan",
            Self::BitmapIndexScan => "Bitmap Index Scan",
            Self::BitmapHeapScan => "Bitmap Heap Scan",
            Self::SubqueryScan => "Subquery Scan",
            Self::CteScan => "CTE Scan",
            Self::NestedLoop => "Nested Loop",
            Self::HashJoin => "Hash Join",
            Self::MergeJoin => "Merge Join",
            Self::Aggregate => "Aggregate",
            Self::GroupAggregate => "GroupAggregate",
            Self::HashAggregate => "HashAggregate",
            Self::Sort => "Sort",
            Self::IncrementalSort => "Incremental Sort",
            Self::Limit => "Limit",
            Self::Materialize => "Materialize",
            Self::Hash => "Hash",
            Self::Unique => "Unique",
            Self::Append => "Append",
            Self::Result => "Result",
            Self::Gather => "Gather",
            Self::ModifyTable => "ModifyTable",
            Self::Unknown => "Unknown",
        }
    }

    /// Returns true if this node reads a relation
    pub fn is_scan(&self) -> bool {
        matches!(
            self,
            Self::SeqScan
                | Self::IndexScan
                | Self::IndexOnlyScan
                | Self::BitmapIndexScan
                | Self::BitmapHeapScan
                | Self::SubqueryScan
                | Self::CteScan
        )
    }

    /// Returns true if this node joins two inputs
    pub fn is_join(&self) -> bool {
        matches!(self, Self::NestedLoop | Self::HashJoin | Self::MergeJoin)
    }
}

/// Iterator for traversing plan nodes depth-first
pub struct PlanNodeIterator<'a> {
    stack: Vec<&'a PlanNode>,
}

impl<'a> PlanNodeIterator<'a> {
    fn new(root: Option<&'a PlanNode>) -> Self {
        Self {
            stack: root.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for PlanNodeIterator<'a> {
    type Item = &'a PlanNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order so we visit them in order
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests;

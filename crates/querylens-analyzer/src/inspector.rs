//! Plan Inspector
//!
//! Walks a plan tree once and reduces it to the handful of signals the
//! suggestion engine and performance recorder care about. The inspection is
//! purely structural: any engine adapter that produces a `QueryPlan` gets the
//! same treatment.

use querylens_core::{NodeKind, OptimizerConfig, PlanNode, QueryPlan};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Anti-pattern flags and index names found in a plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSignals {
    /// Some node reads a whole table
    pub has_seq_scan: bool,
    /// Some sort node exceeds the sort cost threshold
    pub has_expensive_sort: bool,
    /// Some nested loop node exceeds the join cost threshold
    pub has_inefficient_join: bool,
    /// Every index touched anywhere in the plan
    pub index_names: BTreeSet<String>,
}

impl PlanSignals {
    /// Returns true if any anti-pattern flag is set
    pub fn has_issues(&self) -> bool {
        self.has_seq_scan || self.has_expensive_sort || self.has_inefficient_join
    }

    /// Index names in sorted order
    pub fn index_usage(&self) -> Vec<String> {
        self.index_names.iter().cloned().collect()
    }
}

/// Classifies plans against cost thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanInspector {
    expensive_sort_cost: f64,
    inefficient_join_cost: f64,
}

impl Default for PlanInspector {
    fn default() -> Self {
        Self::from_config(&OptimizerConfig::default())
    }
}

impl PlanInspector {
    /// Creates an inspector with the default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an inspector using the thresholds from `config`
    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self {
            expensive_sort_cost: config.expensive_sort_cost,
            inefficient_join_cost: config.inefficient_join_cost,
        }
    }

    /// Sets the cost above which a sort is expensive
    pub fn with_expensive_sort_cost(mut self, cost: f64) -> Self {
        self.expensive_sort_cost = cost;
        self
    }

    /// Sets the cost above which a nested loop is inefficient
    pub fn with_inefficient_join_cost(mut self, cost: f64) -> Self {
        self.inefficient_join_cost = cost;
        self
    }

    pub fn expensive_sort_cost(&self) -> f64 {
        self.expensive_sort_cost
    }

    pub fn inefficient_join_cost(&self) -> f64 {
        self.inefficient_join_cost
    }

    /// Reduces the whole plan to its signals.
    ///
    /// An empty plan (EXPLAIN failed or produced nothing) yields all-false
    /// flags and no index names.
    pub fn classify(&self, plan: &QueryPlan) -> PlanSignals {
        let mut signals = PlanSignals::default();
        for node in plan.iter_nodes() {
            self.visit(node, &mut signals);
        }
        signals
    }

    /// Classifies a bare subtree
    pub fn classify_node(&self, node: &PlanNode) -> PlanSignals {
        let mut signals = PlanSignals::default();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            self.visit(current, &mut signals);
            stack.extend(current.children.iter());
        }
        signals
    }

    fn visit(&self, node: &PlanNode, signals: &mut PlanSignals) {
        match node.kind() {
            NodeKind::SeqScan => signals.has_seq_scan = true,
            NodeKind::Sort if node.total_cost > self.expensive_sort_cost => {
                signals.has_expensive_sort = true;
            }
            _ => {}
        }

        // Matches every join flavour: "Nested Loop Left Join", "Nested Loop Anti Join", ...
        if node.node_type.contains("Nested Loop") && node.total_cost > self.inefficient_join_cost {
            signals.has_inefficient_join = true;
        }

        if let Some(index) = &node.index_name {
            signals.index_names.insert(index.clone());
        }
    }
}

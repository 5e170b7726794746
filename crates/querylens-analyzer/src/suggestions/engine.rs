//! Suggestion Engine
//!
//! Four independent rules, emitted in significance order:
//!
//! 1. execution slower than the threshold: query rewrite, high priority
//! 2. sequential scan in the plan: index, high priority
//! 3. expensive sort in the plan: index, medium priority
//! 4. inefficient nested loop in the plan: query rewrite, medium priority

use crate::inspector::{PlanInspector, PlanSignals};
use querylens_core::{QueryPerformance, QueryPlan};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kind of change a suggestion proposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Index,
    QueryRewrite,
    SchemaChange,
    Configuration,
}

impl SuggestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::QueryRewrite => "query_rewrite",
            Self::SchemaChange => "schema_change",
            Self::Configuration => "configuration",
        }
    }
}

/// How urgently a suggestion should be acted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Returns the priority as a display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Sort key, most urgent first
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

/// A single optimization suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationSuggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub priority: Priority,
    /// What was observed
    pub description: String,
    /// Why it matters
    pub impact: String,
    /// What to do about it
    pub implementation: String,
}

impl OptimizationSuggestion {
    pub fn new(
        kind: SuggestionKind,
        priority: Priority,
        description: impl Into<String>,
        impact: impl Into<String>,
        implementation: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            priority,
            description: description.into(),
            impact: impact.into(),
            implementation: implementation.into(),
        }
    }
}

/// Applies the suggestion rules to a plan and its measured performance
#[derive(Debug, Clone, Default)]
pub struct SuggestionEngine {
    inspector: PlanInspector,
}

impl SuggestionEngine {
    /// Creates an engine with the default plan thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine that classifies plans with `inspector`
    pub fn with_inspector(inspector: PlanInspector) -> Self {
        Self { inspector }
    }

    pub fn inspector(&self) -> &PlanInspector {
        &self.inspector
    }

    /// Classifies `plan` and applies every rule
    pub fn suggest(
        &self,
        plan: &QueryPlan,
        perf: &QueryPerformance,
        slow_query_threshold_ms: u64,
    ) -> Vec<OptimizationSuggestion> {
        let signals = self.inspector.classify(plan);
        self.suggest_from_signals(&signals, perf, slow_query_threshold_ms)
    }

    /// Applies every rule to signals that were already computed
    pub fn suggest_from_signals(
        &self,
        signals: &PlanSignals,
        perf: &QueryPerformance,
        slow_query_threshold_ms: u64,
    ) -> Vec<OptimizationSuggestion> {
        let mut suggestions = Vec::new();

        self.check_slow_execution(perf, slow_query_threshold_ms, &mut suggestions);
        self.check_seq_scan(signals, &mut suggestions);
        self.check_expensive_sort(signals, &mut suggestions);
        self.check_inefficient_join(signals, &mut suggestions);

        suggestions
    }

    fn check_slow_execution(
        &self,
        perf: &QueryPerformance,
        threshold_ms: u64,
        suggestions: &mut Vec<OptimizationSuggestion>,
    ) {
        if perf.execution_time <= Duration::from_millis(threshold_ms) {
            return;
        }

        suggestions.push(OptimizationSuggestion::new(
            SuggestionKind::QueryRewrite,
            Priority::High,
            format!(
                "Query took {:.2} ms, above the {} ms slow query threshold",
                perf.execution_time_ms(),
                threshold_ms
            ),
            "Slow queries hold connections and locks longer and degrade overall throughput",
            "Select only the needed columns and filter as early as possible",
        ));
    }

    fn check_seq_scan(&self, signals: &PlanSignals, suggestions: &mut Vec<OptimizationSuggestion>) {
        if !signals.has_seq_scan {
            return;
        }

        suggestions.push(OptimizationSuggestion::new(
            SuggestionKind::Index,
            Priority::High,
            "Sequential scan detected: a table is read in full",
            "Full table scans grow linearly with table size",
            "Add an index on the columns used in WHERE and JOIN conditions",
        ));
    }

    fn check_expensive_sort(
        &self,
        signals: &PlanSignals,
        suggestions: &mut Vec<OptimizationSuggestion>,
    ) {
        if !signals.has_expensive_sort {
            return;
        }

        suggestions.push(OptimizationSuggestion::new(
            SuggestionKind::Index,
            Priority::Medium,
            format!(
                "Expensive sort detected (cost above {})",
                self.inspector.expensive_sort_cost()
            ),
            "Large sorts use extra memory and may spill to disk",
            "Add an index matching the ORDER BY columns so rows come back already sorted",
        ));
    }

    fn check_inefficient_join(
        &self,
        signals: &PlanSignals,
        suggestions: &mut Vec<OptimizationSuggestion>,
    ) {
        if !signals.has_inefficient_join {
            return;
        }

        suggestions.push(OptimizationSuggestion::new(
            SuggestionKind::QueryRewrite,
            Priority::Medium,
            format!(
                "Nested loop join detected (cost above {})",
                self.inspector.inefficient_join_cost()
            ),
            "Nested loops rescan the inner input once per outer row",
            "Index the join columns or restructure the join so a hash or merge join can be used",
        ));
    }
}

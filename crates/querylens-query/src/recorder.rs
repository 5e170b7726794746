//! Performance recorder
//!
//! Runs one statement through the engine: EXPLAIN first, then a timed
//! execution. A failed EXPLAIN only degrades the record (no plan, no cost,
//! no index usage); a failed execution aborts the recording.

use crate::error::{AnalyzeError, AnalyzeResult};
use querylens_analyzer::{PlanInspector, PlanSignals};
use querylens_core::{DatabaseEngine, QueryPerformance, QueryPlan};
use std::sync::Arc;
use std::time::Instant;

/// Everything learned from running one statement
#[derive(Debug, Clone)]
pub struct Recording {
    /// The plan reported by EXPLAIN, empty if it failed
    pub plan: QueryPlan,
    /// Signals classified from `plan`
    pub signals: PlanSignals,
    pub performance: QueryPerformance,
}

/// Explains and times statements against an engine
#[derive(Clone)]
pub struct PerformanceRecorder {
    engine: Arc<dyn DatabaseEngine>,
    inspector: PlanInspector,
}

impl PerformanceRecorder {
    pub fn new(engine: Arc<dyn DatabaseEngine>) -> Self {
        Self::with_inspector(engine, PlanInspector::default())
    }

    pub fn with_inspector(engine: Arc<dyn DatabaseEngine>, inspector: PlanInspector) -> Self {
        Self { engine, inspector }
    }

    /// The engine statements run against
    pub fn engine(&self) -> &Arc<dyn DatabaseEngine> {
        &self.engine
    }

    /// Explain, execute with timing, and classify `sql`
    pub async fn record(&self, sql: &str) -> AnalyzeResult<Recording> {
        let plan = self.explain(sql).await;

        let start = Instant::now();
        let result = self.engine.execute(sql).await;
        let elapsed = start.elapsed();

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
                tracing::error!(
                    engine = self.engine.engine_name(),
                    error = %e,
                    elapsed_ms,
                    "query execution failed"
                );
                return Err(AnalyzeError::ExecutionFailed {
                    source: e,
                    elapsed_ms,
                });
            }
        };

        let signals = self.inspector.classify(&plan);
        let performance = QueryPerformance::new(sql, elapsed, outcome.rows_affected)
            .with_plan_cost(plan.total_cost())
            .with_index_usage(signals.index_usage());

        tracing::debug!(
            execution_time_ms = performance.execution_time_ms(),
            rows_affected = performance.rows_affected,
            plan_cost = ?performance.plan_cost,
            "query recorded"
        );

        Ok(Recording {
            plan,
            signals,
            performance,
        })
    }

    async fn explain(&self, sql: &str) -> QueryPlan {
        match self.engine.explain(sql).await {
            Ok(plan) => plan,
            Err(e) => {
                tracing::warn!(
                    engine = self.engine.engine_name(),
                    error = %e,
                    "EXPLAIN failed, continuing without a plan"
                );
                QueryPlan::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests;

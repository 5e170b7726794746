//! Database engine trait

use crate::{ExecutionOutcome, QueryLensError, QueryPlan, Result};
use async_trait::async_trait;

/// The capabilities querylens needs from a relational engine.
///
/// Implementations adapt an engine's native EXPLAIN output into a
/// [`QueryPlan`] so the analyzer never has to know which engine produced it.
/// Neither call is retried or timed out by querylens; an implementation that
/// needs either should enforce it in its own client.
#[async_trait]
pub trait DatabaseEngine: Send + Sync {
    /// Engine identifier (e.g. "sqlite", "postgresql")
    fn engine_name(&self) -> &str;

    /// Produce the execution plan for `sql` without running it
    async fn explain(&self, sql: &str) -> Result<QueryPlan>;

    /// Run `sql` and report how many rows it returned or changed
    async fn execute(&self, sql: &str) -> Result<ExecutionOutcome>;

    /// Run several `;`-separated statements without measuring them, e.g. to
    /// set up a schema before analysis
    async fn execute_batch(&self, _sql: &str) -> Result<()> {
        Err(QueryLensError::NotSupported(format!(
            "{} does not support batch execution",
            self.engine_name()
        )))
    }
}

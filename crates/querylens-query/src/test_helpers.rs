//! Test scaffolding for querylens-query
//!
//! `ScriptedEngine` is a `DatabaseEngine` whose EXPLAIN and execute results
//! are fixed up front, so recorder and optimizer behaviour can be tested
//! without a database.

use async_trait::async_trait;
use querylens_core::{DatabaseEngine, ExecutionOutcome, QueryLensError, QueryPlan, Result};
use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

static INIT: Once = Once::new();

/// Route tracing output through the test harness
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// An engine that replays a fixed script
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    plan: QueryPlan,
    explain_error: Option<String>,
    execute_error: Option<String>,
    rows_affected: u64,
    delay: Duration,
    explain_calls: AtomicUsize,
    execute_calls: AtomicUsize,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// EXPLAIN returns `plan`
    pub fn with_plan(mut self, plan: QueryPlan) -> Self {
        self.plan = plan;
        self
    }

    /// Execution reports `rows` rows
    pub fn with_rows(mut self, rows: u64) -> Self {
        self.rows_affected = rows;
        self
    }

    /// Execution takes at least `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// EXPLAIN fails with `message`
    pub fn failing_explain(mut self, message: impl Into<String>) -> Self {
        self.explain_error = Some(message.into());
        self
    }

    /// Execution fails with `message` (after the configured delay)
    pub fn failing_execute(mut self, message: impl Into<String>) -> Self {
        self.execute_error = Some(message.into());
        self
    }

    pub fn explain_calls(&self) -> usize {
        self.explain_calls.load(Ordering::SeqCst)
    }

    pub fn execute_calls(&self) -> usize {
        self.execute_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabaseEngine for ScriptedEngine {
    fn engine_name(&self) -> &str {
        "scripted"
    }

    async fn explain(&self, _sql: &str) -> Result<QueryPlan> {
        self.explain_calls.fetch_add(1, Ordering::SeqCst);
        match &self.explain_error {
            Some(message) => Err(QueryLensError::Explain(message.clone())),
            None => Ok(self.plan.clone()),
        }
    }

    async fn execute(&self, _sql: &str) -> Result<ExecutionOutcome> {
        self.execute_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.execute_error {
            Some(message) => Err(QueryLensError::Query(message.clone())),
            None => Ok(ExecutionOutcome::new(self.rows_affected)),
        }
    }
}

//! Core records for querylens

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What the engine reports after running a statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Rows returned (queries) or changed (statements)
    pub rows_affected: u64,
}

impl ExecutionOutcome {
    pub fn new(rows_affected: u64) -> Self {
        Self { rows_affected }
    }
}

/// Timing and plan facts for one analyzed statement.
///
/// Created once per analysis and never modified afterwards; the history
/// store hands out clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPerformance {
    /// The SQL text as submitted
    pub query: String,
    /// Wall-clock execution time, serialized as fractional milliseconds
    #[serde(rename = "execution_time_ms", with = "duration_ms")]
    pub execution_time: Duration,
    /// Rows returned or changed by the statement
    pub rows_affected: u64,
    /// Total cost of the plan root, if the engine produced a plan
    pub plan_cost: Option<f64>,
    /// Names of every index the plan touches
    pub index_usage: Vec<String>,
    /// When the statement finished
    pub timestamp: DateTime<Utc>,
}

impl QueryPerformance {
    /// Create a record timestamped now
    pub fn new(query: impl Into<String>, execution_time: Duration, rows_affected: u64) -> Self {
        Self {
            query: query.into(),
            execution_time,
            rows_affected,
            plan_cost: None,
            index_usage: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Builder method: set the plan cost
    pub fn with_plan_cost(mut self, cost: Option<f64>) -> Self {
        self.plan_cost = cost;
        self
    }

    /// Builder method: set the indexes used
    pub fn with_index_usage(mut self, indexes: Vec<String>) -> Self {
        self.index_usage = indexes;
        self
    }

    /// Execution time in fractional milliseconds
    pub fn execution_time_ms(&self) -> f64 {
        self.execution_time.as_nanos() as f64 / 1_000_000.0
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_nanos() as f64 / 1_000_000.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let ms = f64::deserialize(deserializer)?;
        if !ms.is_finite() || ms < 0.0 {
            return Err(serde::de::Error::custom(format!(
                "execution time must be a non-negative number of milliseconds, got {ms}"
            )));
        }
        Duration::try_from_secs_f64(ms / 1000.0).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests;

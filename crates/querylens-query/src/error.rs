//! Analysis errors

use querylens_core::QueryLensError;
use thiserror::Error;

pub type AnalyzeResult<T> = Result<T, AnalyzeError>;

/// Errors that abort a single analysis
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// The statement itself failed; nothing was recorded
    #[error("{source} (after {elapsed_ms:.2} ms)")]
    ExecutionFailed {
        #[source]
        source: QueryLensError,
        elapsed_ms: f64,
    },
}

impl AnalyzeError {
    /// The engine error behind the failure
    pub fn engine_error(&self) -> &QueryLensError {
        match self {
            Self::ExecutionFailed { source, .. } => source,
        }
    }

    /// Milliseconds spent before the failure surfaced
    pub fn elapsed_ms(&self) -> f64 {
        match self {
            Self::ExecutionFailed { elapsed_ms, .. } => *elapsed_ms,
        }
    }
}

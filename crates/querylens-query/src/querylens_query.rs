//! querylens query - performance recording and analysis history
//!
//! This crate runs statements through a [`querylens_core::DatabaseEngine`],
//! times them, and keeps a bounded rolling history of the results:
//!
//! - `PerformanceRecorder` - EXPLAIN + timed execution of one statement
//! - `HistoryStore` - fixed-capacity FIFO of performance records and their stats
//! - `QueryOptimizer` - the facade composing recording, advice, and history

mod error;
mod history;
mod optimizer;
mod recorder;

#[cfg(test)]
mod test_helpers;

pub use error::{AnalyzeError, AnalyzeResult};
pub use history::{HistoryStore, QueryFrequency, QueryStats};
pub use optimizer::{QueryAnalysis, QueryOptimizer};
pub use recorder::{PerformanceRecorder, Recording};

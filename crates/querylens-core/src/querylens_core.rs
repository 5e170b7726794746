//! querylens core - shared abstractions for the query performance analyzer
//!
//! This crate provides the types every other querylens crate depends on:
//!
//! - `DatabaseEngine` - the explain/execute capability a database must expose
//! - `PlanNode` / `QueryPlan` - engine-agnostic execution plan tree
//! - `QueryPerformance` - the per-analysis performance record
//! - `OptimizerConfig` - thresholds and history sizing
//! - `QueryLensError` - the shared error type

mod config;
mod engine;
mod error;
mod plan;
mod types;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use plan::*;
pub use types::*;

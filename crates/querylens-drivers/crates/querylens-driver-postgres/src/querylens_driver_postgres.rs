//! PostgreSQL engine for querylens
//!
//! Implements [`querylens_core::DatabaseEngine`] over tokio-postgres. Plans
//! are read from `EXPLAIN (FORMAT JSON)` and adapted by
//! [`querylens_analyzer::explain::parse_json_value`].

mod engine;
mod error;

pub use engine::PostgresEngine;
pub use error::format_postgres_error;

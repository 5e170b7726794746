//! SQLite engine for querylens
//!
//! Implements [`querylens_core::DatabaseEngine`] over rusqlite. Plans come
//! from `EXPLAIN QUERY PLAN` and are adapted by
//! [`querylens_analyzer::explain::plan_from_rows`].

mod engine;

pub use engine::SqliteEngine;

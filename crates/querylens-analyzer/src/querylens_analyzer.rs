//! querylens analyzer - plan inspection and optimization advice
//!
//! This crate provides functionality for:
//! - Adapting PostgreSQL and SQLite EXPLAIN output into the shared plan model
//! - Classifying plans (sequential scans, expensive sorts, inefficient joins)
//! - Best-effort extraction of WHERE / ORDER BY / JOIN columns from raw SQL
//! - Normalizing SQL into frequency-grouping keys
//! - Producing optimization suggestions and index recommendations

pub mod advisor;
pub mod explain;
pub mod extract;
pub mod inspector;
pub mod normalize;
pub mod suggestions;

pub use advisor::*;
pub use extract::{
    ClauseKind, ColumnExtractor, ColumnRef, LexicalExtractor, extract_join_columns,
    extract_order_by_columns, extract_where_columns,
};
pub use inspector::*;
pub use normalize::normalize;
pub use suggestions::*;

//! Optimization Suggestions Module
//!
//! Turns plan signals and measured timing into prioritized, human-readable
//! suggestions: slow execution, sequential scans, expensive sorts and
//! inefficient nested loop joins.

mod engine;

pub use engine::*;

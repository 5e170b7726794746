//! querylens drivers - database engine implementations
//!
//! Re-exports the engine crates enabled by feature flags and opens an engine
//! from an [`EngineTarget`].

#[cfg(feature = "postgres")]
pub use querylens_driver_postgres as postgres;
#[cfg(feature = "sqlite")]
pub use querylens_driver_sqlite as sqlite;

mod registry;

pub use registry::{EngineTarget, connect, supported_engines};

/// Re-export commonly used types from querylens-core
pub use querylens_core::{DatabaseEngine, ExecutionOutcome, QueryLensError, QueryPlan, Result};

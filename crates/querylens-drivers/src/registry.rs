//! Opening engines by kind

use querylens_core::{DatabaseEngine, QueryLensError, Result};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Where to connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineTarget {
    /// A SQLite database file, created if missing
    SqliteFile(PathBuf),
    /// A private in-memory SQLite database
    SqliteMemory,
    /// A libpq-style PostgreSQL connection string or URL
    Postgres(String),
}

impl EngineTarget {
    /// `:memory:` selects an in-memory database, anything else is a file path
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.as_os_str() == ":memory:" {
            Self::SqliteMemory
        } else {
            Self::SqliteFile(path)
        }
    }

    pub fn postgres(conn_str: impl Into<String>) -> Self {
        Self::Postgres(conn_str.into())
    }

    /// Name of the engine this target needs
    pub fn engine_name(&self) -> &'static str {
        match self {
            Self::SqliteFile(_) | Self::SqliteMemory => "sqlite",
            Self::Postgres(_) => "postgresql",
        }
    }
}

impl fmt::Display for EngineTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SqliteFile(path) => write!(f, "sqlite:{}", path.display()),
            Self::SqliteMemory => write!(f, "sqlite::memory:"),
            // Connection strings may hold a password
            Self::Postgres(_) => write!(f, "postgresql"),
        }
    }
}

/// Engine names compiled into this build
pub fn supported_engines() -> Vec<&'static str> {
    let mut engines = Vec::new();
    #[cfg(feature = "sqlite")]
    engines.push("sqlite");
    #[cfg(feature = "postgres")]
    engines.push("postgresql");
    engines
}

/// Open the engine described by `target`
pub async fn connect(target: &EngineTarget) -> Result<Arc<dyn DatabaseEngine>> {
    tracing::info!(engine_target = %target, "opening database engine");

    match target {
        #[cfg(feature = "sqlite")]
        EngineTarget::SqliteFile(path) => Ok(Arc::new(crate::sqlite::SqliteEngine::open(path)?)),
        #[cfg(feature = "sqlite")]
        EngineTarget::SqliteMemory => Ok(Arc::new(crate::sqlite::SqliteEngine::open_in_memory()?)),
        #[cfg(feature = "postgres")]
        EngineTarget::Postgres(conn_str) => {
            Ok(Arc::new(crate::postgres::PostgresEngine::connect(conn_str).await?))
        }
        #[allow(unreachable_patterns)]
        other => {
            tracing::warn!(engine = other.engine_name(), "engine not compiled into this build");
            Err(QueryLensError::NotSupported(format!(
                "{} support is not enabled",
                other.engine_name()
            )))
        }
    }
}

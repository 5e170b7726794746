//! SQLite engine implementation

use async_trait::async_trait;
use parking_lot::Mutex;
use querylens_analyzer::explain::{SqlitePlanRow, plan_from_rows};
use querylens_core::{DatabaseEngine, ExecutionOutcome, QueryLensError, QueryPlan, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

/// A single SQLite connection shared behind a mutex
pub struct SqliteEngine {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEngine {
    /// Open (or create) the database file at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "opening SQLite database");

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            return Err(QueryLensError::Connection(format!(
                "Parent directory does not exist: {}",
                parent.display()
            )));
        }

        let conn = Connection::open(path).map_err(|e| {
            QueryLensError::Connection(format!(
                "Failed to open SQLite database at '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            QueryLensError::Connection(format!("Failed to open in-memory database: {}", e))
        })?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already-open rusqlite connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn query_plan_rows(conn: &Connection, sql: &str) -> rusqlite::Result<Vec<SqlitePlanRow>> {
        let mut stmt = conn.prepare(&format!("EXPLAIN QUERY PLAN {}", sql))?;
        // Columns: id, parent, notused, detail
        let rows = stmt.query_map([], |row| {
            Ok(SqlitePlanRow::new(row.get(0)?, row.get(1)?, row.get::<_, String>(3)?))
        })?;
        rows.collect()
    }
}

#[async_trait]
impl DatabaseEngine for SqliteEngine {
    fn engine_name(&self) -> &str {
        "sqlite"
    }

    #[tracing::instrument(skip(self, sql), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn explain(&self, sql: &str) -> Result<QueryPlan> {
        let rows = {
            let conn = self.conn.lock();
            Self::query_plan_rows(&conn, sql)
                .map_err(|e| QueryLensError::Explain(format!("EXPLAIN QUERY PLAN failed: {}", e)))?
        };

        tracing::debug!(steps = rows.len(), "SQLite query plan fetched");
        plan_from_rows(&rows).map_err(|e| QueryLensError::Explain(e.to_string()))
    }

    #[tracing::instrument(skip(self, sql), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn execute(&self, sql: &str) -> Result<ExecutionOutcome> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| QueryLensError::Query(format!("Failed to prepare statement: {}", e)))?;

        // Row-returning statements report how many rows came back; others
        // report how many rows they changed
        let rows_affected = if stmt.column_count() > 0 {
            let mut rows = stmt
                .query([])
                .map_err(|e| QueryLensError::Query(format!("Failed to execute query: {}", e)))?;
            let mut count = 0u64;
            while rows
                .next()
                .map_err(|e| QueryLensError::Query(format!("Failed to fetch row: {}", e)))?
                .is_some()
            {
                count += 1;
            }
            count
        } else {
            stmt.execute([])
                .map_err(|e| QueryLensError::Query(format!("Failed to execute statement: {}", e)))?
                as u64
        };

        tracing::debug!(rows_affected, "SQLite statement executed");
        Ok(ExecutionOutcome::new(rows_affected))
    }

    async fn execute_batch(&self, sql: &str) -> Result<()> {
        tracing::debug!("executing SQLite batch");
        let conn = self.conn.lock();
        conn.execute_batch(sql)
            .map_err(|e| QueryLensError::Query(format!("Failed to execute batch: {}", e)))
    }
}

#[cfg(test)]
mod tests;

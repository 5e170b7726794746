//! PostgreSQL engine implementation

use crate::error::format_postgres_error;
use async_trait::async_trait;
use querylens_analyzer::explain::parse_json_value;
use querylens_core::{DatabaseEngine, ExecutionOutcome, QueryLensError, QueryPlan, Result};
use tokio_postgres::{Client, Config, NoTls};

/// A tokio-postgres client whose connection task runs on the ambient runtime
pub struct PostgresEngine {
    client: Client,
}

impl PostgresEngine {
    /// Connect using a libpq-style string, either
    /// `host=localhost user=postgres dbname=app` or
    /// `postgresql://postgres@localhost/app`.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn connect(conn_str: &str) -> Result<Self> {
        let config: Config = conn_str.parse().map_err(|e: tokio_postgres::Error| {
            QueryLensError::Connection(format!("Invalid PostgreSQL connection string: {}", e))
        })?;

        tracing::info!(
            database = config.get_dbname().unwrap_or_default(),
            user = config.get_user().unwrap_or_default(),
            "connecting to PostgreSQL database"
        );

        let (client, connection) = config.connect(NoTls).await.map_err(|e| {
            QueryLensError::Connection(format!(
                "Failed to connect to PostgreSQL: {}",
                format_postgres_error(&e)
            ))
        })?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "PostgreSQL connection error");
            }
        });

        tracing::info!("PostgreSQL connection established");
        Ok(Self::from_client(client))
    }

    /// Wrap a client whose connection is already being driven
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl DatabaseEngine for PostgresEngine {
    fn engine_name(&self) -> &str {
        "postgresql"
    }

    #[tracing::instrument(skip(self, sql), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn explain(&self, sql: &str) -> Result<QueryPlan> {
        let row = self
            .client
            .query_one(&format!("EXPLAIN (FORMAT JSON) {}", sql), &[])
            .await
            .map_err(|e| QueryLensError::Explain(format_postgres_error(&e)))?;

        let document: serde_json::Value = row
            .try_get(0)
            .map_err(|e| QueryLensError::Explain(format!("Unexpected EXPLAIN output: {}", e)))?;

        parse_json_value(&document).map_err(|e| QueryLensError::Explain(e.to_string()))
    }

    #[tracing::instrument(skip(self, sql), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn execute(&self, sql: &str) -> Result<ExecutionOutcome> {
        // The command tag carries the row count for SELECT as well as DML
        let rows_affected = self
            .client
            .execute(sql, &[])
            .await
            .map_err(|e| QueryLensError::Query(format_postgres_error(&e)))?;

        tracing::debug!(rows_affected, "PostgreSQL statement executed");
        Ok(ExecutionOutcome::new(rows_affected))
    }

    async fn execute_batch(&self, sql: &str) -> Result<()> {
        tracing::debug!("executing PostgreSQL batch");
        self.client
            .batch_execute(sql)
            .await
            .map_err(|e| QueryLensError::Query(format_postgres_error(&e)))
    }
}

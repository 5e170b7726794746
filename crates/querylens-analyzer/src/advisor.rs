//! Index Advisor
//!
//! Turns the column references found in a statement into `CREATE INDEX`
//! recommendations:
//!
//! - one single-column index per WHERE comparison
//! - one multi-column index over the ORDER BY columns of the first ordered table
//! - one single-column index per JOIN ... ON reference
//!
//! Recommendations from different clauses are not merged, so a column used in
//! both WHERE and JOIN is recommended twice. Callers that want merged output
//! can pass the list through [`dedup_recommendations`].

use crate::extract::{ClauseKind, ColumnExtractor, ColumnRef, LexicalExtractor};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Index access method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    #[default]
    Btree,
    Hash,
    Gin,
    Gist,
}

impl IndexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Btree => "btree",
            Self::Hash => "hash",
            Self::Gin => "gin",
            Self::Gist => "gist",
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposed index with ready-to-run DDL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecommendation {
    pub table: String,
    pub columns: Vec<String>,
    pub index_type: IndexType,
    pub reason: String,
    pub estimated_improvement: String,
    /// A single `CREATE INDEX` statement over exactly `table` and `columns`
    pub create_statement: String,
}

impl IndexRecommendation {
    /// Creates a btree recommendation and synthesizes its DDL
    pub fn new(
        table: impl Into<String>,
        columns: Vec<String>,
        reason: impl Into<String>,
        estimated_improvement: impl Into<String>,
    ) -> Self {
        let table = table.into();
        let create_statement = create_index_statement(&table, &columns);
        Self {
            table,
            columns,
            index_type: IndexType::Btree,
            reason: reason.into(),
            estimated_improvement: estimated_improvement.into(),
            create_statement,
        }
    }

    /// `idx_<table>_<col1>_<col2>...`
    pub fn index_name(&self) -> String {
        index_name(&self.table, &self.columns)
    }

    fn single(column: &ColumnRef, clause: ClauseKind) -> Self {
        let (reason, improvement) = match clause {
            ClauseKind::Where => (
                format!("Column {} is filtered in the WHERE clause", column.column),
                "High - lets the engine seek matching rows instead of scanning the table",
            ),
            ClauseKind::Join => (
                format!("Column {} is used in a JOIN condition", column.column),
                "High - turns per-row join lookups into index seeks",
            ),
            ClauseKind::OrderBy => (
                format!("Column {} is used for ORDER BY sorting", column.column),
                "Medium - rows can be read in index order without a sort step",
            ),
        };
        Self::new(
            column.table.clone(),
            vec![column.column.clone()],
            reason,
            improvement,
        )
    }
}

fn index_name(table: &str, columns: &[String]) -> String {
    format!("idx_{}_{}", table, columns.join("_"))
}

fn create_index_statement(table: &str, columns: &[String]) -> String {
    format!(
        "CREATE INDEX {} ON {} ({});",
        index_name(table, columns),
        table,
        columns.join(", ")
    )
}

/// Derives index recommendations from SQL text
#[derive(Clone)]
pub struct IndexAdvisor {
    extractor: Arc<dyn ColumnExtractor>,
}

impl fmt::Debug for IndexAdvisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexAdvisor").finish_non_exhaustive()
    }
}

impl Default for IndexAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexAdvisor {
    /// Creates an advisor backed by the lexical extractor
    pub fn new() -> Self {
        Self::with_extractor(Arc::new(LexicalExtractor::new()))
    }

    /// Creates an advisor backed by a custom extractor
    pub fn with_extractor(extractor: Arc<dyn ColumnExtractor>) -> Self {
        Self { extractor }
    }

    /// Recommends indexes for `sql`: WHERE columns, then the ORDER BY
    /// composite, then JOIN columns
    pub fn recommend(&self, sql: &str) -> Vec<IndexRecommendation> {
        let mut recommendations: Vec<IndexRecommendation> = self
            .extractor
            .extract_columns(sql, ClauseKind::Where)
            .iter()
            .map(|c| IndexRecommendation::single(c, ClauseKind::Where))
            .collect();

        if let Some(rec) = self.order_by_recommendation(sql) {
            recommendations.push(rec);
        }

        recommendations.extend(
            self.extractor
                .extract_columns(sql, ClauseKind::Join)
                .iter()
                .map(|c| IndexRecommendation::single(c, ClauseKind::Join)),
        );

        tracing::debug!(
            count = recommendations.len(),
            "derived index recommendations"
        );
        recommendations
    }

    fn order_by_recommendation(&self, sql: &str) -> Option<IndexRecommendation> {
        let order_by = self.extractor.extract_columns(sql, ClauseKind::OrderBy);
        let table = order_by.first()?.table.clone();

        // A column listed twice would make the DDL invalid
        let mut seen = HashSet::new();
        let columns: Vec<String> = order_by
            .into_iter()
            .filter(|c| c.table == table)
            .map(|c| c.column)
            .filter(|c| seen.insert(c.clone()))
            .collect();

        if columns.len() == 1 {
            let column = ColumnRef::new(table, columns[0].clone());
            return Some(IndexRecommendation::single(&column, ClauseKind::OrderBy));
        }

        Some(IndexRecommendation::new(
            table,
            columns,
            "Columns are used together for ORDER BY sorting",
            "Medium - rows can be read in index order without a sort step",
        ))
    }
}

/// Drops recommendations whose table and column list repeat an earlier one.
///
/// Not applied by [`IndexAdvisor::recommend`].
pub fn dedup_recommendations(recommendations: Vec<IndexRecommendation>) -> Vec<IndexRecommendation> {
    let mut seen = HashSet::new();
    recommendations
        .into_iter()
        .filter(|r| seen.insert((r.table.clone(), r.columns.clone())))
        .collect()
}

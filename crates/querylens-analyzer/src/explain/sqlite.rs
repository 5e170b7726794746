//! SQLite EXPLAIN QUERY PLAN Parser
//!
//! SQLite reports its plan as a flat list of steps with parent links, which
//! the sqlite3 shell renders as a tree:
//!
//! ```text
//! QUERY PLAN
//! |--SCAN users
//! |--SEARCH orders USING INDEX idx_user_id (user_id=?)
//! `--USE TEMP B-TREE FOR ORDER BY
//! ```
//!
//! SQLite has no cost model in this output, so nodes carry zero costs. Steps
//! are mapped onto PostgreSQL operation names: `SCAN` becomes `Seq Scan`,
//! `SEARCH ... USING INDEX` becomes `Index Scan`, temp B-trees become `Sort`,
//! and sibling table accesses (SQLite always joins with nested loops) are
//! wrapped in a `Nested Loop`.
//!
//! # Examples
//!
//! ```
//! use querylens_analyzer::explain::sqlite::parse_sqlite_explain;
//!
//! let output = r#"QUERY PLAN
//! |--SCAN users
//! `--SEARCH orders USING INDEX idx_user_id (user_id=?)"#;
//!
//! let plan = parse_sqlite_explain(output).unwrap();
//! assert!(plan.has_sequential_scans());
//! ```

use querylens_core::{NodeKind, PlanNode, QueryPlan};
use thiserror::Error;

/// Errors that can occur when parsing SQLite EXPLAIN QUERY PLAN output
#[derive(Debug, Error)]
pub enum SqliteExplainError {
    #[error("Empty EXPLAIN output")]
    EmptyOutput,

    #[error("Step {id} refers to unknown parent {parent}")]
    DanglingParent { id: i64, parent: i64 },
}

/// Result type for SQLite EXPLAIN parsing
pub type Result<T> = std::result::Result<T, SqliteExplainError>;

/// One row of `EXPLAIN QUERY PLAN` output: `(id, parent, notused, detail)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlitePlanRow {
    pub id: i64,
    pub parent: i64,
    pub detail: String,
}

impl SqlitePlanRow {
    pub fn new(id: i64, parent: i64, detail: impl Into<String>) -> Self {
        Self {
            id,
            parent,
            detail: detail.into(),
        }
    }
}

/// A plan step before it is mapped onto the shared node shape
#[derive(Debug)]
struct Step {
    detail: String,
    children: Vec<Step>,
}

/// Builds a plan from raw `EXPLAIN QUERY PLAN` rows.
///
/// Rows whose parent is 0 are top-level steps; every other parent must be the
/// id of an earlier row.
pub fn plan_from_rows(rows: &[SqlitePlanRow]) -> Result<QueryPlan> {
    if rows.is_empty() {
        return Err(SqliteExplainError::EmptyOutput);
    }

    for row in rows {
        if row.parent != 0 && !rows.iter().any(|r| r.id == row.parent) {
            return Err(SqliteExplainError::DanglingParent {
                id: row.id,
                parent: row.parent,
            });
        }
    }

    let steps = steps_under(rows, 0);
    Ok(assemble(steps).map(QueryPlan::new).unwrap_or_default())
}

fn steps_under(rows: &[SqlitePlanRow], parent: i64) -> Vec<Step> {
    rows.iter()
        .filter(|r| r.parent == parent && r.id != parent)
        .map(|r| Step {
            detail: r.detail.trim().to_string(),
            children: steps_under(rows, r.id),
        })
        .collect()
}

/// Parses the tree text printed by the sqlite3 shell
pub fn parse_sqlite_explain(output: &str) -> Result<QueryPlan> {
    let lines: Vec<&str> = output
        .lines()
        .filter(|l| !l.trim().is_empty() && !l.trim().starts_with("QUERY PLAN"))
        .collect();

    if lines.is_empty() {
        if output.trim().is_empty() {
            return Err(SqliteExplainError::EmptyOutput);
        }
        // Header with no steps
        return Ok(QueryPlan::new(PlanNode::of_kind(NodeKind::Result)));
    }

    // (indent, step) pairs; a step closes when a line at the same or a
    // shallower indent arrives
    let mut roots: Vec<Step> = Vec::new();
    let mut stack: Vec<(usize, Step)> = Vec::new();

    for line in lines {
        let (indent, detail) = parse_tree_line(line);
        while stack.last().is_some_and(|(level, _)| *level >= indent) {
            close_top(&mut stack, &mut roots);
        }
        stack.push((
            indent,
            Step {
                detail,
                children: Vec::new(),
            },
        ));
    }
    while !stack.is_empty() {
        close_top(&mut stack, &mut roots);
    }

    Ok(assemble(roots).map(QueryPlan::new).unwrap_or_default())
}

fn close_top(stack: &mut Vec<(usize, Step)>, roots: &mut Vec<Step>) {
    if let Some((_, step)) = stack.pop() {
        match stack.last_mut() {
            Some((_, parent)) => parent.children.push(step),
            None => roots.push(step),
        }
    }
}

/// Splits `|  `--SEARCH ...` into its depth marker width and the step text
fn parse_tree_line(line: &str) -> (usize, String) {
    let detail_start = line
        .find(|c: char| !matches!(c, ' ' | '|' | '`' | '-'))
        .unwrap_or(line.len());
    (detail_start, line[detail_start..].trim().to_string())
}

/// Turns sibling steps into a single subtree.
///
/// Table accesses are joined left-deep with nested loops in the order SQLite
/// runs them; temp B-tree steps wrap the result as sorts.
fn assemble(steps: Vec<Step>) -> Option<PlanNode> {
    let mut inputs: Vec<PlanNode> = Vec::new();
    let mut sorts: Vec<PlanNode> = Vec::new();

    for step in steps {
        let mut node = step_to_node(&step.detail);
        if let Some(child) = assemble(step.children) {
            node.children.push(child);
        }
        if node.kind() == NodeKind::Sort {
            sorts.push(node);
        } else {
            inputs.push(node);
        }
    }

    let mut iter = inputs.into_iter();
    let mut current = iter.next();
    for next in iter {
        current = Some(match current {
            Some(outer) => PlanNode::of_kind(NodeKind::NestedLoop)
                .with_child(outer)
                .with_child(next),
            None => next,
        });
    }

    for sort in sorts {
        current = Some(match current {
            Some(input) => sort.with_child(input),
            None => sort,
        });
    }

    current
}

/// Maps one SQLite step onto a plan node
fn step_to_node(detail: &str) -> PlanNode {
    let upper = detail.to_uppercase();

    if upper.starts_with("SCAN") {
        if upper.contains("CONSTANT ROW") {
            return PlanNode::of_kind(NodeKind::Result);
        }
        if upper.contains("SUBQUERY") || upper.starts_with("SCAN (") {
            return PlanNode::of_kind(NodeKind::SubqueryScan);
        }
        let kind = if upper.contains("COVERING INDEX") {
            NodeKind::IndexOnlyScan
        } else if upper.contains("USING INDEX") {
            NodeKind::IndexScan
        } else {
            NodeKind::SeqScan
        };
        return table_access(kind, detail, "SCAN");
    }

    if upper.starts_with("SEARCH") {
        let kind = if upper.contains("COVERING INDEX") {
            NodeKind::IndexOnlyScan
        } else {
            NodeKind::IndexScan
        };
        return table_access(kind, detail, "SEARCH");
    }

    if upper.starts_with("USE TEMP B-TREE") {
        return PlanNode::of_kind(NodeKind::Sort);
    }
    if upper.starts_with("MATERIALIZE") {
        return PlanNode::of_kind(NodeKind::Materialize);
    }
    if upper.starts_with("CO-ROUTINE") {
        return PlanNode::of_kind(NodeKind::SubqueryScan);
    }
    if upper.starts_with("COMPOUND") || upper.starts_with("UNION") {
        return PlanNode::of_kind(NodeKind::Append);
    }

    // Keep the step text so nothing is silently relabelled
    PlanNode::new(detail)
}

/// Builds a scan/search node, pulling out the table, alias and index
///
/// Formats: `SCAN [TABLE] t [AS a] [USING [COVERING] INDEX i] [(cond)]`,
/// `SEARCH t USING INTEGER PRIMARY KEY (rowid=?)`
fn table_access(kind: NodeKind, detail: &str, keyword: &str) -> PlanNode {
    let mut node = PlanNode::of_kind(kind);
    let words: Vec<&str> = detail.split_whitespace().collect();
    let upper: Vec<String> = words.iter().map(|w| w.to_uppercase()).collect();

    let mut pos = upper.iter().position(|w| w == keyword).map_or(0, |p| p + 1);
    if upper.get(pos).is_some_and(|w| w == "TABLE") {
        pos += 1;
    }
    node.relation = words.get(pos).map(|s| s.to_string());
    if upper.get(pos + 1).is_some_and(|w| w == "AS") {
        node.alias = words.get(pos + 2).map(|s| s.to_string());
    }

    // Automatic indexes print their condition where the name would be
    if let Some(idx) = upper.iter().position(|w| w == "INDEX")
        && let Some(name) = words.get(idx + 1)
        && !name.starts_with('(')
    {
        node.index_name = Some(name.to_string());
    }

    node
}

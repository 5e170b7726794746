//! PostgreSQL EXPLAIN adapter
//!
//! `EXPLAIN (FORMAT JSON)` is the primary input; the default text format is
//! accepted as a fallback for output captured from psql.
//!
//! ```
//! use querylens_analyzer::explain::postgres::parse_postgres_explain;
//!
//! let explain = r#"[{"Plan": {
//!     "Node Type": "Index Scan",
//!     "Relation Name": "orders",
//!     "Index Name": "orders_pkey",
//!     "Total Cost": 8.3
//! }}]"#;
//!
//! let plan = parse_postgres_explain(explain).unwrap();
//! assert_eq!(plan.total_cost(), Some(8.3));
//! assert!(!plan.has_sequential_scans());
//! ```

use querylens_core::{PlanNode, QueryPlan};
use serde_json::Value;
use thiserror::Error;

/// Why a PostgreSQL EXPLAIN document could not be adapted
#[derive(Debug, Error)]
pub enum PostgresExplainError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("EXPLAIN output has no \"Plan\" object")]
    MissingPlan,

    #[error("Malformed plan: {0}")]
    InvalidStructure(String),
}

pub type Result<T> = std::result::Result<T, PostgresExplainError>;

/// Adapts EXPLAIN output in either format; JSON is recognized by its
/// leading `[` or `{`
pub fn parse_postgres_explain(output: &str) -> Result<QueryPlan> {
    let output = output.trim();
    match output.chars().next() {
        Some('[' | '{') => parse_json_explain(output),
        _ => parse_text_explain(output),
    }
}

pub fn parse_json_explain(json: &str) -> Result<QueryPlan> {
    parse_json_value(&serde_json::from_str::<Value>(json)?)
}

/// Parses an already-decoded EXPLAIN (FORMAT JSON) document.
///
/// Drivers that read the `json` column directly hand the value over here
/// without a round-trip through text.
pub fn parse_json_value(value: &Value) -> Result<QueryPlan> {
    // `[{"Plan": ...}]`, one element per statement
    let document = match value.as_array() {
        Some(arr) => arr.first().ok_or(PostgresExplainError::MissingPlan)?,
        None => value,
    };
    let plan_obj = document
        .get("Plan")
        .ok_or(PostgresExplainError::MissingPlan)?;

    let mut plan = QueryPlan::new(parse_plan_node(plan_obj)?);

    // Timing is only present for EXPLAIN ANALYZE
    plan.planning_time_ms = document.get("Planning Time").and_then(Value::as_f64);
    plan.execution_time_ms = document.get("Execution Time").and_then(Value::as_f64);

    Ok(plan)
}

fn parse_plan_node(value: &Value) -> Result<PlanNode> {
    let node_type = value
        .get("Node Type")
        .and_then(Value::as_str)
        .ok_or_else(|| PostgresExplainError::InvalidStructure("node without \"Node Type\"".into()))?;

    let mut node = PlanNode::new(node_type);

    let text = |key: &str| value.get(key).and_then(Value::as_str).map(String::from);
    node.relation = text("Relation Name");
    node.alias = text("Alias");
    node.index_name = text("Index Name");
    node.filter = text("Filter");

    node.startup_cost = value
        .get("Startup Cost")
        .and_then(Value::as_f64)
        .unwrap_or_default();
    node.total_cost = value
        .get("Total Cost")
        .and_then(Value::as_f64)
        .unwrap_or_default();
    node.plan_rows = value
        .get("Plan Rows")
        .and_then(Value::as_u64)
        .unwrap_or_default();

    if let Some(plans) = value.get("Plans").and_then(Value::as_array) {
        node.children = plans.iter().map(parse_plan_node).collect::<Result<_>>()?;
    }

    Ok(node)
}

/// Adapts the default text format.
///
/// Only node lines, costs and `Filter:` properties are read; other property
/// lines are skipped.
pub fn parse_text_explain(text: &str) -> Result<QueryPlan> {
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty() && !is_timing_line(l))
        .collect();
    if lines.is_empty() {
        return Err(PostgresExplainError::InvalidStructure("no plan lines".into()));
    }

    let (root, _) = parse_text_node(&lines, 0)?;
    let mut plan = QueryPlan::new(root);

    // Timing footer, EXPLAIN ANALYZE only
    for line in text.lines().rev().take(5) {
        let lower = line.trim().to_lowercase();
        if lower.starts_with("planning time:") {
            plan.planning_time_ms = time_ms(&lower);
        } else if lower.starts_with("execution time:") {
            plan.execution_time_ms = time_ms(&lower);
        }
    }

    Ok(plan)
}

fn is_timing_line(line: &str) -> bool {
    let lower = line.trim().to_lowercase();
    lower.starts_with("planning time") || lower.starts_with("execution time")
}

/// Parses the node at `start` and every deeper `->` line beneath it.
/// Returns the node and the index of the first line that is not part of it.
fn parse_text_node(lines: &[&str], start: usize) -> Result<(PlanNode, usize)> {
    let indent = indent_of(lines[start]);
    let mut node = parse_text_line(lines[start].trim());

    let mut pos = start + 1;
    while let Some(line) = lines.get(pos).filter(|l| indent_of(l) > indent) {
        let body = line.trim();
        if body.starts_with("->") {
            let (child, end) = parse_text_node(lines, pos)?;
            node.children.push(child);
            pos = end;
        } else {
            if let Some(filter) = body.strip_prefix("Filter:") {
                node.filter = Some(filter.trim().to_string());
            }
            pos += 1;
        }
    }

    Ok((node, pos))
}

/// Format: `Node Type [using index] [on relation [alias]]  (cost=X..Y rows=N width=W)`
fn parse_text_line(line: &str) -> PlanNode {
    let content = line.trim_start_matches("->").trim();

    let (type_part, cost_part) = match content.find(" (cost=") {
        Some(idx) => (content[..idx].trim(), Some(&content[idx..])),
        None => (content, None),
    };

    let words: Vec<&str> = type_part.split_whitespace().collect();
    let type_end = words
        .iter()
        .position(|w| *w == "on" || *w == "using")
        .unwrap_or(words.len());

    let mut type_words = &words[..type_end];
    // "Parallel Seq Scan" is a Seq Scan run by parallel workers
    if type_words.first() == Some(&"Parallel") {
        type_words = &type_words[1..];
    }
    let mut node = PlanNode::new(type_words.join(" "));

    let rest = &words[type_end..];
    if let Some(using_idx) = rest.iter().position(|w| *w == "using") {
        node.index_name = rest.get(using_idx + 1).map(|s| s.to_string());
    }
    if let Some(on_idx) = rest.iter().position(|w| *w == "on") {
        node.relation = rest.get(on_idx + 1).map(|s| s.to_string());
        node.alias = rest.get(on_idx + 2).map(|s| s.to_string());
    }

    if let Some(costs) = cost_part {
        apply_costs(&mut node, costs);
    }

    node
}

/// Reads `(cost=0.00..10.00 rows=100 width=36)`; unparsable parts stay zero
fn apply_costs(node: &mut PlanNode, costs: &str) {
    if let Some(v) = between(costs, "cost=", "..").and_then(|s| s.parse().ok()) {
        node.startup_cost = v;
    }
    if let Some(v) = between(costs, "..", " rows=").and_then(|s| s.parse().ok()) {
        node.total_cost = v;
    }
    if let Some(v) = between(costs, "rows=", " width=").and_then(|s| s.parse().ok()) {
        node.plan_rows = v;
    }
}

fn between<'a>(s: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let from = s.find(open)? + open.len();
    let len = s[from..].find(close)?;
    Some(&s[from..from + len])
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// `planning time: 0.123 ms` -> 0.123
fn time_ms(line: &str) -> Option<f64> {
    let (_, value) = line.split_once(':')?;
    value.trim().trim_end_matches("ms").trim().parse().ok()
}

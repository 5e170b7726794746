//! Terminal rendering of analyses and stats

use comfy_table::{Table, presets::UTF8_FULL};
use querylens_core::{PlanNode, QueryPlan};
use querylens_query::{QueryAnalysis, QueryStats};
use std::fmt::Write as _;

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

fn format_ms(ms: f64) -> String {
    format!("{:.3} ms", ms)
}

/// Summary, plan tree, suggestions and index recommendations for one statement
pub fn analysis(analysis: &QueryAnalysis) -> String {
    let perf = &analysis.performance;
    let mut out = String::new();

    let mut summary = table(vec!["Query", "Time", "Rows", "Plan cost", "Indexes used"]);
    summary.add_row(vec![
        perf.query.clone(),
        format_ms(perf.execution_time_ms()),
        perf.rows_affected.to_string(),
        perf.plan_cost.map_or_else(|| "-".to_string(), |c| format!("{:.2}", c)),
        if perf.index_usage.is_empty() {
            "-".to_string()
        } else {
            perf.index_usage.join(", ")
        },
    ]);
    let _ = writeln!(out, "{summary}");

    let _ = writeln!(out, "\nPlan:\n{}", plan(&analysis.plan));

    if analysis.suggestions.is_empty() {
        let _ = writeln!(out, "No suggestions.");
    } else {
        let mut suggestions = table(vec!["Priority", "Type", "Issue", "Impact", "Fix"]);
        for s in analysis.suggestions_by_priority() {
            suggestions.add_row(vec![
                s.priority.as_str(),
                s.kind.as_str(),
                s.description.as_str(),
                s.impact.as_str(),
                s.implementation.as_str(),
            ]);
        }
        let _ = writeln!(out, "{suggestions}");
    }

    if analysis.index_recommendations.is_empty() {
        let _ = writeln!(out, "No index recommendations.");
    } else {
        let mut indexes = table(vec!["Table", "Columns", "Reason", "Improvement", "DDL"]);
        for r in &analysis.index_recommendations {
            indexes.add_row(vec![
                r.table.clone(),
                r.columns.join(", "),
                r.reason.clone(),
                r.estimated_improvement.clone(),
                r.create_statement.clone(),
            ]);
        }
        let _ = writeln!(out, "{indexes}");
    }

    out
}

/// Indented plan tree, one node per line
pub fn plan(plan: &QueryPlan) -> String {
    let mut out = String::new();
    match &plan.root {
        Some(root) => write_node(&mut out, root, 0),
        None => out.push_str("  (no plan available)\n"),
    }
    out
}

fn write_node(out: &mut String, node: &PlanNode, depth: usize) {
    let _ = write!(out, "{}-> {}", "  ".repeat(depth + 1), node.node_type);
    if let Some(relation) = &node.relation {
        let _ = write!(out, " on {}", relation);
        if let Some(alias) = node.alias.as_ref().filter(|a| *a != relation) {
            let _ = write!(out, " {}", alias);
        }
    }
    if let Some(index) = &node.index_name {
        let _ = write!(out, " using {}", index);
    }
    if node.total_cost > 0.0 {
        let _ = write!(
            out,
            "  (cost={:.2}..{:.2} rows={})",
            node.startup_cost, node.total_cost, node.plan_rows
        );
    }
    out.push('\n');
    if let Some(filter) = &node.filter {
        let _ = writeln!(out, "{}   Filter: {}", "  ".repeat(depth + 1), filter);
    }
    for child in &node.children {
        write_node(out, child, depth + 1);
    }
}

/// Aggregate stats over the session's history
pub fn stats(stats: &QueryStats) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} queries, average {}",
        stats.total_queries,
        format_ms(stats.average_execution_time_ms)
    );

    if !stats.most_frequent_queries.is_empty() {
        let mut frequent = table(vec!["Query", "Count", "Avg time"]);
        for f in &stats.most_frequent_queries {
            frequent.add_row(vec![f.query.clone(), f.count.to_string(), format_ms(f.avg_time_ms)]);
        }
        let _ = writeln!(out, "{frequent}");
    }

    if !stats.slow_queries.is_empty() {
        let mut slow = table(vec!["Slow query", "Time"]);
        for p in &stats.slow_queries {
            slow.add_row(vec![p.query.clone(), format_ms(p.execution_time_ms())]);
        }
        let _ = writeln!(out, "{slow}");
    }

    if !stats.index_usage_stats.is_empty() {
        let mut usage = table(vec!["Index", "Uses"]);
        for (index, count) in &stats.index_usage_stats {
            usage.add_row(vec![index.clone(), count.to_string()]);
        }
        let _ = writeln!(out, "{usage}");
    }

    out
}

#[cfg(test)]
mod tests;

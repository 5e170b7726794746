//! SQL Fragment Extractor
//!
//! Best-effort lexical extraction of `table.column` references from the
//! WHERE, ORDER BY and JOIN ... ON clauses of a raw SQL string. This is not a
//! parser: subqueries, CTEs and quoted identifiers are not understood, and a
//! statement with no recognisable references simply yields an empty list.
//!
//! Table aliases declared as `FROM t a`, `FROM t AS a`, `FROM s b, t a` or
//! `JOIN t a` are resolved, so `a.col` is reported against `t`.
//!
//! The [`ColumnExtractor`] trait is the seam the index advisor depends on;
//! [`LexicalExtractor`] is the regex implementation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Clause a column reference was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseKind {
    Where,
    OrderBy,
    Join,
}

impl ClauseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Where => "WHERE",
            Self::OrderBy => "ORDER BY",
            Self::Join => "JOIN",
        }
    }
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `table.column` reference with any alias already resolved
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Pulls candidate index columns out of SQL text.
///
/// Implementations must be cheap and infallible: anything they cannot make
/// sense of is reported as no columns.
pub trait ColumnExtractor: Send + Sync {
    /// Returns the references found in `clause`, in order of appearance
    fn extract_columns(&self, sql: &str, clause: ClauseKind) -> Vec<ColumnRef>;
}

/// Regex-based [`ColumnExtractor`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalExtractor;

impl LexicalExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ColumnExtractor for LexicalExtractor {
    fn extract_columns(&self, sql: &str, clause: ClauseKind) -> Vec<ColumnRef> {
        let aliases = AliasMap::build(sql);
        let refs = match clause {
            ClauseKind::Where => where_refs(sql),
            ClauseKind::OrderBy => order_by_refs(sql),
            ClauseKind::Join => join_refs(sql),
        };
        refs.into_iter()
            .map(|(qualifier, column)| ColumnRef::new(aliases.resolve(qualifier), column))
            .collect()
    }
}

/// Columns compared in the WHERE clause
pub fn extract_where_columns(sql: &str) -> Vec<ColumnRef> {
    LexicalExtractor.extract_columns(sql, ClauseKind::Where)
}

/// Columns listed in the ORDER BY clause
pub fn extract_order_by_columns(sql: &str) -> Vec<ColumnRef> {
    LexicalExtractor.extract_columns(sql, ClauseKind::OrderBy)
}

/// Columns referenced by JOIN ... ON predicates
pub fn extract_join_columns(sql: &str) -> Vec<ColumnRef> {
    LexicalExtractor.extract_columns(sql, ClauseKind::Join)
}

// Lazy-compiled regex patterns for clause and reference scanning
static WHERE_CLAUSE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bWHERE\b(.*?)(?:\bORDER\s+BY\b|\bGROUP\s+BY\b|\bHAVING\b|\bLIMIT\b|$)")
        .expect("valid regex")
});

static ORDER_BY_CLAUSE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bORDER\s+BY\b(.*?)(?:\bLIMIT\b|$)").expect("valid regex")
});

static JOIN_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bJOIN\s+(\w+)(?:\s+(?:AS\s+)?(\w+))?\s+ON\b").expect("valid regex")
});

static JOIN_END_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bJOIN\b|\bWHERE\b|\bORDER\s+BY\b|\bGROUP\s+BY\b").expect("valid regex")
});

static TABLE_SOURCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:FROM|JOIN)\s+(\w+)").expect("valid regex"));

// Body of a FROM clause up to the first keyword that ends the table list
static FROM_LIST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)\bFROM\b(.*?)(?:\b(?:WHERE|JOIN|INNER|LEFT|RIGHT|FULL|CROSS|NATURAL|ORDER|GROUP|HAVING|LIMIT|UNION)\b|;|$)",
    )
    .expect("valid regex")
});

// One `table [AS] alias` item of a comma-separated FROM list
static FROM_ITEM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\w+)(?:\s+(?:AS\s+)?(\w+))?\s*$").expect("valid regex")
});

// Applied to the text right after a table source, so a following JOIN is
// never swallowed as an alias candidate
static ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s+(?:AS\s+)?(\w+)").expect("valid regex"));

static COLUMN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z_]\w*)\.([A-Za-z_]\w*)\b").expect("valid regex")
});

static COMPARED_COLUMN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z_]\w*)\.([A-Za-z_]\w*)\s*[=<>!]").expect("valid regex")
});

/// Words that can follow a table name without being its alias
const NON_ALIAS_KEYWORDS: &[&str] = &[
    "WHERE", "ON", "USING", "JOIN", "INNER", "LEFT", "RIGHT", "FULL", "OUTER", "CROSS",
    "NATURAL", "LATERAL", "ORDER", "GROUP", "HAVING", "LIMIT", "OFFSET", "UNION", "EXCEPT",
    "INTERSECT", "WINDOW", "SET", "VALUES", "RETURNING", "FOR",
];

fn where_refs(sql: &str) -> Vec<(&str, &str)> {
    let Some(body) = WHERE_CLAUSE_REGEX
        .captures(sql)
        .and_then(|caps| caps.get(1))
    else {
        return Vec::new();
    };
    qualified_refs(&COMPARED_COLUMN_REGEX, body.as_str())
}

fn order_by_refs(sql: &str) -> Vec<(&str, &str)> {
    let Some(body) = ORDER_BY_CLAUSE_REGEX
        .captures(sql)
        .and_then(|caps| caps.get(1))
    else {
        return Vec::new();
    };
    qualified_refs(&COLUMN_REGEX, body.as_str())
}

fn join_refs(sql: &str) -> Vec<(&str, &str)> {
    let mut refs = Vec::new();
    for header in JOIN_HEADER_REGEX.find_iter(sql) {
        let rest = &sql[header.end()..];
        let predicate = match JOIN_END_REGEX.find(rest) {
            Some(end) => &rest[..end.start()],
            None => rest,
        };
        refs.extend(qualified_refs(&COLUMN_REGEX, predicate));
    }
    refs
}

fn qualified_refs<'a>(pattern: &Regex, text: &'a str) -> Vec<(&'a str, &'a str)> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| {
            let qualifier = caps.get(1)?.as_str();
            let column = caps.get(2)?.as_str();
            Some((qualifier, column))
        })
        .collect()
}

/// Alias (lowercased) to table name, from FROM/JOIN sources
struct AliasMap<'a> {
    aliases: HashMap<String, &'a str>,
}

impl<'a> AliasMap<'a> {
    fn build(sql: &'a str) -> Self {
        let mut map = Self {
            aliases: HashMap::new(),
        };
        for caps in TABLE_SOURCE_REGEX.captures_iter(sql) {
            let Some(table) = caps.get(1) else {
                continue;
            };
            if let Some(alias) = ALIAS_REGEX
                .captures(&sql[table.end()..])
                .and_then(|c| c.get(1))
            {
                map.register(table.as_str(), alias.as_str());
            }
        }
        // `FROM a x, b y` lists every table after the first behind a comma
        for list in FROM_LIST_REGEX.captures_iter(sql) {
            let Some(body) = list.get(1) else {
                continue;
            };
            for item in body.as_str().split(',') {
                let Some(caps) = FROM_ITEM_REGEX.captures(item) else {
                    continue;
                };
                if let (Some(table), Some(alias)) = (caps.get(1), caps.get(2)) {
                    map.register(table.as_str(), alias.as_str());
                }
            }
        }
        map
    }

    fn register(&mut self, table: &'a str, alias: &str) {
        if NON_ALIAS_KEYWORDS
            .iter()
            .any(|kw| kw.eq_ignore_ascii_case(alias))
        {
            return;
        }
        self.aliases.insert(alias.to_lowercase(), table);
    }

    /// Table behind `qualifier`, or the qualifier itself when it is not an alias
    fn resolve(&self, qualifier: &str) -> String {
        self.aliases
            .get(&qualifier.to_lowercase())
            .copied()
            .unwrap_or(qualifier)
            .to_string()
    }
}

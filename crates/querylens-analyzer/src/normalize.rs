//! Query normalization
//!
//! Reduces a statement to a grouping key so that executions differing only in
//! positional parameters or layout are counted together.

use regex::Regex;
use std::sync::LazyLock;

static POSITIONAL_PARAM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\d+").expect("valid regex"));

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalizes `sql` into its frequency-grouping key.
///
/// `$1`, `$2`, ... become `?`, whitespace runs collapse to one space, and the
/// result is trimmed and lowercased. Applying it twice changes nothing.
///
/// ```
/// use querylens_analyzer::normalize;
///
/// assert_eq!(
///     normalize("SELECT *\n  FROM t WHERE id = $1"),
///     "select * from t where id = ?"
/// );
/// ```
pub fn normalize(sql: &str) -> String {
    let replaced = POSITIONAL_PARAM_REGEX.replace_all(sql, "?");
    let collapsed = WHITESPACE_REGEX.replace_all(&replaced, " ");
    collapsed.trim().to_lowercase()
}

#[cfg(test)]
mod tests;

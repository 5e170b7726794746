//! Tests for query normalization

use super::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn test_positional_parameters_group_together() {
    assert_eq!(
        normalize("SELECT * FROM t WHERE id = $1"),
        normalize("SELECT * FROM t WHERE id = $2")
    );
}

#[rstest]
#[case("SELECT 1", "select 1")]
#[case("  SELECT\t*\n\nFROM  t  ", "select * from t")]
#[case("SELECT * FROM t WHERE a = $1 AND b = $12", "select * from t where a = ? and b = ?")]
#[case("UPDATE t SET v = $3 WHERE id = ?", "update t set v = ? where id = ?")]
#[case("", "")]
#[case("   ", "")]
fn test_normalize(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(normalize(input), expected);
}

#[rstest]
#[case("SELECT * FROM t WHERE id = $1")]
#[case("  select\n*  from T  ")]
#[case("INSERT INTO logs (msg) VALUES ($1), ($2)")]
#[case("SELECT '$1 literal' FROM t")]
fn test_idempotent(#[case] input: &str) {
    let once = normalize(input);
    assert_eq!(normalize(&once), once);
}

#[test]
fn test_bare_dollar_untouched() {
    assert_eq!(normalize("SELECT $name"), "select $name");
}

use super::*;

#[test]
fn test_non_database_error_uses_display() {
    let err = "host=localhost port=notaport"
        .parse::<tokio_postgres::Config>()
        .unwrap_err();

    assert_eq!(format_postgres_error(&err), err.to_string());
}

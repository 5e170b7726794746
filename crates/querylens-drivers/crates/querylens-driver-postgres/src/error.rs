//! PostgreSQL error formatting

/// Renders a tokio-postgres error with the server's detail and hint.
///
/// Non-database errors (I/O, protocol, config parsing) fall back to their
/// `Display` text.
pub fn format_postgres_error(error: &tokio_postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut message = db_error.message().to_string();

    if let Some(detail) = db_error.detail()
        && !detail.trim().is_empty()
    {
        message.push_str(&format!(" (detail: {})", detail));
    }

    if let Some(hint) = db_error.hint()
        && !hint.trim().is_empty()
    {
        message.push_str(&format!(" (hint: {})", hint));
    }

    match db_error.code().code() {
        "42P01" => format!("undefined table: {}", message),
        "42703" => format!("undefined column: {}", message),
        "42601" => format!("syntax error: {}", message),
        "42501" => format!("insufficient privilege: {}", message),
        "57014" => format!("statement canceled: {}", message),
        code => format!("{} (code: {})", message, code),
    }
}

#[cfg(test)]
mod tests;

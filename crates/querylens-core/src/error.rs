//! Error types for querylens

use thiserror::Error;

/// Core error type for querylens operations
#[derive(Error, Debug)]
pub enum QueryLensError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Explain error: {0}")]
    Explain(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for querylens operations
pub type Result<T> = std::result::Result<T, QueryLensError>;

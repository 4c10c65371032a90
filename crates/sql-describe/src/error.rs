//! Error types for catalog introspection.

use std::time::Duration;

use thiserror::Error;

/// Exit code for configuration errors.
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for connection and pool errors.
pub const EXIT_CONNECTION_ERROR: u8 = 2;
/// Exit code for catalog queries rejected by the backend.
pub const EXIT_QUERY_ERROR: u8 = 3;
/// Exit code when the described table does not exist.
pub const EXIT_TABLE_NOT_FOUND: u8 = 4;
/// Exit code when a catalog row has an unexpected shape.
pub const EXIT_DECODE_ERROR: u8 = 5;
/// Exit code for cancelled or timed out describes.
pub const EXIT_CANCELLED: u8 = 6;
/// Exit code for file and serialization errors.
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for describe operations.
#[derive(Error, Debug)]
pub enum DescribeError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// MySQL rejected or failed a catalog query
    #[error("MySQL error: {0}")]
    Mysql(#[from] sqlx::Error),

    /// PostgreSQL rejected or failed a catalog query
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// SQL Server rejected or failed a catalog query
    #[error("SQL Server error: {0}")]
    Mssql(#[from] tiberius::error::Error),

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// A catalog row did not match the expected record shape
    #[error("Row decode failed for {query} query: {message}")]
    RowDecode { query: String, message: String },

    /// The column query returned zero rows
    #[error("{dialect}:{table} not found during inspection")]
    TableNotFound { dialect: String, table: String },

    /// The ambient context was cancelled while a catalog query was in flight
    #[error("Catalog query cancelled")]
    Cancelled,

    /// The ambient context deadline expired
    #[error("Catalog query timed out after {0:?}")]
    Timeout(Duration),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DescribeError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl std::fmt::Display, context: impl Into<String>) -> Self {
        DescribeError::Pool {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a RowDecode error for the named catalog query
    pub fn decode(query: impl Into<String>, message: impl Into<String>) -> Self {
        DescribeError::RowDecode {
            query: query.into(),
            message: message.into(),
        }
    }

    /// Create a TableNotFound error
    pub fn table_not_found(dialect: impl Into<String>, table: impl Into<String>) -> Self {
        DescribeError::TableNotFound {
            dialect: dialect.into(),
            table: table.into(),
        }
    }

    /// Whether the error means the described table does not exist.
    pub fn is_table_not_found(&self) -> bool {
        matches!(self, DescribeError::TableNotFound { .. })
    }

    /// Whether the backend itself rejected or failed a catalog query.
    pub fn is_query_execution(&self) -> bool {
        matches!(
            self,
            DescribeError::Mysql(_) | DescribeError::Postgres(_) | DescribeError::Mssql(_)
        )
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            DescribeError::Config(_) | DescribeError::Yaml(_) => EXIT_CONFIG_ERROR,
            DescribeError::Pool { .. } => EXIT_CONNECTION_ERROR,
            DescribeError::Mysql(_) | DescribeError::Postgres(_) | DescribeError::Mssql(_) => {
                EXIT_QUERY_ERROR
            }
            DescribeError::TableNotFound { .. } => EXIT_TABLE_NOT_FOUND,
            DescribeError::RowDecode { .. } => EXIT_DECODE_ERROR,
            DescribeError::Cancelled | DescribeError::Timeout(_) => EXIT_CANCELLED,
            DescribeError::Io(_) | DescribeError::Json(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for describe operations.
pub type Result<T> = std::result::Result<T, DescribeError>;

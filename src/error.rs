//! Error types for dbharbor
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for dbharbor
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Type Inference Errors
    // ============================================================================
    #[error("Unsupported type {data_type} for column '{column}'")]
    UnsupportedType { column: String, data_type: String },

    // ============================================================================
    // Connection Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    AuthFailed { message: String },

    #[error("Server unreachable: {message}")]
    Unreachable { message: String },

    // ============================================================================
    // Execution Errors
    // ============================================================================
    #[error("Table {table} already exists")]
    TableAlreadyExists { table: String },

    #[error("Statement failed: {message}")]
    Execution { message: String },

    #[error("SQL Server error: {0}")]
    SqlServer(#[from] tiberius::error::Error),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    // ============================================================================
    // Arrow/Parquet Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an unsupported type error
    pub fn unsupported_type(column: impl Into<String>, data_type: impl ToString) -> Self {
        Self::UnsupportedType {
            column: column.into(),
            data_type: data_type.to_string(),
        }
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }

    /// Create a table-already-exists error
    pub fn table_exists(table: impl Into<String>) -> Self {
        Self::TableAlreadyExists {
            table: table.into(),
        }
    }

    /// Check if this error means the target table is already there
    pub fn is_table_exists(&self) -> bool {
        matches!(self, Error::TableAlreadyExists { .. })
    }
}

/// Result type alias for dbharbor
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

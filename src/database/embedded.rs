//! DuckDB-based execution backend
//!
//! Runs the generated statements against an embedded DuckDB database,
//! either in memory or in a file. Query results come back as Arrow.

use super::{name_between, SqlExecutor};
use crate::error::{Error, Result};
use crate::sql::Dialect;
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use duckdb::Connection;
use std::path::Path;

/// Execution backend over a DuckDB connection
pub struct DuckDbExecutor {
    /// DuckDB connection
    conn: Connection,
    /// Where the database lives (for logging)
    location: String,
}

impl DuckDbExecutor {
    /// Open a fresh in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::config(format!("Failed to create DuckDB connection: {e}")))?;
        tracing::info!("Opened in-memory DuckDB database");
        Ok(Self {
            conn,
            location: ":memory:".to_string(),
        })
    }

    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            Error::config(format!(
                "Failed to open DuckDB database {}: {e}",
                path.display()
            ))
        })?;
        tracing::info!("Opened DuckDB database {}", path.display());
        Ok(Self {
            conn,
            location: path.display().to_string(),
        })
    }

    /// Where the database lives
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Test the connection
    pub fn check_connection(&self) -> Result<()> {
        self.conn
            .execute_batch("SELECT 1")
            .map_err(|e| Error::config(format!("Connection check failed: {e}")))
    }
}

impl SqlExecutor for DuckDbExecutor {
    fn dialect(&self) -> Dialect {
        Dialect::DuckDb
    }

    fn execute(&mut self, sql: &str) -> Result<()> {
        tracing::debug!("Executing statement: {}", sql);
        self.conn.execute_batch(sql).map_err(classify_error)
    }

    fn query(&mut self, sql: &str) -> Result<RecordBatch> {
        tracing::debug!("Executing query: {}", sql);
        let mut stmt = self.conn.prepare(sql).map_err(classify_error)?;
        let results = stmt.query_arrow([]).map_err(classify_error)?;
        let schema = results.get_schema();
        let batches: Vec<RecordBatch> = results.collect();
        Ok(concat_batches(&schema, &batches)?)
    }
}

/// Map DuckDB failures onto crate errors, singling out existing tables
fn classify_error(err: duckdb::Error) -> Error {
    let message = err.to_string();
    if message.contains("already exists") {
        if let Some(table) = name_between(&message, "Table with name ", " already exists") {
            return Error::table_exists(table);
        }
    }
    Error::DuckDb(err)
}

//! SQL execution backends
//!
//! The orchestrator talks to a database only through [`SqlExecutor`].
//!
//! - [`SqlServerExecutor`] - SQL Server over TDS (tiberius), blocking facade
//! - [`DuckDbExecutor`] - embedded DuckDB, handy for local runs and tests

mod convert;
mod embedded;
mod mssql;

pub use embedded::DuckDbExecutor;
pub use mssql::{AuthMode, ConnectOutcome, SqlServerExecutor};

use crate::error::Result;
use crate::sql::{insert_statements, Dialect};
use crate::types::TableRef;
use arrow::record_batch::RecordBatch;

/// A blocking SQL execution service
pub trait SqlExecutor {
    /// Dialect the backend speaks
    fn dialect(&self) -> Dialect;

    /// Run a statement (or batch of statements), draining any results
    fn execute(&mut self, sql: &str) -> Result<()>;

    /// Run a query and collect its first result set
    fn query(&mut self, sql: &str) -> Result<RecordBatch>;

    /// Insert every row of `rows` into an existing table
    ///
    /// Columns are matched by name. Returns the number of rows sent.
    fn bulk_insert(&mut self, table: &TableRef, rows: &RecordBatch) -> Result<u64> {
        let statements = insert_statements(self.dialect(), table, rows)?;
        for statement in &statements {
            self.execute(statement)?;
        }
        Ok(rows.num_rows() as u64)
    }
}

impl<E: SqlExecutor + ?Sized> SqlExecutor for Box<E> {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    fn execute(&mut self, sql: &str) -> Result<()> {
        (**self).execute(sql)
    }

    fn query(&mut self, sql: &str) -> Result<RecordBatch> {
        (**self).query(sql)
    }

    fn bulk_insert(&mut self, table: &TableRef, rows: &RecordBatch) -> Result<u64> {
        (**self).bulk_insert(table, rows)
    }
}

/// Pull a quoted or delimited name out of a backend error message
pub(crate) fn name_between<'a>(message: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = message.find(start)? + start.len();
    let rest = &message[from..];
    let to = rest.find(end)?;
    Some(&rest[..to])
}
